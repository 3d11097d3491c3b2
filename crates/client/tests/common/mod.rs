#![allow(dead_code)]

use async_trait::async_trait;
use client::{
    ApiRequest, ApiResponse, AppContext, ClientFactory, Notice, Notifier, ResourceCache, Result,
    Session,
};
use parking_lot::Mutex;
use reqwest::{Method, header::AUTHORIZATION};
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc, time::Duration};

pub const BASE_URL: &str = "http://registrar.test";

pub const STUDENT_TOKEN: &str = "token-s1";
pub const OTHER_STUDENT_TOKEN: &str = "token-s2";
pub const PROFESSOR_TOKEN: &str = "token-p1";
pub const ADMIN_TOKEN: &str = "token-a1";

/// A request as the backend saw it
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    users: Vec<Value>,
    terms: Vec<Value>,
    courses: Vec<Value>,
    /// section id -> (students, waitlist)
    rosters: HashMap<String, (Vec<Value>, Vec<Value>)>,
    next_id: usize,
    failures: HashMap<(Method, String), (u16, String)>,
}

/// In-memory registrar API
pub struct FakeBackend {
    state: Mutex<State>,
    seen: Mutex<Vec<Seen>>,
}

fn account(id: &str, role: &str, email: &str, first: &str, last: &str) -> Value {
    json!({
        "id": id,
        "role": role,
        "email": email,
        "firstName": first,
        "lastName": last,
        "isMock": true,
    })
}

fn section(id: &str, capacity: u32, professor: &Value) -> Value {
    json!({
        "id": id,
        "courseId": "c1",
        "meetings": [{
            "daysOfWeek": ["MONDAY", "WEDNESDAY"],
            "startTime": "09:00",
            "endTime": "10:15",
            "location": "GHC 4102",
        }],
        "instructorIds": [professor["id"]],
        "instructors": [professor],
        "capacity": capacity,
    })
}

fn reply(status: u16, body: Value) -> ApiResponse {
    ApiResponse::new(status, Some(body))
}

fn message(status: u16, text: &str) -> ApiResponse {
    reply(status, json!({ "message": text }))
}

fn id_of(value: &Value) -> &str {
    value["id"].as_str().unwrap_or_default()
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let professor = account("p1", "PROFESSOR", "grace@example.edu", "Grace", "Hopper");
        let mut state = State {
            users: vec![
                account("s1", "STUDENT", "ada@example.edu", "Ada", "Lovelace"),
                account("s2", "STUDENT", "alan@example.edu", "Alan", "Turing"),
                professor.clone(),
                account("a1", "ADMINISTRATOR", "edsger@example.edu", "Edsger", "Dijkstra"),
            ],
            terms: vec![json!({
                "id": "t0",
                "season": "SPRING",
                "year": 2024,
                "startTime": "2024-01-10",
                "endTime": "2024-05-01",
            })],
            courses: vec![json!({
                "id": "c1",
                "name": "Principles of Imperative Computation",
                "termId": "t0",
                "department": "COMPUTER_SCIENCE",
                "code": 122,
                "description": "Semi-formal reasoning about programs",
                "courseSections": [section("cs1", 1, &professor), section("cs2", 30, &professor)],
            })],
            next_id: 1,
            ..State::default()
        };
        state.rosters.insert("cs1".to_owned(), (Vec::new(), Vec::new()));
        state.rosters.insert("cs2".to_owned(), (Vec::new(), Vec::new()));

        Arc::new(Self {
            state: Mutex::new(state),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.seen
            .lock()
            .iter()
            .filter(|s| s.method == method && s.path == path)
            .count()
    }

    pub fn gets(&self, path: &str) -> usize {
        self.count(Method::GET, path)
    }

    pub fn total(&self) -> usize {
        self.seen.lock().len()
    }

    /// Makes every `method path` request fail until cleared
    pub fn fail(&self, method: Method, path: &str, status: u16, text: &str) {
        self.state
            .lock()
            .failures
            .insert((method, path.to_owned()), (status, text.to_owned()));
    }

    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Rename a user server-side, to tell fresh data from stale
    pub fn rename(&self, user_id: &str, first_name: &str) {
        let mut state = self.state.lock();
        if let Some(user) = state.users.iter_mut().find(|u| id_of(u) == user_id) {
            user["firstName"] = json!(first_name);
        }
    }

    fn user_for(state: &State, authorization: Option<&str>) -> Option<Value> {
        let token = authorization?.strip_prefix("Bearer token-")?;
        state.users.iter().find(|u| id_of(u) == token).cloned()
    }

    fn fresh_id(state: &mut State, prefix: &str) -> String {
        let id = format!("{prefix}{}", state.next_id);
        state.next_id += 1;
        id
    }

    fn route(&self, req: &Seen) -> ApiResponse {
        let mut state = self.state.lock();
        if let Some((status, text)) = state.failures.get(&(req.method.clone(), req.path.clone())) {
            return message(*status, text);
        }

        let segments: Vec<&str> = req.path.trim_start_matches('/').split('/').collect();
        let user = Self::user_for(&state, req.authorization.as_deref());

        let public = matches!(
            (&req.method, segments.as_slice()),
            (&Method::POST, ["tokens"])
                | (&Method::POST, ["users"])
                | (&Method::GET, ["options"])
                | (&Method::GET, ["terms"])
                | (&Method::GET, ["terms", "current"])
        );
        if !public && user.is_none() {
            return message(401, "Unauthorized");
        }

        match (&req.method, segments.as_slice()) {
            (&Method::POST, ["tokens"]) => {
                let email = req.body.as_ref().and_then(|b| b["email"].as_str()).unwrap_or_default();
                match state.users.iter().find(|u| u["email"] == email) {
                    Some(found) => reply(201, json!(format!("token-{}", id_of(found)))),
                    None => message(404, "User not found"),
                }
            }
            (&Method::POST, ["users"]) => {
                let mut created = req.body.clone().unwrap_or_default();
                created["id"] = json!(Self::fresh_id(&mut state, "u"));
                state.users.push(created.clone());
                reply(201, created)
            }
            (&Method::GET, ["users"]) => {
                let email = req
                    .query
                    .iter()
                    .find(|(k, _)| k == "email")
                    .map(|(_, v)| v.as_str())
                    .unwrap_or_default();
                let found: Vec<Value> = state.users.iter().filter(|u| u["email"] == email).cloned().collect();
                reply(200, json!(found))
            }
            (&Method::GET, ["account"]) => reply(200, user.unwrap_or_default()),
            (&Method::GET, ["options"]) => reply(
                200,
                json!({
                    "roles": [{ "name": "Student", "value": "STUDENT" }],
                    "seasons": [{ "name": "Fall", "value": "FALL" }, { "name": "Spring", "value": "SPRING" }],
                }),
            ),

            (&Method::GET, ["terms"]) => reply(200, json!(state.terms)),
            (&Method::GET, ["terms", "current"]) => match state.terms.first() {
                Some(term) => reply(200, term.clone()),
                None => message(404, "No current term"),
            },
            (&Method::POST, ["terms"]) => {
                let mut term = req.body.clone().unwrap_or_default();
                term["id"] = json!(Self::fresh_id(&mut state, "t"));
                state.terms.push(term.clone());
                reply(201, term)
            }
            (&Method::GET, ["terms", id]) => match state.terms.iter().find(|t| id_of(t) == *id) {
                Some(term) => reply(200, term.clone()),
                None => message(404, "Term not found"),
            },
            (&Method::PUT, ["terms", id]) => {
                let body = req.body.clone().unwrap_or_default();
                match state.terms.iter_mut().find(|t| id_of(t) == *id) {
                    Some(term) => {
                        let mut updated = body;
                        updated["id"] = json!(id);
                        *term = updated.clone();
                        reply(200, updated)
                    }
                    None => message(404, "Term not found"),
                }
            }
            (&Method::DELETE, ["terms", id]) => {
                state.terms.retain(|t| id_of(t) != *id);
                ApiResponse::new(204, None)
            }

            (&Method::GET, ["courses"]) => {
                let words: Vec<String> = req
                    .query
                    .iter()
                    .filter(|(k, _)| k == "q")
                    .map(|(_, v)| v.to_lowercase())
                    .collect();
                let found: Vec<Value> = state
                    .courses
                    .iter()
                    .filter(|c| {
                        let name = c["name"].as_str().unwrap_or_default().to_lowercase();
                        words.iter().all(|w| name.contains(w.as_str()))
                    })
                    .cloned()
                    .collect();
                reply(200, json!(found))
            }
            (&Method::POST, ["courses"]) => {
                let body = req.body.clone().unwrap_or_default();
                let course = json!({
                    "id": Self::fresh_id(&mut state, "c-"),
                    "name": body["name"],
                    "termId": body["term"],
                    "department": body["department"],
                    "code": body["code"],
                    "description": body["description"],
                    "courseSections": [],
                });
                state.courses.push(course.clone());
                reply(201, course)
            }
            (&Method::GET, ["courses", id]) => match state.courses.iter().find(|c| id_of(c) == *id) {
                Some(course) => reply(200, course.clone()),
                None => message(404, "Course not found"),
            },
            (&Method::PUT, ["courses", id]) => {
                let body = req.body.clone().unwrap_or_default();
                match state.courses.iter_mut().find(|c| id_of(c) == *id) {
                    Some(course) => {
                        for field in ["name", "department", "code", "description"] {
                            course[field] = body[field].clone();
                        }
                        course["termId"] = body["term"].clone();
                        reply(200, course.clone())
                    }
                    None => message(404, "Course not found"),
                }
            }
            (&Method::DELETE, ["courses", id]) => {
                state.courses.retain(|c| id_of(c) != *id);
                ApiResponse::new(204, None)
            }

            (&Method::POST, ["courses", course_id, "sections"]) => {
                let body = req.body.clone().unwrap_or_default();
                let section_id = Self::fresh_id(&mut state, "cs-");
                let section = json!({
                    "id": section_id,
                    "courseId": course_id,
                    "meetings": body["meetings"],
                    "instructorIds": body["instructorIds"],
                    "instructors": [],
                    "capacity": body["capacity"].as_u64().unwrap_or(30),
                });
                state.rosters.insert(section_id, (Vec::new(), Vec::new()));
                match state.courses.iter_mut().find(|c| id_of(c) == *course_id) {
                    Some(course) => {
                        if let Some(sections) = course["courseSections"].as_array_mut() {
                            sections.push(section.clone());
                        }
                        reply(201, section)
                    }
                    None => message(404, "Course not found"),
                }
            }
            (&Method::GET, ["courses", course_id, "sections", section_id]) => {
                match Self::find_section(&state, course_id, section_id) {
                    Some(section) => reply(200, section),
                    None => message(404, "Section not found"),
                }
            }
            (&Method::PUT, ["courses", course_id, "sections", section_id]) => {
                let body = req.body.clone().unwrap_or_default();
                let updated = Self::with_section(&mut state, course_id, section_id, |section| {
                    for field in ["meetings", "instructorIds", "capacity"] {
                        if !body[field].is_null() {
                            section[field] = body[field].clone();
                        }
                    }
                });
                match updated {
                    Some(section) => reply(200, section),
                    None => message(404, "Section not found"),
                }
            }
            (&Method::DELETE, ["courses", course_id, "sections", section_id]) => {
                if let Some(course) = state.courses.iter_mut().find(|c| id_of(c) == *course_id) {
                    if let Some(sections) = course["courseSections"].as_array_mut() {
                        sections.retain(|s| id_of(s) != *section_id);
                    }
                }
                state.rosters.remove(*section_id);
                ApiResponse::new(204, None)
            }

            (&Method::GET, ["courses", _, "sections", section_id, "roster"]) => {
                match state.rosters.get(*section_id) {
                    Some((students, waitlist)) => reply(200, json!({ "students": students, "waitlist": waitlist })),
                    None => message(404, "Section not found"),
                }
            }
            (&Method::GET, ["courses", _, "sections", section_id, "registrations"]) => {
                match state.rosters.get(*section_id) {
                    Some((students, waitlist)) => {
                        let all: Vec<Value> = students.iter().chain(waitlist).cloned().collect();
                        reply(200, json!(all))
                    }
                    None => message(404, "Section not found"),
                }
            }
            (&Method::POST, ["courses", course_id, "sections", section_id, "registrations"]) => {
                let user = user.unwrap_or_default();
                let capacity = Self::find_section(&state, course_id, section_id)
                    .and_then(|s| s["capacity"].as_u64())
                    .unwrap_or(0) as usize;
                let registration_id = Self::fresh_id(&mut state, "r");
                let Some((students, waitlist)) = state.rosters.get_mut(*section_id) else {
                    return message(404, "Section not found");
                };
                if students.iter().chain(waitlist.iter()).any(|r| r["userId"] == user["id"]) {
                    return message(409, "Already registered");
                }

                let registration = json!({
                    "id": registration_id,
                    "userId": user["id"],
                    "courseSectionId": section_id,
                    "createdAt": "2024-08-01T12:00:00Z",
                    "priority": false,
                    "user": user,
                });
                if students.len() < capacity {
                    students.push(registration.clone());
                } else {
                    waitlist.push(registration.clone());
                }
                reply(201, registration)
            }
            (&Method::DELETE, ["courses", _, "sections", section_id, "registrations"]) => {
                let user_id = user.map(|u| u["id"].clone()).unwrap_or_default();
                let Some((students, waitlist)) = state.rosters.get_mut(*section_id) else {
                    return message(404, "Section not found");
                };
                let before = students.len() + waitlist.len();
                students.retain(|r| r["userId"] != user_id);
                waitlist.retain(|r| r["userId"] != user_id);
                if students.len() + waitlist.len() == before {
                    return message(404, "Not registered");
                }
                ApiResponse::new(204, None)
            }
            (&Method::PUT, ["courses", _, "sections", section_id, "registrations", registration_id]) => {
                let priority = req.body.as_ref().map(|b| b["priority"].clone()).unwrap_or_default();
                let Some((students, waitlist)) = state.rosters.get_mut(*section_id) else {
                    return message(404, "Section not found");
                };
                match students
                    .iter_mut()
                    .chain(waitlist.iter_mut())
                    .find(|r| id_of(r) == *registration_id)
                {
                    Some(registration) => {
                        registration["priority"] = priority;
                        reply(200, registration.clone())
                    }
                    None => message(404, "Registration not found"),
                }
            }

            _ => message(404, "Not found"),
        }
    }

    fn find_section(state: &State, course_id: &str, section_id: &str) -> Option<Value> {
        state
            .courses
            .iter()
            .find(|c| id_of(c) == course_id)?["courseSections"]
            .as_array()?
            .iter()
            .find(|s| id_of(s) == section_id)
            .cloned()
    }

    fn with_section(
        state: &mut State,
        course_id: &str,
        section_id: &str,
        f: impl FnOnce(&mut Value),
    ) -> Option<Value> {
        let section = state
            .courses
            .iter_mut()
            .find(|c| id_of(c) == course_id)?["courseSections"]
            .as_array_mut()?
            .iter_mut()
            .find(|s| id_of(s) == section_id)?;
        f(section);
        Some(section.clone())
    }
}

#[async_trait]
impl client::Transport for FakeBackend {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let seen = Seen {
            method: request.method.clone(),
            path: request.url.trim_start_matches(BASE_URL).to_owned(),
            query: request.query.clone(),
            authorization: request
                .headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body: request.body.clone(),
        };

        // Lets concurrent readers pile up before anything is answered
        tokio::task::yield_now().await;

        let response = self.route(&seen);
        self.seen.lock().push(seen);
        Ok(response)
    }
}

/// Collects notifications
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.notices.lock().iter().map(|n| n.title.clone()).collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

pub struct Harness {
    pub ctx: AppContext,
    pub backend: Arc<FakeBackend>,
    pub notices: Arc<RecordingNotifier>,
}

/// A logged-out context over a fresh backend
pub fn harness() -> Harness {
    harness_with_dedupe(Duration::from_secs(60))
}

pub fn harness_with_dedupe(dedupe_interval: Duration) -> Harness {
    let backend = FakeBackend::new();
    let (ctx, notices) = context(&backend, dedupe_interval);

    Harness {
        ctx,
        backend,
        notices,
    }
}

/// A second, independent client of the same backend
pub fn context(
    backend: &Arc<FakeBackend>,
    dedupe_interval: Duration,
) -> (AppContext, Arc<RecordingNotifier>) {
    let notices = Arc::new(RecordingNotifier::default());
    let ctx = AppContext::new(
        Session::in_memory(),
        ClientFactory::new(backend.clone(), BASE_URL),
        ResourceCache::new(dedupe_interval),
        notices.clone(),
    );
    (ctx, notices)
}

/// A context logged in with `token`, notifications cleared
pub fn logged_in(token: &str) -> Harness {
    let harness = harness();
    harness.ctx.auth().login(token);
    harness.notices.clear();
    harness
}
