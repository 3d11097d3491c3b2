mod common;

use chrono::NaiveDate;
use client::{ClientError, NoticeLevel, ResourceState};
use common::{ADMIN_TOKEN, OTHER_STUDENT_TOKEN, STUDENT_TOKEN, context, harness, logged_in};
use models::{
    Department, Placement, Roster, Season,
    forms::{CourseForm, SectionForm, TermForm},
};
use reqwest::Method;
use serde_json::json;
use std::{collections::BTreeSet, time::Duration};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn members(roster: &Roster) -> BTreeSet<String> {
    roster.members().into_iter().map(str::to_owned).collect()
}

fn fall_2024() -> TermForm {
    TermForm {
        season: Season::Fall,
        year: 2024,
        start_time: date(2024, 8, 1),
        end_time: date(2024, 12, 15),
    }
}

#[tokio::test]
async fn test_dependent_hooks_without_ids_stay_inactive() {
    let h = logged_in(STUDENT_TOKEN);

    assert_eq!(h.ctx.course(None).load().await, ResourceState::default());
    assert_eq!(h.ctx.term(Some("")).load().await, ResourceState::default());
    assert!(h.ctx.course_section(Some("c1"), None).load().await.data.is_none());
    assert!(h.ctx.roster(None, Some("cs1")).load().await.data.is_none());
    assert!(h.ctx.registrations(None, None).load().await.data.is_none());

    assert_eq!(h.backend.total(), 0);
}

#[tokio::test]
async fn test_authenticated_hooks_stay_inactive_while_logged_out() {
    let h = harness();

    let course = h.ctx.course(Some("c1"));
    assert!(!course.is_active());
    assert!(course.load().await.data.is_none());
    assert!(h.ctx.account().load().await.data.is_none());
    assert_eq!(h.backend.total(), 0);

    // Public resources still load
    let terms = h.ctx.terms().fetch().await.unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(h.backend.seen()[0].authorization, None);
}

#[tokio::test]
async fn test_hook_becomes_active_after_login() {
    let h = harness();
    let course = h.ctx.course(Some("c1"));
    assert!(course.key().is_none());

    h.ctx.auth().login(STUDENT_TOKEN);
    assert_eq!(course.key(), Some("/courses/c1"));
    assert_eq!(course.fetch().await.unwrap().code, 122);
}

#[tokio::test]
async fn test_concurrent_loads_share_one_request() {
    let h = logged_in(STUDENT_TOKEN);
    let first = h.ctx.course(Some("c1"));
    let second = h.ctx.course(Some("c1"));

    let (a, b) = tokio::join!(first.load(), second.load());

    assert_eq!(h.backend.gets("/courses/c1"), 1);
    assert_eq!(a.data.unwrap().id, "c1");
    assert_eq!(b.data.unwrap().id, "c1");
}

#[tokio::test]
async fn test_reload_within_dedupe_window_is_served_from_cache() {
    let h = logged_in(STUDENT_TOKEN);
    let terms = h.ctx.terms();

    terms.load().await;
    terms.load().await;
    assert_eq!(h.backend.gets("/terms"), 1);

    terms.revalidate().await;
    assert_eq!(h.backend.gets("/terms"), 2);
}

#[tokio::test]
async fn test_register_then_unregister_restores_membership() {
    let h = logged_in(STUDENT_TOKEN);
    let section = h.ctx.course_section(Some("c1"), Some("cs2"));
    let roster = h.ctx.roster(Some("c1"), Some("cs2"));

    let before = members(&roster.fetch().await.unwrap());

    section.register().await.unwrap();
    let during = roster.state().data.unwrap();
    assert!(members(&during).contains("s1"));
    assert_eq!(section.is_registered("s1"), Some(Placement::Student));

    section.unregister().await.unwrap();
    let after = roster.state().data.unwrap();
    assert_eq!(members(&after), before);
    assert_eq!(section.is_registered("s1"), None);

    assert_eq!(
        h.notices.titles(),
        ["Registered for Course Section", "Unregistered for Course Section"]
    );
    assert!(!section.is_registering());
    assert!(!section.is_unregistering());
}

#[tokio::test]
async fn test_full_section_places_on_waitlist() {
    let h = logged_in(STUDENT_TOKEN);
    let (other, _) = context(&h.backend, Duration::from_secs(60));
    other.auth().login(OTHER_STUDENT_TOKEN);

    let mine = h.ctx.course_section(Some("c1"), Some("cs1"));
    let theirs = other.course_section(Some("c1"), Some("cs1"));
    h.ctx.roster(Some("c1"), Some("cs1")).load().await;
    other.roster(Some("c1"), Some("cs1")).load().await;

    mine.register().await.unwrap();
    theirs.register().await.unwrap();

    assert_eq!(theirs.is_registered("s1"), Some(Placement::Student));
    assert_eq!(theirs.is_registered("s2"), Some(Placement::Waitlist));
    assert!(other.roster(Some("c1"), Some("cs1")).state().data.unwrap().is_partitioned());
}

#[tokio::test]
async fn test_failed_register_leaves_cache_alone() {
    let h = logged_in(STUDENT_TOKEN);
    let section = h.ctx.course_section(Some("c1"), Some("cs2"));
    let roster = h.ctx.roster(Some("c1"), Some("cs2"));

    section.register().await.unwrap();
    roster.load().await;
    let before = roster.state();
    let requests = h.backend.total();
    h.notices.clear();

    let err = section.register().await.unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(roster.state(), before);
    // The failed POST is the only new request: nothing was revalidated
    assert_eq!(h.backend.total(), requests + 1);
    let notice = h.notices.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.description.as_deref(), Some("Already registered"));
}

#[tokio::test]
async fn test_register_refreshes_account() {
    let h = logged_in(STUDENT_TOKEN);
    h.ctx.account().load().await;
    h.backend.rename("s1", "Augusta");

    h.ctx.course_section(Some("c1"), Some("cs2")).register().await.unwrap();

    assert_eq!(h.ctx.account().state().data.unwrap().first_name, "Augusta");
}

#[tokio::test]
async fn test_unregister_refetches_every_membership_view_once() {
    let h = logged_in(STUDENT_TOKEN);
    let section = h.ctx.course_section(Some("c1"), Some("cs2"));
    section.register().await.unwrap();

    h.ctx.account().load().await;
    h.ctx.roster(Some("c1"), Some("cs2")).load().await;
    h.ctx.registrations(Some("c1"), Some("cs2")).load().await;

    section.unregister().await.unwrap();

    assert_eq!(h.backend.gets("/account"), 2);
    assert_eq!(h.backend.gets("/courses/c1/sections/cs2/roster"), 2);
    assert_eq!(h.backend.gets("/courses/c1/sections/cs2/registrations"), 2);
    let registrations = h.ctx.registrations(Some("c1"), Some("cs2")).state().data.unwrap();
    assert!(registrations.iter().all(|r| r.user_id != "s1"));
}

#[tokio::test]
async fn test_delete_section_patches_course_without_refetch() {
    let h = logged_in(ADMIN_TOKEN);
    let course = h.ctx.course(Some("c1"));
    let section = h.ctx.course_section(Some("c1"), Some("cs1"));
    course.load().await;
    section.load().await;
    h.ctx.roster(Some("c1"), Some("cs1")).load().await;

    section.remove().await.unwrap();

    let cached = course.state().data.unwrap();
    assert!(cached.section("cs1").is_none());
    assert!(cached.section("cs2").is_some());
    assert_eq!(h.backend.gets("/courses/c1"), 1);

    assert!(section.state().data.is_none());
    assert_eq!(h.ctx.cache().data("/courses/c1/sections/cs1"), None);
    assert_eq!(h.ctx.cache().data("/courses/c1/sections/cs1/roster"), None);
    assert_eq!(h.notices.titles(), ["Course Section Deleted"]);
}

#[tokio::test]
async fn test_create_term_updates_list_and_single_entry() {
    let h = logged_in(ADMIN_TOKEN);
    let terms = h.ctx.terms();
    assert_eq!(terms.fetch().await.unwrap().len(), 1);

    let term = h.ctx.create_term(&fall_2024()).await.unwrap();
    assert_eq!(term.id, "t1");

    let post = h
        .backend
        .seen()
        .into_iter()
        .find(|s| s.method == Method::POST)
        .unwrap();
    assert_eq!(post.path, "/terms");
    assert_eq!(
        post.body,
        Some(json!({
            "season": "FALL",
            "year": 2024,
            "startTime": "2024-08-01",
            "endTime": "2024-12-15",
        }))
    );

    let single = h.ctx.term(Some("t1")).state().data.unwrap();
    assert_eq!(single.season, Season::Fall);
    assert_eq!(single.end_time, date(2024, 12, 15));
    assert_eq!(h.backend.gets("/terms/t1"), 0);

    let list = terms.state().data.unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().any(|t| t.id == "t1"));
    assert_eq!(h.notices.titles(), ["Term Created"]);
}

#[tokio::test]
async fn test_update_term_writes_entry_and_refreshes_list() {
    let h = logged_in(ADMIN_TOKEN);
    let terms = h.ctx.terms();
    let term = h.ctx.term(Some("t0"));
    terms.load().await;
    term.load().await;

    let updated = term.update(&fall_2024()).await.unwrap().unwrap();

    assert_eq!(updated.season, Season::Fall);
    assert_eq!(term.state().data.unwrap().year, 2024);
    assert_eq!(term.state().data.unwrap().season, Season::Fall);
    assert_eq!(h.backend.gets("/terms"), 2);
    assert_eq!(terms.state().data.unwrap()[0].season, Season::Fall);
    assert!(!term.is_updating());
}

#[tokio::test]
async fn test_remove_term_tombstones_and_refreshes() {
    let h = logged_in(ADMIN_TOKEN);
    let terms = h.ctx.terms();
    let term = h.ctx.term(Some("t0"));
    terms.load().await;
    term.load().await;

    term.remove().await.unwrap();

    assert!(term.state().data.is_none());
    assert!(terms.state().data.unwrap().is_empty());
    assert_eq!(h.notices.titles(), ["Term Deleted"]);
}

#[tokio::test]
async fn test_invalid_forms_issue_no_request() {
    let h = logged_in(ADMIN_TOKEN);

    let mut form = fall_2024();
    form.year = 1800;
    let err = h.ctx.create_term(&form).await.unwrap_err();
    match err {
        ClientError::Validation(errors) => assert!(errors.field("year").is_some()),
        other => panic!("expected validation error, got {other:?}"),
    }

    let section = SectionForm {
        instructor_ids: Vec::new(),
        capacity: Some(0),
        meetings: Vec::new(),
    };
    let err = h.ctx.course(Some("c1")).create_section(&section).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    assert_eq!(h.backend.total(), 0);
    assert!(h.notices.titles().is_empty());
}

#[tokio::test]
async fn test_actions_require_a_session() {
    let h = harness();
    let section = h.ctx.course_section(Some("c1"), Some("cs2"));

    assert_eq!(section.register().await, Err(ClientError::Unauthenticated));
    assert_eq!(
        h.ctx.course_section(Some("c1"), None).remove().await,
        Err(ClientError::MissingId("section"))
    );
    assert_eq!(h.backend.total(), 0);
}

#[tokio::test]
async fn test_course_update_and_section_creation() {
    let h = logged_in(ADMIN_TOKEN);
    let course = h.ctx.course(Some("c1"));
    course.load().await;

    let form = CourseForm {
        name: "Functional Programming".to_owned(),
        term_id: "t0".to_owned(),
        department: Department::ComputerScience,
        code: 150,
        description: "Types and proofs".to_owned(),
    };
    let updated = course.update(&form).await.unwrap().unwrap();
    assert_eq!(updated.code, 150);
    assert_eq!(course.state().data.unwrap().name, "Functional Programming");

    let section = SectionForm {
        instructor_ids: vec!["p1".to_owned()],
        capacity: Some(12),
        meetings: vec!["TR 13:00-14:20 DH 2210".parse().unwrap()],
    };
    let created = course.create_section(&section).await.unwrap().unwrap();

    assert_eq!(created.capacity, 12);
    assert_eq!(course.state().data.unwrap().course_sections.len(), 3);
    assert!(
        h.ctx
            .course_section(Some("c1"), Some(&created.id))
            .state()
            .data
            .is_some()
    );
    assert_eq!(h.notices.titles(), ["Course Updated", "Course Section Created"]);
}

#[tokio::test]
async fn test_remove_course_tombstones_everything_under_it() {
    let h = logged_in(ADMIN_TOKEN);
    let course = h.ctx.course(Some("c1"));
    course.load().await;
    h.ctx.course_section(Some("c1"), Some("cs2")).load().await;
    h.ctx.roster(Some("c1"), Some("cs2")).load().await;

    course.remove().await.unwrap();

    let cache = h.ctx.cache();
    for key in ["/courses/c1", "/courses/c1/sections/cs2", "/courses/c1/sections/cs2/roster"] {
        assert_eq!(cache.data(key), None, "{key}");
    }
}

#[tokio::test]
async fn test_set_priority_refreshes_roster() {
    let h = logged_in(STUDENT_TOKEN);
    h.ctx.course_section(Some("c1"), Some("cs2")).register().await.unwrap();

    let (admin, notices) = context(&h.backend, Duration::from_secs(60));
    admin.auth().login(ADMIN_TOKEN);
    let roster = admin.roster(Some("c1"), Some("cs2"));
    let registration = roster.fetch().await.unwrap().students[0].clone();
    assert!(!registration.priority);

    roster.set_priority(&registration.id, true).await.unwrap();

    assert!(roster.state().data.unwrap().students[0].priority);
    assert_eq!(notices.last().unwrap().title, "Registration Updated");
    assert!(!roster.is_updating_priority());
}
