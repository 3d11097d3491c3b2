//! Cache keys. A key is the request path of the resource it caches.

pub const ACCOUNT: &str = "/account";
pub const OPTIONS: &str = "/options";
pub const TERMS: &str = "/terms";
pub const CURRENT_TERM: &str = "/terms/current";
pub const COURSES: &str = "/courses";
pub const USERS: &str = "/users";
pub const TOKENS: &str = "/tokens";

pub fn term(term_id: &str) -> String {
    format!("{TERMS}/{term_id}")
}

pub fn course(course_id: &str) -> String {
    format!("{COURSES}/{course_id}")
}

pub fn sections(course_id: &str) -> String {
    format!("{}/sections", course(course_id))
}

pub fn section(course_id: &str, section_id: &str) -> String {
    format!("{}/{section_id}", sections(course_id))
}

pub fn roster(course_id: &str, section_id: &str) -> String {
    format!("{}/roster", section(course_id, section_id))
}

pub fn registrations(course_id: &str, section_id: &str) -> String {
    format!("{}/registrations", section(course_id, section_id))
}

pub fn registration(course_id: &str, section_id: &str, registration_id: &str) -> String {
    format!("{}/{registration_id}", registrations(course_id, section_id))
}

/// Whether `key` is `parent` itself or a path beneath it
pub fn is_under(key: &str, parent: &str) -> bool {
    key.strip_prefix(parent)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Keys whose contents depend on who is logged in
pub fn is_user_scoped(key: &str) -> bool {
    key != OPTIONS
}
