use client::{ClientError, Notice, NoticeLevel, Notifier};
use models::{Account, Course, CourseSection, OptionItem, Options, Roster, Term};

/// Prints notices to the terminal, errors and warnings on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        log::debug!("notice: {notice}");
        match notice.level {
            NoticeLevel::Success => println!("{notice}"),
            NoticeLevel::Warning => eprintln!("warning: {notice}"),
            NoticeLevel::Error => eprintln!("error: {notice}"),
        }
    }
}

/// Prints an error the notifier has not already shown
pub fn print_error(err: &ClientError) {
    match err {
        // Reported through the notifier at the call site
        e if e.is_request() => {}
        ClientError::Validation(errors) => {
            eprintln!("error: invalid input");
            for error in errors.iter() {
                eprintln!("  {error}");
            }
        }
        ClientError::Unauthenticated => eprintln!("error: not logged in, run `registrar login` first"),
        e => eprintln!("error: {e}"),
    }
}

pub fn print_account(account: &Account) {
    println!("{account}");
    println!("  id: {}", account.id);
    if account.registrations.is_empty() {
        println!("  no registrations");
    } else {
        println!("  registrations:");
        for registration in &account.registrations {
            let priority = if registration.priority { " (priority)" } else { "" };
            println!("    section {}{priority}", registration.course_section_id);
        }
    }
}

pub fn print_terms(terms: &[Term]) {
    for term in terms {
        print_term(term);
    }
}

pub fn print_term(term: &Term) {
    println!("{:<10} {:<12} {} to {}", term.id, term.to_string(), term.start_time, term.end_time);
}

pub fn print_courses(courses: &[Course]) {
    if courses.is_empty() {
        println!("No courses found");
    }
    for course in courses {
        println!("{:<10} {course}", course.id);
    }
}

pub fn print_course(course: &Course) {
    println!("{course}");
    println!("  id: {}", course.id);
    match &course.term {
        Some(term) => println!("  term: {term}"),
        None => println!("  term: {}", course.term_id),
    }
    if !course.description.is_empty() {
        println!("  {}", course.description);
    }
    for section in &course.course_sections {
        print_section(section);
    }
}

pub fn print_section(section: &CourseSection) {
    println!("  section {} (capacity {})", section.id, section.capacity);
    if !section.instructors.is_empty() {
        println!("    taught by {}", section.instructor_names());
    }
    for meeting in &section.meetings {
        println!("    {meeting}");
    }
}

pub fn print_roster(roster: &Roster, capacity: Option<u32>) {
    match capacity {
        Some(capacity) => println!("Students ({}/{capacity})", roster.students.len()),
        None => println!("Students ({})", roster.students.len()),
    }
    for (i, registration) in roster.students.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, registration.display_name());
    }

    println!("Waitlist ({})", roster.waitlist.len());
    for (i, registration) in roster.waitlist.iter().enumerate() {
        let priority = if registration.priority { " *" } else { "" };
        println!(
            "  {:>3}. {}{priority}  [{}]",
            i + 1,
            registration.display_name(),
            registration.id
        );
    }
}

pub fn print_options(options: &Options) {
    let groups: [(&str, &[OptionItem]); 5] = [
        ("Roles", &options.roles),
        ("Departments", &options.departments),
        ("Days", &options.days_of_week),
        ("Terms", &options.terms),
        ("Seasons", &options.seasons),
    ];

    for (title, items) in groups {
        println!("{title}");
        for item in items {
            println!("  {:<28} {}", item.value, item.name);
        }
    }
}
