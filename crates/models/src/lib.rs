//! Domain types shared by the registrar client and its front ends.

pub mod account;
pub mod course;
pub mod days;
pub mod forms;
pub mod options;
pub mod registration;
pub mod term;

pub use account::{Account, Role};
pub use course::{Course, CourseSection, Department, Meeting, TimeRange};
pub use days::{DayOfWeek, DaySet};
pub use options::{OptionItem, Options};
pub use registration::{Placement, Registration, Roster};
pub use term::{Season, Term};
