use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use models::{Department, Meeting, Role, Season};

#[derive(Debug, Parser)]
#[command(name = "registrar", about = "Browse courses and manage registrations", version)]
pub struct Cli {
    /// Base URL of the registrar API, overriding REGISTRAR_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in by email, or with a token issued elsewhere
    Login {
        email: Option<String>,
        #[arg(long, conflicts_with = "email", required_unless_present = "email")]
        token: Option<String>,
    },
    /// Forget the session and everything cached for it
    Logout,
    /// Show the logged in account and its registrations
    Whoami,
    /// Create an account. Does not log in.
    Signup {
        email: String,
        first_name: String,
        last_name: String,
        #[arg(long, default_value = "student")]
        role: Role,
    },
    /// List the choices offered by the server
    Options,
    /// List the actions available to the logged in account
    Actions,
    #[command(subcommand)]
    Terms(TermCommand),
    #[command(subcommand)]
    Courses(CourseCommand),
    #[command(subcommand)]
    Section(SectionCommand),
    #[command(subcommand)]
    Users(UserCommand),
}

#[derive(Debug, Subcommand)]
pub enum TermCommand {
    List,
    /// Show the term running today
    Current,
    Create(TermArgs),
    Edit {
        id: String,
        #[command(flatten)]
        patch: TermPatch,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct TermArgs {
    #[arg(long)]
    pub season: Season,
    #[arg(long)]
    pub year: u16,
    /// First day of the term (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,
    /// Last day of the term (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,
}

#[derive(Debug, Args)]
pub struct TermPatch {
    #[arg(long)]
    pub season: Option<Season>,
    #[arg(long)]
    pub year: Option<u16>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum CourseCommand {
    /// Search by name, optionally within a term or department
    Search {
        words: Vec<String>,
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        department: Option<Department>,
    },
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        term: String,
        #[arg(long)]
        department: Department,
        #[arg(long)]
        code: u32,
        #[arg(long, default_value = "")]
        description: String,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        department: Option<Department>,
        #[arg(long)]
        code: Option<u32>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct SectionRef {
    pub course: String,
    pub section: String,
}

#[derive(Debug, Subcommand)]
pub enum SectionCommand {
    Show(SectionRef),
    Create {
        course: String,
        /// Instructor email address, repeatable
        #[arg(long = "instructor", required = true)]
        instructors: Vec<String>,
        #[arg(long)]
        capacity: Option<u32>,
        /// Meeting as "MWF 09:00-10:50 GHC 4102", repeatable
        #[arg(long = "meeting", required = true)]
        meetings: Vec<Meeting>,
    },
    Edit {
        #[command(flatten)]
        target: SectionRef,
        /// Instructor email address to add, repeatable
        #[arg(long = "add-instructor")]
        add: Vec<String>,
        /// Instructor id to remove, repeatable
        #[arg(long = "remove-instructor")]
        remove: Vec<String>,
        #[arg(long)]
        capacity: Option<u32>,
        /// Replaces every meeting when given, repeatable
        #[arg(long = "meeting")]
        meetings: Vec<Meeting>,
    },
    Delete(SectionRef),
    Register(SectionRef),
    Unregister(SectionRef),
    /// Show the students and the waitlist
    Roster(SectionRef),
    /// Move a registration to the front of the waitlist, or back
    Prioritize {
        #[command(flatten)]
        target: SectionRef,
        registration: String,
        #[arg(long)]
        off: bool,
    },
    /// Print the roster whenever it changes, until interrupted
    Watch {
        #[command(flatten)]
        target: SectionRef,
        /// Seconds between refreshes
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Look an account up by email address
    Find { email: String },
}
