use crate::resource::ResourceState;
use models::{Account, Role};
use std::fmt::{Display, Formatter, Result as FmtResult};
use strum::{EnumIter, IntoEnumIterator};

const ADMIN_ONLY: &[Role] = &[Role::Administrator];
const STAFF: &[Role] = &[Role::Administrator, Role::Professor];
const EVERYONE: &[Role] = &[Role::Student, Role::Professor, Role::Administrator];

/// Actions hidden from users without the right role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Surface {
    CreateCourse,
    EditCourse,
    DeleteCourse,
    CreateSection,
    EditSection,
    DeleteSection,
    CreateTerm,
    EditTerm,
    DeleteTerm,
    PrioritizeRegistration,
    RegisterForSection,
}

impl Surface {
    pub fn required_roles(&self) -> &'static [Role] {
        match self {
            Surface::PrioritizeRegistration => STAFF,
            Surface::RegisterForSection => EVERYONE,
            _ => ADMIN_ONLY,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Surface::CreateCourse => "Create Course",
            Surface::EditCourse => "Edit Course",
            Surface::DeleteCourse => "Delete Course",
            Surface::CreateSection => "Create Section",
            Surface::EditSection => "Edit Section",
            Surface::DeleteSection => "Delete Section",
            Surface::CreateTerm => "Create Term",
            Surface::EditTerm => "Edit Term",
            Surface::DeleteTerm => "Delete Term",
            Surface::PrioritizeRegistration => "Prioritize Registration",
            Surface::RegisterForSection => "Register",
        }
    }
}

impl Display for Surface {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.label())
    }
}

/// Whether the account may see a surface requiring one of `roles`
///
/// # Arguments
/// * `account` - State of the account resource
/// * `roles` - Roles allowed to see the surface
///
/// # Returns
/// `true` only when the account is loaded, not loading, not errored, and
/// holds one of the roles
pub fn permits(account: &ResourceState<Account>, roles: &[Role]) -> bool {
    if account.is_loading || account.error.is_some() {
        return false;
    }
    account.data.as_ref().is_some_and(|a| a.has_role(roles))
}

/// Renders `content` only for permitted accounts
pub struct RoleGate<'a> {
    account: &'a ResourceState<Account>,
}

impl<'a> RoleGate<'a> {
    pub fn new(account: &'a ResourceState<Account>) -> Self {
        Self { account }
    }

    pub fn allows(&self, surface: Surface) -> bool {
        permits(self.account, surface.required_roles())
    }

    /// `Some(content())` when the surface is permitted; `content` is not
    /// evaluated otherwise
    pub fn show<T>(&self, surface: Surface, content: impl FnOnce() -> T) -> Option<T> {
        self.allows(surface).then(content)
    }

    /// Every surface the account may see
    pub fn visible(&self) -> Vec<Surface> {
        Surface::iter().filter(|s| self.allows(*s)).collect()
    }
}
