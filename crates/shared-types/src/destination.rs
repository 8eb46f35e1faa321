use serde::{Deserialize, Serialize};

use crate::Role;

/// Where the gate and the role router send a user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Destination {
    Login,
    EmployeeLanding,
    ManagerLanding,
    AdminLanding,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Login => "/login",
            Destination::EmployeeLanding => "/employee/dashboard",
            Destination::ManagerLanding => "/manager/dashboard",
            Destination::AdminLanding => "/admin/users",
        }
    }

    /// Landing view for a resolved role.
    pub fn landing_for(role: Role) -> Self {
        match role {
            Role::Manager => Destination::ManagerLanding,
            Role::Admin => Destination::AdminLanding,
            Role::Employee => Destination::EmployeeLanding,
        }
    }
}
