use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter};
use utoipa::ToSchema;

/// Pages reachable from the side menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumIter, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Destination {
    Dashboard,
    Tasks,
    Attendance,
    Payroll,
    Profile,
}

impl Destination {
    pub fn label(&self) -> &'static str {
        match self {
            Destination::Dashboard => "Dashboard",
            Destination::Tasks => "Tasks",
            Destination::Attendance => "Attendance",
            Destination::Payroll => "Payroll",
            Destination::Profile => "Profile",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Destination::Dashboard => "/",
            Destination::Tasks => "/tasks",
            Destination::Attendance => "/attendance",
            Destination::Payroll => "/payroll",
            Destination::Profile => "/profile",
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuEntry {
    pub destination: Destination,
    pub label: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignOutAction {
    pub label: &'static str,
    pub method: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Menu {
    pub entries: Vec<MenuEntry>,
    pub sign_out: SignOutAction,
}

pub fn menu() -> Menu {
    Menu {
        entries: Destination::iter()
            .map(|destination| MenuEntry {
                destination,
                label: destination.label(),
                path: destination.path(),
            })
            .collect(),
        sign_out: SignOutAction {
            label: "Sign Out",
            method: "POST",
            path: "/auth/logout",
        },
    }
}
