use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
    /// Role added to the store after this build.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognised_roles_fall_back() {
        let role: Role = serde_json::from_str("\"contractor\"").unwrap();
        assert_eq!(role, Role::Unknown);
    }

    #[test]
    fn role_names_match_the_store() {
        assert_eq!(Role::Manager.as_ref(), "manager");
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    }
}
