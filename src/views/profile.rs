use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use super::state::ViewState;
use crate::display::{ROLE_BADGE, format_date};
use crate::gateway::{DataGateway, Query, Resource, fetch};
use crate::model::user::User;

pub const PROFILE_NOT_FOUND: &str = "Profile not found";

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileCard {
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub role_color: &'static str,
    pub department: String,
    #[schema(example = "Jan 15, 2024")]
    pub join_date: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfilePage {
    pub profile: Option<ProfileCard>,
    pub error: Option<String>,
}

/// The signed-in user's own row. The email belongs to the session, not
/// to `users`.
pub struct ProfileController {
    gateway: Arc<dyn DataGateway>,
    user_id: String,
    email: String,
    state: ViewState<Option<User>>,
    not_found: bool,
}

impl ProfileController {
    pub fn new(gateway: Arc<dyn DataGateway>, user_id: String, email: String) -> Self {
        Self {
            gateway,
            user_id,
            email,
            state: ViewState::new(None),
            not_found: false,
        }
    }

    pub fn state(&self) -> &ViewState<Option<User>> {
        &self.state
    }

    #[tracing::instrument(name = "profile", skip(self), fields(user_id = %self.user_id))]
    pub async fn activate(&mut self) {
        self.state.begin();
        let query = Query::new().eq("id", self.user_id.as_str());
        let rows = fetch::<User>(self.gateway.as_ref(), Resource::Users, &query).await;

        let user_id = &self.user_id;
        let mut not_found = self.not_found;
        let applied = self.state.resolve("profile", rows, |profile, mut rows| {
            *profile = match rows.len() {
                1 => rows.pop(),
                n => {
                    warn!(%user_id, rows = n, "expected exactly one user row");
                    None
                }
            };
            not_found = profile.is_none();
        });
        if applied {
            self.not_found = not_found;
        }
    }

    pub fn render(&self) -> ProfilePage {
        let profile = self.state.data().as_ref().map(|user| ProfileCard {
            full_name: user.full_name.clone(),
            email: self.email.clone(),
            role: user.role.to_string(),
            role_color: ROLE_BADGE,
            department: user.department.clone(),
            join_date: format_date(user.join_date),
        });
        let error = match self.state.error() {
            Some(banner) => Some(banner.to_string()),
            None if self.not_found => Some(PROFILE_NOT_FOUND.to_string()),
            None => None,
        };
        ProfilePage { profile, error }
    }
}
