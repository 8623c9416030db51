use std::sync::Arc;

use crate::auth::sessions::RevokedTokens;
use crate::clock::Clock;
use crate::gateway::DataGateway;

/// Shared by every handler through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn DataGateway>,
    pub clock: Arc<dyn Clock>,
    pub revoked: RevokedTokens,
}

impl AppState {
    pub fn new(gateway: Arc<dyn DataGateway>, clock: Arc<dyn Clock>, refresh_ttl_secs: u64) -> Self {
        Self {
            gateway,
            clock,
            revoked: RevokedTokens::new(refresh_ttl_secs),
        }
    }
}
