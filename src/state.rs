use std::sync::Arc;

use crate::auth::IdentityGateway;
use crate::service::ProfileService;

#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileService>,
    pub identity: Arc<dyn IdentityGateway>,
}
