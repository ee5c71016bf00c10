use std::sync::Arc;

use crate::services::auth_service::AuthService;
use crate::services::resource_service::ResourceService;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub resource_service: Arc<ResourceService>,
}
