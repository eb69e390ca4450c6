use std::sync::Arc;

use skylane_core::Datastore;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub auth: AuthConfig,
}
