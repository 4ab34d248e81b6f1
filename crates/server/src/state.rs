use std::collections::HashMap;
use std::sync::Arc;

use forge::ForgeApi;

#[derive(Clone)]
pub struct AppState {
    pub forge: Arc<dyn ForgeApi>,
    pub sites: Arc<HashMap<String, domain::Site>>,
    /// Forge account comments are committed as.
    pub commenting_user: String,
}
