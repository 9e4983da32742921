use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::config::AppConfig;
use crate::database::Database;
use crate::services::google::GoogleClient;

/// Process-wide immutable wiring, built once at startup and handed to the
/// router. Nothing here mutates after construction.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub codec: Arc<TokenCodec>,
    pub db: Database,
    pub google: Arc<GoogleClient>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Self {
        let codec = Arc::new(TokenCodec::new(&config.security));
        let db = Database::new(&config.database);
        let google = Arc::new(GoogleClient::new(config.google.clone()));
        Self {
            config: Arc::new(config),
            codec,
            db,
            google,
        }
    }
}
