//! Shared application state handed to every handler through `web::Data`.

use std::sync::Arc;
use std::time::Duration;

use crate::chain::{JsonRpcClient, SuiAdapter, SuiClient};
use crate::config::Settings;
use crate::idempotency::IdempotencyCache;

/// Twitch OAuth application credentials.
#[derive(Debug, Clone, Default)]
pub struct TwitchApp {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

pub struct AppState {
    pub sui: SuiAdapter,
    pub idempotency: Arc<IdempotencyCache>,
    pub twitch: TwitchApp,
    pub frontend_url: String,
    /// Outbound client for third-party HTTP APIs.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(settings: &Settings, client: Arc<dyn SuiClient>) -> Self {
        Self {
            sui: SuiAdapter::new(client, settings),
            idempotency: Arc::new(IdempotencyCache::new(Duration::from_secs(
                settings.idempotency_ttl,
            ))),
            twitch: TwitchApp {
                client_id: settings.twitch_client_id.clone(),
                client_secret: settings.twitch_client_secret.clone(),
                redirect_uri: settings.twitch_redirect_uri.clone(),
            },
            frontend_url: settings.frontend_url.trim_end_matches('/').to_owned(),
            http: reqwest::Client::new(),
        }
    }

    /// State backed by the JSON-RPC full node from `SUI_RPC_URL`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings, Arc::new(JsonRpcClient::new(&settings.sui_rpc_url)))
    }
}
