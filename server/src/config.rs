//! Runtime configuration for the Purple SUI server.

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    /// `host:port` the HTTP server binds to.
    pub server_addr: String,
    /// Sui full-node JSON-RPC endpoint.
    pub sui_rpc_url: String,
    /// Base64 Ed25519 secret key of the operator account (32 or 33 bytes).
    pub sui_private_key: Option<String>,
    /// Published package holding the `bounty`, `donation` and `nft` modules.
    pub package_id: Option<String>,
    /// Only this address may run NFT airdrops.
    pub admin_address: Option<String>,
    /// Gas budget per transaction (MIST).
    pub gas_budget: u64,
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<String>,
    pub twitch_redirect_uri: Option<String>,
    pub frontend_url: String,
    /// How long a completed idempotency key is replayed (seconds).
    pub idempotency_ttl: u64,
}

fn opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> Self {
        let gas_budget = env::var("SUI_GAS_BUDGET")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100_000_000); // 0.1 SUI

        let idempotency_ttl = env::var("IDEMPOTENCY_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(24 * 3_600);

        Settings {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            sui_rpc_url: env::var("SUI_RPC_URL")
                .unwrap_or_else(|_| "https://fullnode.testnet.sui.io:443".into()),
            sui_private_key: opt("SUI_PRIVATE_KEY"),
            package_id: opt("PACKAGE_ID"),
            admin_address: opt("ADMIN_ADDRESS"),
            gas_budget,
            twitch_client_id: opt("TWITCH_CLIENT_ID"),
            twitch_client_secret: opt("TWITCH_CLIENT_SECRET"),
            twitch_redirect_uri: opt("TWITCH_REDIRECT_URI"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            idempotency_ttl,
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
