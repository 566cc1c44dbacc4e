//! Transaction builders for the bounty, donation and NFT-airdrop modules,
//! plus the read-only event helpers behind the history views.
//!
//! Builders validate their input first, then run the chain phase (coin
//! selection, move call, sign, execute). Chain-phase failures keep their
//! error kind and get an operation prefix.

pub mod airdrop;
pub mod bounty;
pub mod donation;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::chain::{parse_address, EventFilter, EventId, ObjectId, Page, SuiAdapter, SuiEvent};
use crate::error::Result;
use crate::validate;

pub const BOUNTY_MODULE: &str = "bounty";
pub const DONATION_MODULE: &str = "donation";
pub const NFT_MODULE: &str = "nft";

pub const CREATE_BOUNTY: &str = "create_bounty";
pub const ACCEPT_BOUNTY: &str = "accept_bounty";
pub const COMPLETE_BOUNTY: &str = "complete_bounty";
pub const SPLIT_DONATION: &str = "split_donation";
pub const BATCH_AIRDROP: &str = "batch_airdrop";
pub const REWARD_NFT_STRUCT: &str = "RewardNFT";

/// Largest page a caller may ask for.
pub const MAX_PAGE_SIZE: usize = 200;

/// Cursor + size for read helpers. `limit: None` means the helper's default.
#[derive(Debug, Clone)]
pub struct PageRequest<C> {
    pub cursor: Option<C>,
    pub limit: Option<usize>,
}

impl<C> Default for PageRequest<C> {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: None,
        }
    }
}

/// Newest-first events emitted by one module of the configured package.
pub(crate) async fn module_events(
    adapter: &SuiAdapter,
    module: &str,
    page: &PageRequest<EventId>,
    default_limit: usize,
) -> Result<Page<SuiEvent, EventId>> {
    let package = adapter.package_id()?;
    let limit = validate::page_limit(page.limit, default_limit, MAX_PAGE_SIZE);
    adapter
        .client()
        .query_events(
            EventFilter::MoveModule {
                package,
                module: module.to_owned(),
            },
            page.cursor.clone(),
            limit,
            true,
        )
        .await
}

/// Move `u64`s arrive as JSON strings, smaller ints as numbers.
pub fn json_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Address equality tolerant to case and short forms.
pub fn same_address(a: &str, b: &str) -> bool {
    match (parse_address(a), parse_address(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => a.eq_ignore_ascii_case(b),
    }
}

pub fn event_time(ms: Option<u64>) -> Option<DateTime<Utc>> {
    ms.and_then(|ms| i64::try_from(ms).ok())
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

pub(crate) fn cursor_string(cursor: Option<&EventId>) -> Option<String> {
    cursor.map(ToString::to_string)
}

pub(crate) fn object_cursor_string(cursor: Option<&ObjectId>) -> Option<String> {
    cursor.map(ToString::to_string)
}
