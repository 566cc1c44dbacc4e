//! NFT reward airdrops to engaged viewers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    cursor_string, event_time, json_u64, module_events, object_cursor_string, PageRequest,
    BATCH_AIRDROP, MAX_PAGE_SIZE, NFT_MODULE, REWARD_NFT_STRUCT,
};
use crate::chain::{
    move_function, Address, EventId, ObjectId, SuiAdapter, SuiKeypair, SuiObjectData,
    TransactionBuilder,
};
use crate::error::{Error, Result};
use crate::validate;

const HISTORY_PAGE: usize = 50;
const NFT_PAGE: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirdropRecipient {
    pub address: String,
    pub score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchAirdropRequest {
    pub recipients: Vec<AirdropRecipient>,
}

/// Batch size, then each recipient's address and score.
fn parse_recipients(recipients: &[AirdropRecipient]) -> Result<(Vec<Address>, Vec<u64>)> {
    validate::airdrop_batch_len(recipients.len())?;
    let parsed = recipients
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let address = validate::address(&format!("recipients[{i}].address"), &r.address)?;
            Ok((address, validate::score(r.score)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parsed.into_iter().unzip())
}

impl BatchAirdropRequest {
    pub fn validate(&self) -> Result<()> {
        parse_recipients(&self.recipients).map(drop)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropResult {
    pub digest: String,
    pub recipient_count: usize,
    pub recipients: Vec<AirdropRecipient>,
}

/// Mint one reward NFT per recipient through `nft::batch_airdrop`.
///
/// Only the configured admin may sign; the check is a plain address
/// comparison against `ADMIN_ADDRESS`.
pub async fn batch_airdrop(
    adapter: &SuiAdapter,
    signer: &SuiKeypair,
    recipients: Vec<AirdropRecipient>,
) -> Result<AirdropResult> {
    validate::airdrop_batch_len(recipients.len())?;

    let admin = adapter.admin_address()?;
    if signer.address() != admin {
        return Err(Error::Unauthorized(format!(
            "Non autorisé: {} n'est pas l'adresse admin",
            signer.address()
        )));
    }

    let (addresses, scores) = parse_recipients(&recipients)?;

    let submit = async {
        let package = adapter.package_id()?;

        let mut tx = TransactionBuilder::new();
        let args = vec![tx.pure(&addresses), tx.pure(&scores)];
        tx.move_call(move_function(package, NFT_MODULE, BATCH_AIRDROP)?, args);

        adapter.sign_and_execute(signer, tx, 0).await
    };
    let resp = submit
        .await
        .map_err(|e| e.context("Échec airdrop NFT"))?;

    log::info!("airdrop de {} NFT: {}", recipients.len(), resp.digest);
    Ok(AirdropResult {
        digest: resp.digest,
        recipient_count: recipients.len(),
        recipients,
    })
}

pub async fn airdrop_single(
    adapter: &SuiAdapter,
    signer: &SuiKeypair,
    recipient: AirdropRecipient,
) -> Result<AirdropResult> {
    batch_airdrop(adapter, signer, vec![recipient]).await
}

//////////////////////////////////////////////////
// Reads
//////////////////////////////////////////////////

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropRecord {
    pub tx_digest: String,
    pub event_type: String,
    pub recipient: Option<String>,
    pub score: Option<u64>,
    pub nft_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropHistory {
    pub total: usize,
    pub airdrops: Vec<AirdropRecord>,
    pub next_cursor: Option<String>,
}

pub async fn get_airdrop_history(
    adapter: &SuiAdapter,
    page: &PageRequest<EventId>,
) -> Result<AirdropHistory> {
    let fetched = module_events(adapter, NFT_MODULE, page, HISTORY_PAGE).await?;
    let next_cursor = cursor_string(fetched.next_cursor.as_ref());

    let airdrops: Vec<AirdropRecord> = fetched
        .data
        .iter()
        .map(|ev| {
            let field = |name: &str| ev.parsed_json.get(name);
            AirdropRecord {
                tx_digest: ev.id.tx_digest.clone(),
                event_type: ev.type_.clone(),
                recipient: field("recipient").and_then(Value::as_str).map(str::to_owned),
                score: field("score").and_then(json_u64),
                nft_id: field("nft_id").and_then(Value::as_str).map(str::to_owned),
                timestamp: event_time(ev.timestamp_ms),
            }
        })
        .collect();

    Ok(AirdropHistory {
        total: airdrops.len(),
        airdrops,
        next_cursor,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardNft {
    pub object_id: ObjectId,
    pub name: Option<String>,
    pub score: Option<u64>,
    pub image_url: Option<String>,
}

impl RewardNft {
    /// Reads Move fields first, then the object's Display metadata.
    fn from_object(obj: &SuiObjectData) -> Self {
        let fields = obj.content.as_ref().and_then(|c| c.get("fields"));
        let display = obj.display.as_ref().and_then(|d| d.get("data"));
        let text = |key: &str| -> Option<String> {
            fields
                .and_then(|f| f.get(key))
                .or_else(|| display.and_then(|d| d.get(key)))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        RewardNft {
            object_id: obj.object_id,
            name: text("name"),
            score: fields.and_then(|f| f.get("score")).and_then(json_u64),
            image_url: text("image_url").or_else(|| text("url")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientNfts {
    pub count: usize,
    pub nfts: Vec<RewardNft>,
    pub next_cursor: Option<String>,
}

/// Reward NFTs currently owned by `owner`.
pub async fn get_recipient_nfts(
    adapter: &SuiAdapter,
    owner: &str,
    page: &PageRequest<ObjectId>,
) -> Result<RecipientNfts> {
    let owner = validate::address("address", owner)?;
    let package = adapter.package_id()?;
    let struct_type = format!("{package}::{NFT_MODULE}::{REWARD_NFT_STRUCT}");
    let limit = validate::page_limit(page.limit, NFT_PAGE, MAX_PAGE_SIZE);

    let fetched = adapter
        .client()
        .get_owned_objects(owner, &struct_type, page.cursor, limit)
        .await?;

    let nfts: Vec<RewardNft> = fetched.data.iter().map(RewardNft::from_object).collect();
    Ok(RecipientNfts {
        count: nfts.len(),
        nfts,
        next_cursor: object_cursor_string(fetched.next_cursor.as_ref()),
    })
}
