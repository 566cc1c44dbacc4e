//! Full-node access: the `SuiClient` seam and its JSON-RPC implementation.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use sui_sdk_types::{Address, Digest};
use sui_transaction_builder::ObjectInput;

use super::ObjectId;
use crate::error::{Error, Result};

pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

//////////////////////////////////////////////////
// RPC payloads
//////////////////////////////////////////////////

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: ObjectId,
    #[serde_as(as = "DisplayFromStr")]
    pub version: u64,
    pub digest: Digest,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: u64,
}

impl Coin {
    /// Gas payment entry for this coin.
    pub fn gas_input(&self) -> ObjectInput {
        ObjectInput::owned(self.coin_object_id, self.version, self.digest)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T, C> {
    pub data: Vec<T>,
    pub next_cursor: Option<C>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Position of an event; also the `suix_queryEvents` cursor.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: String,
    #[serde_as(as = "DisplayFromStr")]
    pub event_seq: u64,
}

/// Cursor form used in HTTP query strings: `<txDigest>:<eventSeq>`.
impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_digest, self.event_seq)
    }
}

impl FromStr for EventId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (digest, seq) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::Validation(format!("curseur invalide: {s}")))?;
        let event_seq = seq
            .parse()
            .map_err(|_| Error::Validation(format!("curseur invalide: {s}")))?;
        if digest.is_empty() {
            return Err(Error::Validation(format!("curseur invalide: {s}")));
        }
        Ok(EventId {
            tx_digest: digest.to_owned(),
            event_seq,
        })
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiEvent {
    pub id: EventId,
    pub package_id: ObjectId,
    pub transaction_module: String,
    pub sender: Address,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub parsed_json: Value,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub enum EventFilter {
    MoveModule { package: ObjectId, module: String },
    MoveEventType(String),
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    AddressOwner(Address),
    ObjectOwner(Address),
    Shared {
        #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
        initial_shared_version: u64,
    },
    Immutable,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiObjectData {
    pub object_id: ObjectId,
    #[serde_as(as = "DisplayFromStr")]
    pub version: u64,
    pub digest: Digest,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub display: Option<Value>,
}

impl SuiObjectData {
    /// Call input for this object. Shared objects go in at their initial
    /// shared version, everything else by reference.
    pub fn object_input(&self, mutable: bool) -> ObjectInput {
        match self.owner {
            Some(Owner::Shared {
                initial_shared_version,
            }) => ObjectInput::shared(self.object_id, initial_shared_version, mutable),
            Some(Owner::Immutable) => {
                ObjectInput::immutable(self.object_id, self.version, self.digest)
            }
            _ => ObjectInput::owned(self.object_id, self.version, self.digest),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SuiObjectResponse {
    #[serde(default)]
    data: Option<SuiObjectData>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub digest: String,
    #[serde(default)]
    pub effects: Option<Value>,
    #[serde(default)]
    pub events: Option<Vec<Value>>,
}

impl TransactionResponse {
    /// `Err(reason)` when the effects report a failed execution.
    pub fn execution_status(&self) -> Result<(), String> {
        let status = self
            .effects
            .as_ref()
            .and_then(|e| e.get("status"))
            .ok_or_else(|| "effets absents de la réponse".to_owned())?;
        match status.get("status").and_then(Value::as_str) {
            Some("success") => Ok(()),
            _ => Err(status
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("exécution échouée")
                .to_owned()),
        }
    }
}

//////////////////////////////////////////////////
// Client seam
//////////////////////////////////////////////////

#[async_trait]
pub trait SuiClient: Send + Sync {
    async fn chain_identifier(&self) -> Result<String>;

    /// One page of the SUI coin objects owned by `owner`.
    async fn get_coins(
        &self,
        owner: Address,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<Page<Coin, String>>;

    /// Total SUI balance of `owner`, in MIST.
    async fn get_balance(&self, owner: Address) -> Result<u64>;

    async fn reference_gas_price(&self) -> Result<u64>;

    async fn get_object(&self, id: ObjectId) -> Result<SuiObjectData>;

    /// Submit signed BCS `TransactionData`; returns once executed.
    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: Vec<String>,
    ) -> Result<TransactionResponse>;

    /// Newest-first when `descending`.
    async fn query_events(
        &self,
        filter: EventFilter,
        cursor: Option<EventId>,
        limit: usize,
        descending: bool,
    ) -> Result<Page<SuiEvent, EventId>>;

    async fn get_owned_objects(
        &self,
        owner: Address,
        struct_type: &str,
        cursor: Option<ObjectId>,
        limit: usize,
    ) -> Result<Page<SuiObjectData, ObjectId>>;
}

//////////////////////////////////////////////////
// JSON-RPC implementation
//////////////////////////////////////////////////

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Balance {
    #[serde_as(as = "DisplayFromStr")]
    total_balance: u64,
}

/// reqwest-backed JSON-RPC 2.0 client.
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("{method}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Network(format!("{method}: HTTP {status}")));
        }

        let envelope: RpcResponse<T> = resp
            .json()
            .await
            .map_err(|e| Error::Network(format!("{method}: réponse illisible: {e}")))?;

        if let Some(err) = envelope.error {
            return Err(Error::ChainRejected(format!(
                "{method}: {} (code {})",
                err.message, err.code
            )));
        }
        envelope
            .result
            .ok_or_else(|| Error::ChainRejected(format!("{method}: résultat vide")))
    }
}

#[async_trait]
impl SuiClient for JsonRpcClient {
    async fn chain_identifier(&self) -> Result<String> {
        self.call("sui_getChainIdentifier", json!([])).await
    }

    async fn get_coins(
        &self,
        owner: Address,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<Page<Coin, String>> {
        self.call(
            "suix_getCoins",
            json!([owner, SUI_COIN_TYPE, cursor, limit]),
        )
        .await
    }

    async fn get_balance(&self, owner: Address) -> Result<u64> {
        let balance: Balance = self
            .call("suix_getBalance", json!([owner, SUI_COIN_TYPE]))
            .await?;
        Ok(balance.total_balance)
    }

    async fn reference_gas_price(&self) -> Result<u64> {
        // BigInt<u64> comes back as a decimal string.
        let price: Value = self.call("suix_getReferenceGasPrice", json!([])).await?;
        match &price {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
        .ok_or_else(|| Error::ChainRejected(format!("prix du gas invalide: {price}")))
    }

    async fn get_object(&self, id: ObjectId) -> Result<SuiObjectData> {
        let resp: SuiObjectResponse = self
            .call(
                "sui_getObject",
                json!([id, { "showOwner": true, "showType": true }]),
            )
            .await?;
        match (resp.data, resp.error) {
            (Some(data), _) => Ok(data),
            (None, err) => Err(Error::ChainRejected(format!(
                "objet {id} introuvable: {}",
                err.unwrap_or(Value::Null)
            ))),
        }
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: Vec<String>,
    ) -> Result<TransactionResponse> {
        self.call(
            "sui_executeTransactionBlock",
            json!([
                B64.encode(tx_bytes),
                signatures,
                { "showEffects": true, "showEvents": true },
                "WaitForLocalExecution"
            ]),
        )
        .await
    }

    async fn query_events(
        &self,
        filter: EventFilter,
        cursor: Option<EventId>,
        limit: usize,
        descending: bool,
    ) -> Result<Page<SuiEvent, EventId>> {
        self.call(
            "suix_queryEvents",
            json!([filter, cursor, limit, descending]),
        )
        .await
    }

    async fn get_owned_objects(
        &self,
        owner: Address,
        struct_type: &str,
        cursor: Option<ObjectId>,
        limit: usize,
    ) -> Result<Page<SuiObjectData, ObjectId>> {
        let page: Page<SuiObjectResponse, ObjectId> = self
            .call(
                "suix_getOwnedObjects",
                json!([
                    owner,
                    {
                        "filter": { "StructType": struct_type },
                        "options": { "showType": true, "showContent": true, "showDisplay": true }
                    },
                    cursor,
                    limit
                ]),
            )
            .await?;
        Ok(Page {
            data: page.data.into_iter().filter_map(|o| o.data).collect(),
            next_cursor: page.next_cursor,
            has_next_page: page.has_next_page,
        })
    }
}
