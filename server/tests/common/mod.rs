// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sui_sdk_types::{ProgrammableTransaction, TransactionKind, UserSignature};

use purple_sui_server::chain::rpc::SUI_COIN_TYPE;
use purple_sui_server::chain::{
    parse_address, Address, Coin, Digest, EventFilter, EventId, ObjectId, Owner, Page, SuiAdapter,
    SuiClient, SuiEvent, SuiKeypair, SuiObjectData, Transaction, TransactionResponse,
};
use purple_sui_server::config::Settings;
use purple_sui_server::error::{Error, Result};

pub const SECRET: [u8; 32] = [7; 32];
pub const PACKAGE: &str = "0x2a";
pub const DEV: &str = "0x00000000000000000000000000000000000000000000000000000000000000d1";
pub const STREAMER: &str = "0x00000000000000000000000000000000000000000000000000000000000000a5";

pub fn keypair() -> SuiKeypair {
    SuiKeypair::from_secret_bytes(&SECRET)
}

pub fn package() -> ObjectId {
    parse_address(PACKAGE).unwrap()
}

pub fn addr(s: &str) -> Address {
    parse_address(s).unwrap()
}

/// Fully configured settings; the test key is also the admin.
pub fn settings() -> Settings {
    Settings {
        server_addr: "127.0.0.1:0".into(),
        sui_rpc_url: "http://127.0.0.1:1".into(),
        sui_private_key: Some(B64.encode(SECRET)),
        package_id: Some(PACKAGE.into()),
        admin_address: Some(keypair().address().to_string()),
        gas_budget: 100_000_000,
        twitch_client_id: None,
        twitch_client_secret: None,
        twitch_redirect_uri: None,
        frontend_url: "http://localhost:5173".into(),
        idempotency_ttl: 3_600,
    }
}

pub fn coin(seed: u8, balance: u64) -> Coin {
    Coin {
        coin_type: SUI_COIN_TYPE.into(),
        coin_object_id: Address::new([seed; 32]),
        version: 3,
        digest: Digest::new([seed; 32]),
        balance,
    }
}

pub fn event(module: &str, seq: u64, parsed_json: Value) -> SuiEvent {
    SuiEvent {
        id: EventId {
            tx_digest: format!("tx{seq}"),
            event_seq: seq,
        },
        package_id: package(),
        transaction_module: module.into(),
        sender: keypair().address(),
        type_: format!("{PACKAGE}::{module}::Event"),
        parsed_json,
        timestamp_ms: Some(1_700_000_000_000),
    }
}

pub fn shared_object(id: ObjectId, initial_shared_version: u64) -> SuiObjectData {
    SuiObjectData {
        object_id: id,
        version: initial_shared_version + 1,
        digest: Digest::new([1; 32]),
        type_: None,
        owner: Some(Owner::Shared {
            initial_shared_version,
        }),
        content: None,
        display: None,
    }
}

/// In-memory node recording what the server asked for.
pub struct MockSuiClient {
    pub coins: Mutex<Vec<Coin>>,
    pub events: Mutex<Vec<SuiEvent>>,
    pub objects: Mutex<HashMap<ObjectId, SuiObjectData>>,
    pub owned: Mutex<Vec<SuiObjectData>>,
    pub effects: Mutex<Value>,
    pub fail_reads: AtomicBool,
    /// `(owner, cursor)` of every `get_coins` page request.
    pub coin_requests: Mutex<Vec<(Address, Option<String>)>>,
    pub event_queries: Mutex<Vec<(EventFilter, Option<EventId>, usize)>>,
    pub executed: Mutex<Vec<(Vec<u8>, Vec<String>)>>,
}

impl Default for MockSuiClient {
    fn default() -> Self {
        Self {
            coins: Mutex::new(vec![coin(1, 50_000_000_000)]),
            events: Mutex::new(vec![]),
            objects: Mutex::new(HashMap::new()),
            owned: Mutex::new(vec![]),
            effects: Mutex::new(json!({ "status": { "status": "success" } })),
            fail_reads: AtomicBool::new(false),
            coin_requests: Mutex::new(vec![]),
            event_queries: Mutex::new(vec![]),
            executed: Mutex::new(vec![]),
        }
    }
}

impl MockSuiClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_reads() -> Arc<Self> {
        let mock = Self::default();
        mock.fail_reads.store(true, Ordering::SeqCst);
        Arc::new(mock)
    }

    pub fn executed_count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    pub fn with_coins(coins: Vec<Coin>) -> Arc<Self> {
        let mock = Self::default();
        *mock.coins.lock().unwrap() = coins;
        Arc::new(mock)
    }

    /// Decode the last submitted transaction.
    pub fn last_transaction(&self) -> Transaction {
        let executed = self.executed.lock().unwrap();
        let (bytes, _) = executed.last().expect("no transaction executed");
        bcs::from_bytes(bytes).expect("valid TransactionData")
    }

    pub fn last_programmable(&self) -> ProgrammableTransaction {
        match self.last_transaction().kind {
            TransactionKind::ProgrammableTransaction(pt) => pt,
            other => panic!("unexpected transaction kind {other:?}"),
        }
    }

    pub fn last_signature(&self) -> UserSignature {
        let executed = self.executed.lock().unwrap();
        let (_, sigs) = executed.last().expect("no transaction executed");
        UserSignature::from_base64(&sigs[0]).expect("valid signature")
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Network("node unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SuiClient for MockSuiClient {
    async fn chain_identifier(&self) -> Result<String> {
        self.check_reads()?;
        Ok("4c78adac".into())
    }

    /// Pages are slices of `coins`; the cursor is the next index.
    async fn get_coins(
        &self,
        owner: Address,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<Page<Coin, String>> {
        self.coin_requests
            .lock()
            .unwrap()
            .push((owner, cursor.clone()));
        let coins = self.coins.lock().unwrap();
        let start: usize = cursor.map_or(0, |c| c.parse().unwrap());
        let end = (start + limit).min(coins.len());
        let has_next_page = end < coins.len();
        Ok(Page {
            data: coins[start.min(end)..end].to_vec(),
            next_cursor: has_next_page.then(|| end.to_string()),
            has_next_page,
        })
    }

    async fn get_balance(&self, _owner: Address) -> Result<u64> {
        self.check_reads()?;
        Ok(self.coins.lock().unwrap().iter().map(|c| c.balance).sum())
    }

    async fn reference_gas_price(&self) -> Result<u64> {
        Ok(750)
    }

    async fn get_object(&self, id: ObjectId) -> Result<SuiObjectData> {
        self.objects
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::ChainRejected(format!("object {id} not found")))
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: Vec<String>,
    ) -> Result<TransactionResponse> {
        let mut executed = self.executed.lock().unwrap();
        executed.push((tx_bytes.to_vec(), signatures));
        Ok(TransactionResponse {
            digest: format!("digest{}", executed.len()),
            effects: Some(self.effects.lock().unwrap().clone()),
            events: None,
        })
    }

    async fn query_events(
        &self,
        filter: EventFilter,
        cursor: Option<EventId>,
        limit: usize,
        _descending: bool,
    ) -> Result<Page<SuiEvent, EventId>> {
        self.check_reads()?;
        self.event_queries
            .lock()
            .unwrap()
            .push((filter.clone(), cursor, limit));
        let module = match &filter {
            EventFilter::MoveModule { module, .. } => Some(module.clone()),
            EventFilter::MoveEventType(_) => None,
        };
        let data: Vec<SuiEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| module.as_deref().map_or(true, |m| e.transaction_module == m))
            .take(limit)
            .cloned()
            .collect();
        let next_cursor = data.last().map(|e| e.id.clone());
        Ok(Page {
            data,
            next_cursor,
            has_next_page: false,
        })
    }

    async fn get_owned_objects(
        &self,
        _owner: Address,
        _struct_type: &str,
        _cursor: Option<ObjectId>,
        limit: usize,
    ) -> Result<Page<SuiObjectData, ObjectId>> {
        self.check_reads()?;
        let data: Vec<SuiObjectData> = self.owned.lock().unwrap().iter().take(limit).cloned().collect();
        Ok(Page {
            next_cursor: data.last().map(|o| o.object_id),
            data,
            has_next_page: false,
        })
    }
}

pub fn adapter(mock: Arc<MockSuiClient>) -> SuiAdapter {
    SuiAdapter::new(mock, &settings())
}
