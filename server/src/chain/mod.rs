//! Sui client adapter: one place for the node endpoint, the signing identity,
//! coin selection and SUI ⇄ MIST conversion.

pub mod keypair;
pub mod rpc;

use std::sync::Arc;

pub use keypair::SuiKeypair;
pub use rpc::{
    Coin, EventFilter, EventId, JsonRpcClient, Owner, Page, SuiClient, SuiEvent, SuiObjectData,
    TransactionResponse,
};
pub use sui_sdk_types::{Address, Digest, Identifier, Transaction};
pub use sui_transaction_builder::{Function, ObjectInput, TransactionBuilder};

use crate::config::Settings;
use crate::error::{Error, Result};

/// Object ids share the address encoding.
pub type ObjectId = Address;

pub const MIST_PER_SUI: u64 = 1_000_000_000;
const SUI_DECIMALS: usize = 9;

/// Protocol cap on gas payment objects.
pub const MAX_GAS_OBJECTS: usize = 256;

/// Coins fetched per `suix_getCoins` call.
pub const COIN_PAGE_SIZE: usize = 50;

/// `0x`-prefixed hex of up to 64 digits; short forms such as `0x2` are
/// left-padded.
pub fn parse_address(s: &str) -> Result<Address> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| Error::Validation(format!("adresse invalide (préfixe 0x manquant): {s}")))?;
    Address::from_hex(format!("0x{digits}"))
        .map_err(|e| Error::Validation(format!("adresse invalide: {s} ({e})")))
}

/// `package::module::function` as a move call target.
pub fn move_function(package: ObjectId, module: &str, function: &str) -> Result<Function> {
    let ident = |name: &str| {
        Identifier::new(name).map_err(|e| Error::Internal(format!("identifiant Move invalide: {e}")))
    };
    Ok(Function::new(package, ident(module)?, ident(function)?))
}

/// Largest coins first, only as many as needed to cover `needed`. `None`
/// when even the largest [`MAX_GAS_OBJECTS`] coins fall short.
pub fn select_gas_coins(mut coins: Vec<Coin>, needed: u64) -> Option<Vec<Coin>> {
    coins.sort_by(|a, b| b.balance.cmp(&a.balance));
    let mut covered = 0u64;
    let mut selected = Vec::new();
    for coin in coins.into_iter().take(MAX_GAS_OBJECTS) {
        if covered >= needed && !selected.is_empty() {
            break;
        }
        covered = covered.saturating_add(coin.balance);
        selected.push(coin);
    }
    (covered >= needed && !selected.is_empty()).then_some(selected)
}

/// SUI → MIST. Digits past the ninth decimal are truncated, not rejected.
pub fn parse_sui_amount(sui: f64) -> Result<u64> {
    if !sui.is_finite() || sui < 0.0 {
        return Err(Error::Validation(format!("montant SUI invalide: {sui}")));
    }
    if sui == 0.0 {
        return Ok(0);
    }

    // `Display` for f64 is the shortest round-trip form and never uses an
    // exponent, so truncation happens on the decimal digits the caller sent.
    let repr = sui.to_string();
    let (whole, frac) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let frac: String = frac
        .chars()
        .chain(std::iter::repeat('0'))
        .take(SUI_DECIMALS)
        .collect();

    let too_large = || Error::Validation(format!("montant SUI trop grand: {sui}"));
    let whole: u64 = whole.parse().map_err(|_| too_large())?;
    let frac: u64 = frac.parse().map_err(|_| too_large())?;
    whole
        .checked_mul(MIST_PER_SUI)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(too_large)
}

/// MIST → SUI.
pub fn format_sui_amount(mist: u64) -> f64 {
    mist as f64 / MIST_PER_SUI as f64
}

/// Node failures mentioning balances are reported as missing funds.
fn classify_rejection(reason: String) -> Error {
    if reason.to_ascii_lowercase().contains("insufficient") {
        Error::InsufficientFunds(reason)
    } else {
        Error::ChainRejected(reason)
    }
}

pub struct SuiAdapter {
    client: Arc<dyn SuiClient>,
    private_key: Option<String>,
    package_id: Option<String>,
    admin_address: Option<String>,
    gas_budget: u64,
}

impl SuiAdapter {
    pub fn new(client: Arc<dyn SuiClient>, settings: &Settings) -> Self {
        Self {
            client,
            private_key: settings.sui_private_key.clone(),
            package_id: settings.package_id.clone(),
            admin_address: settings.admin_address.clone(),
            gas_budget: settings.gas_budget,
        }
    }

    pub fn client(&self) -> &dyn SuiClient {
        self.client.as_ref()
    }

    pub fn gas_budget(&self) -> u64 {
        self.gas_budget
    }

    /// Operator keypair from `SUI_PRIVATE_KEY`.
    pub fn keypair(&self) -> Result<SuiKeypair> {
        let encoded = self
            .private_key
            .as_deref()
            .ok_or_else(|| Error::Configuration("SUI_PRIVATE_KEY non configurée".into()))?;
        SuiKeypair::from_base64(encoded)
    }

    pub fn package_id(&self) -> Result<ObjectId> {
        let raw = self
            .package_id
            .as_deref()
            .ok_or_else(|| Error::Configuration("PACKAGE_ID non configuré".into()))?;
        parse_address(raw).map_err(|e| Error::Configuration(format!("PACKAGE_ID invalide: {e}")))
    }

    pub fn admin_address(&self) -> Result<Address> {
        let raw = self
            .admin_address
            .as_deref()
            .ok_or_else(|| Error::Configuration("ADMIN_ADDRESS non configurée".into()))?;
        parse_address(raw)
            .map_err(|e| Error::Configuration(format!("ADMIN_ADDRESS invalide: {e}")))
    }

    /// SUI coins of `owner` covering `needed` MIST, largest first. Pages
    /// through the wallet only until the amount is reached; an empty wallet
    /// or a short balance is an error, no waiting.
    pub async fn get_sui_coins(&self, owner: Address, needed: u64) -> Result<Vec<Coin>> {
        let mut coins: Vec<Coin> = Vec::new();
        let mut total = 0u64;
        let mut cursor = None;
        loop {
            let page = self
                .client
                .get_coins(owner, cursor.take(), COIN_PAGE_SIZE)
                .await?;
            for coin in page.data {
                total = total.saturating_add(coin.balance);
                coins.push(coin);
            }
            if total >= needed {
                break;
            }
            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        if coins.is_empty() {
            return Err(Error::InsufficientFunds(format!(
                "aucun coin SUI disponible pour {owner}"
            )));
        }
        if total < needed {
            return Err(Error::InsufficientFunds(format!(
                "solde insuffisant: {} SUI disponibles, {} SUI requis (gas compris)",
                format_sui_amount(total),
                format_sui_amount(needed)
            )));
        }
        select_gas_coins(coins, needed).ok_or_else(|| {
            Error::InsufficientFunds(format!(
                "{} coins les plus gros insuffisants pour {} SUI, fusionner les coins",
                MAX_GAS_OBJECTS,
                format_sui_amount(needed)
            ))
        })
    }

    /// Resolve an object id into a call input, shared or owned.
    pub async fn object_input(&self, id: ObjectId, mutable: bool) -> Result<ObjectInput> {
        let obj = self.client.get_object(id).await?;
        Ok(obj.object_input(mutable))
    }

    /// Pay gas from the signer's coins, sign as `signer`, execute and wait
    /// for effects. `reserved` is the MIST the transaction itself moves out
    /// of the gas coin.
    pub async fn sign_and_execute(
        &self,
        signer: &SuiKeypair,
        mut tx: TransactionBuilder,
        reserved: u64,
    ) -> Result<TransactionResponse> {
        let needed = reserved.saturating_add(self.gas_budget);
        let payment = self.get_sui_coins(signer.address(), needed).await?;
        let price = self.client.reference_gas_price().await?;

        tx.set_sender(signer.address());
        tx.add_gas_objects(payment.iter().map(Coin::gas_input));
        tx.set_gas_budget(self.gas_budget);
        tx.set_gas_price(price);
        let tx = tx
            .try_build()
            .map_err(|e| Error::Internal(format!("transaction incomplète: {e}")))?;

        let tx_bytes = bcs::to_bytes(&tx)?;
        let signature = signer.sign_transaction(&tx)?;

        let resp = self
            .client
            .execute_transaction(&tx_bytes, vec![signature.to_base64()])
            .await
            .map_err(|e| match e {
                Error::ChainRejected(reason) => classify_rejection(reason),
                other => other,
            })?;
        resp.execution_status().map_err(classify_rejection)?;

        log::info!(
            "transaction {} exécutée par {} ({} coins de gas)",
            resp.digest,
            signer.address(),
            payment.len()
        );
        Ok(resp)
    }
}

/// Outcome of [`verify_sui_config`].
#[derive(Debug, Default)]
pub struct ConfigReport {
    pub chain_id: Option<String>,
    pub signer: Option<Address>,
    pub balance: Option<u64>,
    pub package_id: Option<ObjectId>,
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn is_healthy(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Best-effort startup check. Never fails; problems are logged and reported,
/// real calls surface them again later.
pub async fn verify_sui_config(adapter: &SuiAdapter) -> ConfigReport {
    let mut report = ConfigReport::default();

    match adapter.client().chain_identifier().await {
        Ok(id) => {
            log::info!("Sui joignable (chain id {id})");
            report.chain_id = Some(id);
        }
        Err(e) => report.warnings.push(format!("nœud Sui injoignable: {e}")),
    }

    match adapter.keypair() {
        Ok(kp) => {
            let address = kp.address();
            log::info!("adresse du signataire: {address}");
            report.signer = Some(address);
            match adapter.client().get_balance(address).await {
                Ok(0) => {
                    report.balance = Some(0);
                    report.warnings.push(format!("solde nul pour {address}"));
                }
                Ok(balance) => {
                    log::info!("solde: {} SUI", format_sui_amount(balance));
                    report.balance = Some(balance);
                }
                Err(e) => report.warnings.push(format!("lecture du solde impossible: {e}")),
            }
        }
        Err(e) => report.warnings.push(e.to_string()),
    }

    match adapter.package_id() {
        Ok(id) => report.package_id = Some(id),
        Err(e) => report.warnings.push(e.to_string()),
    }

    for w in &report.warnings {
        log::warn!("config Sui: {w}");
    }
    report
}
