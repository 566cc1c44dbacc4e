//! Viewer donations split between a streamer and a game developer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::{
    cursor_string, event_time, json_u64, module_events, same_address, PageRequest,
    DONATION_MODULE, SPLIT_DONATION,
};
use crate::chain::{
    format_sui_amount, move_function, parse_sui_amount, Address, EventId, SuiAdapter, SuiEvent,
    SuiKeypair, TransactionBuilder,
};
use crate::error::{Error, Result};
use crate::validate::{self, MAX_BASIS_POINTS};

const HISTORY_PAGE: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationSplitRequest {
    pub streamer_address: String,
    pub dev_address: String,
    /// Developer share in basis points.
    pub split_ratio: i64,
    pub donation_amount_sui: f64,
    #[serde(default)]
    pub donor_address: Option<String>,
}

struct NewDonation {
    split_ratio: u64,
    streamer: Address,
    dev: Address,
    amount: u64,
    donor: Option<Address>,
}

impl DonationSplitRequest {
    fn parse(&self) -> Result<NewDonation> {
        let split_ratio = validate::split_ratio(self.split_ratio)?;
        let streamer = validate::address("streamerAddress", &self.streamer_address)?;
        let dev = validate::address("devAddress", &self.dev_address)?;
        validate::positive_amount("donationAmountSui", self.donation_amount_sui)?;
        let amount = parse_sui_amount(self.donation_amount_sui)?;
        if amount == 0 {
            return Err(Error::Validation("donationAmountSui inférieur à 1 MIST".into()));
        }
        let donor = match self.donor_address.as_deref() {
            Some(d) if !d.trim().is_empty() => Some(validate::address("donorAddress", d)?),
            _ => None,
        };
        Ok(NewDonation {
            split_ratio,
            streamer,
            dev,
            amount,
            donor,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.parse().map(drop)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationProcessed {
    pub digest: String,
    pub total_amount: f64,
    pub dev_amount: f64,
    pub streamer_amount: f64,
    pub split_ratio: u64,
    pub donor: Address,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    pub donor: String,
    /// MIST.
    pub amount: u64,
    pub split_ratio: u64,
    pub timestamp: Option<DateTime<Utc>>,
    pub tx_digest: String,
}

impl DonationRecord {
    fn from_event(ev: &SuiEvent) -> Self {
        let field = |name: &str| ev.parsed_json.get(name);
        DonationRecord {
            donor: field("donor")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| ev.sender.to_string()),
            amount: field("amount").and_then(json_u64).unwrap_or(0),
            split_ratio: field("split_ratio").and_then(json_u64).unwrap_or(0),
            timestamp: event_time(ev.timestamp_ms),
            tx_digest: ev.id.tx_digest.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationHistory {
    pub total: usize,
    pub donations: Vec<DonationRecord>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationStats {
    pub total_donations: usize,
    /// SUI.
    pub total_amount: f64,
    pub unique_donors: usize,
}

impl DonationStats {
    pub fn from_history(history: &DonationHistory) -> Self {
        let total_mist = history
            .donations
            .iter()
            .fold(0u64, |acc, d| acc.saturating_add(d.amount));
        let donors: HashSet<String> = history
            .donations
            .iter()
            .map(|d| d.donor.to_ascii_lowercase())
            .collect();
        DonationStats {
            total_donations: history.donations.len(),
            total_amount: format_sui_amount(total_mist),
            unique_donors: donors.len(),
        }
    }
}

/// `(dev, streamer)` shares of `total` for a basis-point ratio.
pub fn split_amounts(total: f64, split_ratio: u64) -> (f64, f64) {
    let dev = total * split_ratio as f64 / MAX_BASIS_POINTS as f64;
    (dev, total - dev)
}

/// Split a coin of the full donation and call
/// `donation::split_donation(streamer, dev, ratio, coin)`.
///
/// The transaction is signed by `signer`; `donorAddress` only labels the
/// result and defaults to the signer.
pub async fn process_donation(
    adapter: &SuiAdapter,
    signer: &SuiKeypair,
    req: &DonationSplitRequest,
) -> Result<DonationProcessed> {
    let NewDonation {
        split_ratio,
        streamer,
        dev,
        amount,
        donor,
    } = req.parse()?;
    let donor = donor.unwrap_or_else(|| signer.address());

    let submit = async {
        let package = adapter.package_id()?;

        let mut tx = TransactionBuilder::new();
        let gas = tx.gas();
        let total = tx.pure(&amount);
        let donation_coin = tx.split_coins(gas, vec![total])[0];
        let args = vec![
            tx.pure(&streamer),
            tx.pure(&dev),
            tx.pure(&split_ratio),
            donation_coin,
        ];
        tx.move_call(move_function(package, DONATION_MODULE, SPLIT_DONATION)?, args);

        adapter.sign_and_execute(signer, tx, amount).await
    };
    let resp = submit
        .await
        .map_err(|e| e.context("Échec traitement donation"))?;

    let (dev_amount, streamer_amount) = split_amounts(req.donation_amount_sui, split_ratio);
    log::info!(
        "donation de {} SUI ({split_ratio} bps dev) pour {streamer}: {}",
        req.donation_amount_sui,
        resp.digest
    );
    Ok(DonationProcessed {
        digest: resp.digest,
        total_amount: req.donation_amount_sui,
        dev_amount,
        streamer_amount,
        split_ratio,
        donor,
    })
}

/// Donations received by `streamer` within the latest page of events.
pub async fn get_donation_history(
    adapter: &SuiAdapter,
    streamer: &str,
    page: &PageRequest<EventId>,
) -> Result<DonationHistory> {
    let fetched = module_events(adapter, DONATION_MODULE, page, HISTORY_PAGE).await?;
    let next_cursor = cursor_string(fetched.next_cursor.as_ref());

    let donations: Vec<DonationRecord> = fetched
        .data
        .iter()
        .filter(|ev| {
            ev.parsed_json
                .get("streamer")
                .and_then(Value::as_str)
                .is_some_and(|s| same_address(s, streamer))
        })
        .map(DonationRecord::from_event)
        .collect();

    Ok(DonationHistory {
        total: donations.len(),
        donations,
        next_cursor,
    })
}

/// Recomputed from the history query on every call.
pub async fn get_donation_stats(adapter: &SuiAdapter, streamer: &str) -> Result<DonationStats> {
    let history = get_donation_history(adapter, streamer, &PageRequest::default()).await?;
    Ok(DonationStats::from_history(&history))
}
