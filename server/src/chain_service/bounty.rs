//! Bounty lifecycle move calls. Status transitions (pending → active →
//! completed) are enforced on-chain only; nothing is checked locally.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    cursor_string, json_u64, module_events, PageRequest, ACCEPT_BOUNTY, BOUNTY_MODULE,
    COMPLETE_BOUNTY, CREATE_BOUNTY,
};
use crate::chain::{
    move_function, parse_sui_amount, Address, EventId, ObjectId, SuiAdapter, SuiEvent, SuiKeypair,
    TransactionBuilder,
};
use crate::error::{Error, Result};
use crate::validate;

const EVENTS_PAGE: usize = 50;

//////////////////////////////////////////////////
// Requests
//////////////////////////////////////////////////

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BountyCreationRequest {
    pub bounty_id: u64,
    pub dev_address: String,
    pub streamer_address: String,
    pub reward_amount_sui: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BountyAcceptance {
    pub bounty_object_id: String,
    pub streamer_address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BountyCompletion {
    pub bounty_object_id: String,
    pub dev_address: String,
    pub streamer_address: String,
    pub coin_vault_object_id: String,
}

struct NewBounty {
    dev: Address,
    streamer: Address,
    reward: u64,
}

impl BountyCreationRequest {
    fn parse(&self) -> Result<NewBounty> {
        let dev = validate::address("devAddress", &self.dev_address)?;
        let streamer = validate::address("streamerAddress", &self.streamer_address)?;
        validate::positive_amount("rewardAmountSui", self.reward_amount_sui)?;
        let reward = parse_sui_amount(self.reward_amount_sui)?;
        if reward == 0 {
            return Err(Error::Validation("rewardAmountSui inférieur à 1 MIST".into()));
        }
        Ok(NewBounty {
            dev,
            streamer,
            reward,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.parse().map(drop)
    }
}

impl BountyAcceptance {
    fn parse(&self) -> Result<(ObjectId, Address)> {
        Ok((
            validate::address("bountyObjectId", &self.bounty_object_id)?,
            validate::address("streamerAddress", &self.streamer_address)?,
        ))
    }

    pub fn validate(&self) -> Result<()> {
        self.parse().map(drop)
    }
}

impl BountyCompletion {
    fn parse(&self) -> Result<(ObjectId, Address, Address, ObjectId)> {
        Ok((
            validate::address("bountyObjectId", &self.bounty_object_id)?,
            validate::address("devAddress", &self.dev_address)?,
            validate::address("streamerAddress", &self.streamer_address)?,
            validate::address("coinVaultObjectId", &self.coin_vault_object_id)?,
        ))
    }

    pub fn validate(&self) -> Result<()> {
        self.parse().map(drop)
    }
}

//////////////////////////////////////////////////
// Results
//////////////////////////////////////////////////

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BountyCreated {
    pub digest: String,
    pub bounty_id: u64,
    pub effects: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct BountyAccepted {
    pub digest: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BountyCompleted {
    pub digest: String,
    pub paid: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BountyEvents {
    pub events: Vec<SuiEvent>,
    pub next_cursor: Option<String>,
}

//////////////////////////////////////////////////
// Builders
//////////////////////////////////////////////////

/// Split the reward off the gas coin and hand it to
/// `bounty::create_bounty(bounty_id, dev, streamer, reward)`.
pub async fn create_bounty(
    adapter: &SuiAdapter,
    signer: &SuiKeypair,
    req: &BountyCreationRequest,
) -> Result<BountyCreated> {
    let NewBounty {
        dev,
        streamer,
        reward,
    } = req.parse()?;

    let submit = async {
        let package = adapter.package_id()?;

        let mut tx = TransactionBuilder::new();
        let gas = tx.gas();
        let amount = tx.pure(&reward);
        let reward_coin = tx.split_coins(gas, vec![amount])[0];
        let args = vec![
            tx.pure(&req.bounty_id),
            tx.pure(&dev),
            tx.pure(&streamer),
            reward_coin,
        ];
        tx.move_call(move_function(package, BOUNTY_MODULE, CREATE_BOUNTY)?, args);

        adapter.sign_and_execute(signer, tx, reward).await
    };
    let resp = submit
        .await
        .map_err(|e| e.context("Échec création bounty"))?;

    log::info!("bounty {} créée: {}", req.bounty_id, resp.digest);
    Ok(BountyCreated {
        digest: resp.digest,
        bounty_id: req.bounty_id,
        effects: resp.effects.unwrap_or(Value::Null),
    })
}

/// `bounty::accept_bounty(&mut bounty, streamer)`.
pub async fn accept_bounty(
    adapter: &SuiAdapter,
    signer: &SuiKeypair,
    req: &BountyAcceptance,
) -> Result<BountyAccepted> {
    let (bounty, streamer) = req.parse()?;

    let submit = async {
        let package = adapter.package_id()?;

        let mut tx = TransactionBuilder::new();
        let bounty_arg = tx.object(adapter.object_input(bounty, true).await?);
        let streamer_arg = tx.pure(&streamer);
        tx.move_call(
            move_function(package, BOUNTY_MODULE, ACCEPT_BOUNTY)?,
            vec![bounty_arg, streamer_arg],
        );

        adapter.sign_and_execute(signer, tx, 0).await
    };
    let resp = submit
        .await
        .map_err(|e| e.context("Échec acceptation bounty"))?;

    log::info!("bounty {bounty} acceptée: {}", resp.digest);
    Ok(BountyAccepted {
        digest: resp.digest,
    })
}

/// `bounty::complete_bounty(&mut bounty, dev, streamer, &mut vault)`. The
/// vault balance is checked on-chain.
pub async fn complete_bounty(
    adapter: &SuiAdapter,
    signer: &SuiKeypair,
    req: &BountyCompletion,
) -> Result<BountyCompleted> {
    let (bounty, dev, streamer, vault) = req.parse()?;

    let submit = async {
        let package = adapter.package_id()?;

        let mut tx = TransactionBuilder::new();
        let bounty_arg = tx.object(adapter.object_input(bounty, true).await?);
        let dev_arg = tx.pure(&dev);
        let streamer_arg = tx.pure(&streamer);
        let vault_arg = tx.object(adapter.object_input(vault, true).await?);
        tx.move_call(
            move_function(package, BOUNTY_MODULE, COMPLETE_BOUNTY)?,
            vec![bounty_arg, dev_arg, streamer_arg, vault_arg],
        );

        adapter.sign_and_execute(signer, tx, 0).await
    };
    let resp = submit
        .await
        .map_err(|e| e.context("Échec complétion bounty"))?;

    log::info!("bounty {bounty} payée: {}", resp.digest);
    Ok(BountyCompleted {
        digest: resp.digest,
        paid: true,
    })
}

//////////////////////////////////////////////////
// Reads
//////////////////////////////////////////////////

/// Latest `bounty` events, optionally only those whose `bounty_id` matches.
/// Filtering happens on the fetched page.
pub async fn get_bounty_events(
    adapter: &SuiAdapter,
    bounty_id: Option<u64>,
    page: &PageRequest<EventId>,
) -> Result<BountyEvents> {
    let fetched = module_events(adapter, BOUNTY_MODULE, page, EVENTS_PAGE).await?;
    let next_cursor = cursor_string(fetched.next_cursor.as_ref());

    let events = fetched
        .data
        .into_iter()
        .filter(|ev| match bounty_id {
            Some(id) => ev.parsed_json.get("bounty_id").and_then(json_u64) == Some(id),
            None => true,
        })
        .collect();

    Ok(BountyEvents {
        events,
        next_cursor,
    })
}
