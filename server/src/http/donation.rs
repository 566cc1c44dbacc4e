//! Donation routes: the split transfer, per-streamer history and totals.

use actix_web::{get, post, web, HttpRequest, HttpResponse};

use super::response::{degrade, idempotent, ok, PageQuery};
use crate::chain_service::donation::{self, DonationSplitRequest};
use crate::error::Result;
use crate::state::AppState;
use crate::validate;

#[post("/donation/split")]
async fn split(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<DonationSplitRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    let signer = state.sui.keypair()?;
    idempotent(&state, &req, "donation/split", || {
        donation::process_donation(&state.sui, &signer, &body)
    })
    .await
}

#[get("/donation/history/{streamer}")]
async fn history(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let streamer = path.into_inner();
    validate::address("streamerAddress", &streamer)?;
    let page = query.events()?;
    let feed = degrade(
        "historique donations",
        donation::get_donation_history(&state.sui, &streamer, &page).await,
    )?;
    Ok(ok(feed))
}

/// Zeros when the history cannot be read.
#[get("/donation/stats/{streamer}")]
async fn stats(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let streamer = path.into_inner();
    validate::address("streamerAddress", &streamer)?;
    let totals = degrade(
        "statistiques donations",
        donation::get_donation_stats(&state.sui, &streamer).await,
    )?;
    Ok(ok(totals))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(split).service(history).service(stats);
}
