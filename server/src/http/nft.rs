//! Reward NFT airdrops (admin only) and the matching read paths.

use actix_web::{get, post, web, HttpRequest, HttpResponse};

use super::response::{degrade, idempotent, ok, PageQuery};
use crate::chain_service::airdrop::{self, AirdropRecipient, BatchAirdropRequest};
use crate::error::Result;
use crate::state::AppState;
use crate::validate;

#[post("/nft/batch")]
async fn batch(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<BatchAirdropRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    let signer = state.sui.keypair()?;
    let recipients = body.into_inner().recipients;
    idempotent(&state, &req, "nft/batch", || {
        airdrop::batch_airdrop(&state.sui, &signer, recipients)
    })
    .await
}

#[post("/nft/single")]
async fn single(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AirdropRecipient>,
) -> Result<HttpResponse> {
    let recipient = body.into_inner();
    validate::address("address", &recipient.address)?;
    validate::score(recipient.score)?;
    let signer = state.sui.keypair()?;
    idempotent(&state, &req, "nft/single", || {
        airdrop::airdrop_single(&state.sui, &signer, recipient)
    })
    .await
}

#[get("/nft/history")]
async fn history(state: web::Data<AppState>, query: web::Query<PageQuery>) -> Result<HttpResponse> {
    let page = query.events()?;
    let feed = degrade(
        "historique airdrops",
        airdrop::get_airdrop_history(&state.sui, &page).await,
    )?;
    Ok(ok(feed))
}

#[get("/nft/my-nfts/{address}")]
async fn my_nfts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let owner = path.into_inner();
    let page = query.objects()?;
    let nfts = degrade(
        "NFT du destinataire",
        airdrop::get_recipient_nfts(&state.sui, &owner, &page).await,
    )?;
    Ok(ok(nfts))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(batch)
        .service(single)
        .service(history)
        .service(my_nfts);
}
