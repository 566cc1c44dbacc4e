//! Bounty routes: create / accept / complete and the event feed.

use actix_web::{get, post, web, HttpRequest, HttpResponse};

use super::response::{degrade, idempotent, ok, PageQuery};
use crate::chain_service::bounty::{
    self, BountyAcceptance, BountyCompletion, BountyCreationRequest, BountyEvents,
};
use crate::error::Result;
use crate::state::AppState;

#[post("/bounty/create")]
async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<BountyCreationRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    let signer = state.sui.keypair()?;
    idempotent(&state, &req, "bounty/create", || {
        bounty::create_bounty(&state.sui, &signer, &body)
    })
    .await
}

#[post("/bounty/accept")]
async fn accept(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<BountyAcceptance>,
) -> Result<HttpResponse> {
    body.validate()?;
    let signer = state.sui.keypair()?;
    idempotent(&state, &req, "bounty/accept", || {
        bounty::accept_bounty(&state.sui, &signer, &body)
    })
    .await
}

#[post("/bounty/complete")]
async fn complete(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<BountyCompletion>,
) -> Result<HttpResponse> {
    body.validate()?;
    let signer = state.sui.keypair()?;
    idempotent(&state, &req, "bounty/complete", || {
        bounty::complete_bounty(&state.sui, &signer, &body)
    })
    .await
}

async fn events_page(
    state: &AppState,
    bounty_id: Option<u64>,
    query: &PageQuery,
) -> Result<HttpResponse> {
    let page = query.events()?;
    let feed: BountyEvents = degrade(
        "événements bounty",
        bounty::get_bounty_events(&state.sui, bounty_id, &page).await,
    )?;
    Ok(ok(feed))
}

#[get("/bounty/events")]
async fn events(state: web::Data<AppState>, query: web::Query<PageQuery>) -> Result<HttpResponse> {
    events_page(&state, None, &query).await
}

#[get("/bounty/events/{bounty_id}")]
async fn events_for(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    events_page(&state, Some(path.into_inner()), &query).await
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(accept)
        .service(complete)
        .service(events)
        .service(events_for);
}
