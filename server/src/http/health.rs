//! Liveness and readiness check backed by `verify_sui_config`.

use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::chain::verify_sui_config;
use crate::state::AppState;

/// 200 when the node answers and the signer and package are configured,
/// 503 with the collected warnings otherwise.
#[get("/healthz")]
pub async fn healthz(state: web::Data<AppState>) -> impl Responder {
    let report = verify_sui_config(&state.sui).await;
    let body = json!({
        "success": report.is_healthy(),
        "chain": report.chain_id,
        "signer": report.signer,
        "packageId": report.package_id,
        "warnings": report.warnings,
    });
    if report.is_healthy() {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthz);
}
