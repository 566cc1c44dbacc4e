//! Uniform JSON envelope and request plumbing shared by the routes.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::chain::{parse_address, EventId, ObjectId};
use crate::chain_service::PageRequest;
use crate::error::{Error, Result};
use crate::idempotency::Claim;
use crate::state::AppState;

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// `{ "success": true, ...payload }`
#[derive(Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: T,
}

pub fn ok<T: Serialize>(payload: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        success: true,
        payload,
    })
}

/// Run a write operation at most once per `Idempotency-Key`.
///
/// Without the header the operation simply runs. With it, a duplicate
/// in flight is refused and a completed one is replayed.
pub async fn idempotent<F, Fut, T>(
    state: &AppState,
    req: &HttpRequest,
    scope: &str,
    op: F,
) -> Result<HttpResponse>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
    T: Serialize,
{
    let key = req
        .headers()
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| format!("{scope}:{k}"));

    let Some(key) = key else {
        return Ok(ok(op().await?));
    };

    match state.idempotency.claim(&key) {
        Claim::InFlight => Err(Error::Duplicate(format!(
            "requête {key} déjà en cours de traitement"
        ))),
        Claim::Replay(body) => {
            log::info!("réponse rejouée pour {key}");
            Ok(HttpResponse::Ok()
                .insert_header(("Idempotent-Replayed", "true"))
                .json(body))
        }
        Claim::Fresh => {
            let held = state.idempotency.hold(&key);
            let body = serde_json::to_value(Envelope {
                success: true,
                payload: op().await?,
            })?;
            held.complete(body.clone());
            Ok(HttpResponse::Ok().json(body))
        }
    }
}

/// `?cursor=&limit=` on read routes.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

impl PageQuery {
    pub fn events(&self) -> Result<PageRequest<EventId>> {
        Ok(PageRequest {
            cursor: self
                .cursor
                .as_deref()
                .map(|c| c.parse::<EventId>())
                .transpose()?,
            limit: self.limit,
        })
    }

    pub fn objects(&self) -> Result<PageRequest<ObjectId>> {
        let cursor = self
            .cursor
            .as_deref()
            .map(parse_address)
            .transpose()
            .map_err(|e| Error::Validation(format!("curseur invalide: {e}")))?;
        Ok(PageRequest {
            cursor,
            limit: self.limit,
        })
    }
}

/// Read routes hide chain-side failures behind an empty result; bad input
/// still answers 400.
pub fn degrade<T: Default>(what: &str, res: Result<T>) -> Result<T> {
    match res {
        Ok(v) => Ok(v),
        Err(e) if e.is_validation() => Err(e),
        Err(e) => {
            log::warn!("{what}: {e}, réponse vide renvoyée");
            Ok(T::default())
        }
    }
}

/// Extractor configs turning malformed bodies / paths / queries into 400
/// envelopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::Validation(format!("corps JSON invalide: {err}")).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| Error::Validation(format!("chemin invalide: {err}")).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| Error::Validation(format!("paramètres invalides: {err}")).into())
}
