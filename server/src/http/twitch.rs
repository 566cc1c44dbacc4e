//! Twitch OAuth callback. Every outcome is a redirect back to the frontend.

use actix_web::{get, http::header, web, HttpResponse};
use anyhow::{anyhow, Context};
use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::state::{AppState, TwitchApp};

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const USERS_URL: &str = "https://api.twitch.tv/helix/users";

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UsersResponse {
    data: Vec<TwitchUser>,
}

#[derive(Debug, Deserialize)]
struct TwitchUser {
    id: String,
    login: String,
    display_name: String,
    #[serde(default)]
    profile_image_url: String,
}

async fn exchange_code(
    http: &reqwest::Client,
    app: &TwitchApp,
    code: &str,
) -> anyhow::Result<TwitchUser> {
    let client_id = app.client_id.as_deref().context("TWITCH_CLIENT_ID absent")?;
    let client_secret = app
        .client_secret
        .as_deref()
        .context("TWITCH_CLIENT_SECRET absent")?;
    let redirect_uri = app
        .redirect_uri
        .as_deref()
        .context("TWITCH_REDIRECT_URI absent")?;

    let token: TokenResponse = http
        .post(TOKEN_URL)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await?
        .error_for_status()
        .context("échange du code")?
        .json()
        .await?;

    let users: UsersResponse = http
        .get(USERS_URL)
        .bearer_auth(&token.access_token)
        .header("Client-Id", client_id)
        .send()
        .await?
        .error_for_status()
        .context("lecture du profil")?
        .json()
        .await?;

    users
        .data
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("aucun utilisateur Twitch renvoyé"))
}

fn frontend_link(base: &str, path: &str, pairs: &[(&str, &str)]) -> Result<Url, Error> {
    let mut url = Url::parse(&format!("{base}{path}"))
        .map_err(|e| Error::Configuration(format!("FRONTEND_URL invalide: {e}")))?;
    url.query_pairs_mut().extend_pairs(pairs);
    Ok(url)
}

fn redirect(url: Url) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, url.as_str()))
        .finish()
}

fn error_redirect(state: &AppState, reason: &str) -> Result<HttpResponse, Error> {
    frontend_link(&state.frontend_url, "/", &[("error", reason)]).map(redirect)
}

#[get("/twitch/callback")]
async fn callback(
    state: web::Data<AppState>,
    query: web::Query<CallbackQuery>,
) -> Result<HttpResponse, Error> {
    if let Some(reason) = query.error.as_deref() {
        log::warn!("OAuth Twitch refusé: {reason}");
        return error_redirect(&state, reason);
    }
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return error_redirect(&state, "missing_code");
    };

    match exchange_code(&state.http, &state.twitch, code).await {
        Ok(user) => {
            log::info!("connexion Twitch de {}", user.login);
            frontend_link(
                &state.frontend_url,
                "/auth/callback",
                &[
                    ("twitch_id", user.id.as_str()),
                    ("login", user.login.as_str()),
                    ("display_name", user.display_name.as_str()),
                    ("profile_image", user.profile_image_url.as_str()),
                ],
            )
            .map(redirect)
        }
        Err(e) => {
            log::error!("échec OAuth Twitch: {e:#}");
            error_redirect(&state, "auth_failed")
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(callback);
}
