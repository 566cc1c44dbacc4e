use actix_web::{middleware::Logger, web, App, HttpServer};
use purple_sui_server::{chain, config::settings, http, idempotency, metrics, state::AppState};
use std::time::Duration;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let settings = settings();
    let state = web::Data::new(AppState::from_settings(settings));

    log::info!("nœud Sui: {}", settings.sui_rpc_url);
    chain::verify_sui_config(&state.sui).await;

    idempotency::start(state.idempotency.clone(), Duration::from_secs(60));

    log::info!("écoute sur {}", settings.server_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(metrics::METRICS.clone())
            .app_data(state.clone())
            .configure(http::routes::init_routes)
    })
    .bind(&settings.server_addr)?
    .run()
    .await
}
