use crate::http;
use actix_web::web;

/// Mount every HTTP sub-module under `/api`.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(http::response::json_config())
            .app_data(http::response::path_config())
            .app_data(http::response::query_config())
            .configure(http::bounty::init_routes)
            .configure(http::donation::init_routes)
            .configure(http::nft::init_routes)
            .configure(http::twitch::init_routes)
            .configure(http::health::init_routes),
    );
}
