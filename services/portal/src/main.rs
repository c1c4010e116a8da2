use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use sacm_core::tracing::init_tracing;
use sacm_portal::config::PortalConfig;
use sacm_portal::infra::language_model::HttpLanguageModel;
use sacm_portal::router::build_router;
use sacm_portal::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = PortalConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .expect("failed to build HTTP client");

    if config.ai_api_base_url.is_none() {
        info!("AI_API_BASE_URL not set, study aid uses local fallbacks");
    }

    let state = AppState {
        db,
        redis,
        jwt_secret: config.jwt_secret,
        cookie_domain: config.cookie_domain,
        password_reset_url: config.password_reset_url,
        expose_verification_codes: config.expose_verification_codes,
        language_model: HttpLanguageModel {
            client: http,
            base_url: config.ai_api_base_url,
            api_key: config.ai_api_key,
            model: config.ai_model,
        },
        ai_rate_limit_per_hour: config.ai_rate_limit_per_hour,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.portal_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("portal service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
