use rocket::{Build, Rocket};
use tracing::info;
use tracing_subscriber::EnvFilter;
use webos_minesweeper::{
    build_rocket, config::ServerConfig, engine::GameEngine, routes::BASE, store::SessionStore,
};

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!("Starting WebOS minesweeper server");

    let config = ServerConfig::from_env();
    info!(
        "Allowed origins: {:?}, {} new games per client per minute",
        config.allowed_origins, config.games_per_minute
    );

    let engine = GameEngine::new(SessionStore::new());
    let rocket = build_rocket(config, engine);

    info!(
        "Endpoints: POST {base}/new, POST {base}/click, DELETE {base}/<sessionId>",
        base = BASE
    );
    rocket
}
