pub mod cleanup;
pub mod config;
pub mod cors;
pub mod data;
pub mod engine;
pub mod error;
pub mod logic;
pub mod model;
pub mod rate_limit;
pub mod routes;
pub mod store;

use rocket::{Build, Rocket};

use crate::{
    cleanup::CleanupFairing, config::ServerConfig, cors::create_cors, engine::GameEngine,
    rate_limit::RateLimiter,
};

/// Assembles the HTTP server around an engine. Tests pass their own engine to
/// control the boards it serves.
pub fn build_rocket(config: ServerConfig, engine: GameEngine) -> Rocket<Build> {
    let rate_limiter = RateLimiter::new(config.games_per_minute);

    rocket::build()
        .attach(create_cors(&config.allowed_origins))
        .attach(CleanupFairing)
        .manage(engine)
        .manage(rate_limiter)
        .manage(config)
        .mount(routes::BASE, routes::routes())
        .register("/", routes::catchers())
}
