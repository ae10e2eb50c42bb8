use rocket::{
    Catcher, Request, Route, State, catch, catchers, delete, http::Status, post, routes,
    serde::json::Json,
};
use tracing::{info, instrument, warn};

use crate::{
    data::SIZE,
    engine::GameEngine,
    error::ApiError,
    model::{
        client::{ClickRequest, NewGameRequest},
        server::{ErrorResponse, GameResponse},
    },
    rate_limit::{ClientIp, RateLimiter},
};

pub const BASE: &str = "/api/games/minesweeper";

fn require_session_id(session_id: Option<&str>) -> Result<&str, ApiError> {
    match session_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(ApiError::BadRequest("sessionId is required".to_string())),
    }
}

fn require_coordinate(value: Option<i64>) -> Result<usize, ApiError> {
    value
        .and_then(|v| usize::try_from(v).ok())
        .filter(|&v| v < SIZE)
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "row and col must be between 0 and {}",
                SIZE - 1
            ))
        })
}

#[post("/new", data = "<request>")]
#[instrument(level = "trace", skip(request, engine, rate_limiter, client_ip), fields(client_ip = %client_ip.0))]
pub fn new_game(
    request: Json<NewGameRequest>,
    engine: &State<GameEngine>,
    rate_limiter: &State<RateLimiter>,
    client_ip: ClientIp,
) -> Result<Json<GameResponse>, ApiError> {
    let session_id = require_session_id(request.session_id())?;

    if let Err(error) = rate_limiter.check(&client_ip) {
        warn!("Rate limit exceeded for client {}", client_ip.0);
        return Err(error);
    }

    Ok(Json(engine.new_game(session_id)))
}

#[post("/click", data = "<request>")]
#[instrument(level = "trace", skip(request, engine))]
pub async fn click(
    request: Json<ClickRequest>,
    engine: &State<GameEngine>,
) -> Result<Json<GameResponse>, ApiError> {
    let session_id = require_session_id(request.session_id())?;
    let row = require_coordinate(request.row())?;
    let col = require_coordinate(request.col())?;

    match engine.click(session_id, row, col).await {
        Some(response) => Ok(Json(response)),
        None => {
            warn!("Click for unknown session: {}", session_id);
            Err(ApiError::NotFound)
        }
    }
}

#[delete("/<session_id>")]
#[instrument(level = "trace", skip(engine))]
pub fn end_game(session_id: &str, engine: &State<GameEngine>) -> Status {
    if !engine.end_game(session_id) {
        info!("End requested for unknown session: {}", session_id);
    }
    Status::NoContent
}

/// Renders framework-level failures (bad JSON, unknown route) as JSON errors too.
#[catch(default)]
fn json_error(status: Status, _request: &Request<'_>) -> (Status, Json<ErrorResponse>) {
    let error = status.reason().unwrap_or("Unknown error").to_string();
    (status, Json(ErrorResponse { error }))
}

pub fn routes() -> Vec<Route> {
    routes![new_game, click, end_game]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![json_error]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_must_not_be_blank() {
        assert_eq!(require_session_id(Some("abc")), Ok("abc"));
        assert!(require_session_id(Some("   ")).is_err());
        assert!(require_session_id(None).is_err());
    }

    #[test]
    fn coordinates_must_be_on_the_board() {
        assert_eq!(require_coordinate(Some(0)), Ok(0));
        assert_eq!(require_coordinate(Some(9)), Ok(9));
        assert!(require_coordinate(Some(10)).is_err());
        assert!(require_coordinate(Some(-1)).is_err());
        assert!(require_coordinate(None).is_err());
    }
}
