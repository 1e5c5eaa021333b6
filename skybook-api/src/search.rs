use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use axum::extract::rejection::{PathRejection, QueryRejection};
use skybook_core::search::{FlightSearchParams, FlightSearchResult, SeatMap, SeatMapParams};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flights/search", get(search_flights))
        .route("/v1/flights/{flight_id}/seats", get(seat_map))
}

async fn search_flights(
    State(state): State<AppState>,
    params: Result<Query<FlightSearchParams>, QueryRejection>,
) -> Result<Json<FlightSearchResult>, AppError> {
    let Query(params) = params?;
    let req = params.into_request()?;
    let options = state.inventory.search(&req).await?;
    info!("Flight search returned {} options", options.len());
    Ok(Json(FlightSearchResult::from(options)))
}

async fn seat_map(
    State(state): State<AppState>,
    flight_id: Result<Path<i64>, PathRejection>,
    params: Result<Query<SeatMapParams>, QueryRejection>,
) -> Result<Json<SeatMap>, AppError> {
    let Path(flight_id) = flight_id?;
    let Query(params) = params?;
    let map = state.inventory.seat_map(flight_id, params.class()).await?;
    Ok(Json(map))
}
