use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use skybook_core::booking::{BookingConfirmation, CreateBookingRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BookingCreated {
    pub message: String,
    pub booking: BookingConfirmation,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking: BookingConfirmation,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{booking_id}", get(get_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingCreated>), AppError> {
    let Json(req) = payload?;
    let booking = state.coordinator.create_booking(&req).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreated {
            message: "Booking confirmed".to_string(),
            booking,
        }),
    ))
}

async fn get_booking(
    State(state): State<AppState>,
    booking_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let Path(booking_id) = booking_id?;
    let booking = state.inventory.booking(booking_id).await?;
    Ok(Json(BookingResponse { booking }))
}
