use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skybook_shared::{Cents, Masked};
use uuid::Uuid;

use crate::models::BookingStatus;
use crate::{CoreError, CoreResult};

/// Incoming reservation request. Every field is required; they are optional
/// here only so that a missing field is reported as `InvalidRequest` rather
/// than a deserialization failure.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub passenger_id: Option<i64>,
    pub flight_id: Option<i64>,
    pub seat_id: Option<i64>,
    pub ticket_type_id: Option<i64>,
    pub payment_method_id: Option<i64>,
}

/// A request whose identifiers are all present and well formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatRequest {
    pub passenger_id: i64,
    pub flight_id: i64,
    pub seat_id: i64,
    pub ticket_type_id: i64,
    pub payment_method_id: i64,
}

impl CreateBookingRequest {
    pub fn validate(&self) -> CoreResult<SeatRequest> {
        Ok(SeatRequest {
            passenger_id: required("passenger_id", self.passenger_id)?,
            flight_id: required("flight_id", self.flight_id)?,
            seat_id: required("seat_id", self.seat_id)?,
            ticket_type_id: required("ticket_type_id", self.ticket_type_id)?,
            payment_method_id: required("payment_method_id", self.payment_method_id)?,
        })
    }
}

fn required(field: &str, value: Option<i64>) -> CoreResult<i64> {
    match value {
        Some(id) if id > 0 => Ok(id),
        Some(id) => Err(CoreError::InvalidRequest(format!(
            "{} must be a positive identifier, got {}",
            field, id
        ))),
        None => Err(CoreError::InvalidRequest(format!("{} is required", field))),
    }
}

/// The joined view returned once a booking is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: Uuid,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub total_amount: Cents,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<Masked<String>>,
    pub flight_number: String,
    pub seat_number: String,
    pub ticket_type: String,
    pub transaction_id: String,
}
