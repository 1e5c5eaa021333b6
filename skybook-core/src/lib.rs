pub mod booking;
pub mod models;
pub mod payment;
pub mod repository;
pub mod search;

use serde::Serialize;

/// Stable error code reported alongside every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    SeatUnavailable,
    StorageFault,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::SeatUnavailable => "SEAT_UNAVAILABLE",
            ErrorKind::StorageFault => "STORAGE_FAULT",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Seat {seat_id} is already booked on flight {flight_id}")]
    SeatUnavailable { flight_id: i64, seat_id: i64 },
    #[error("Storage fault: {0}")]
    StorageFault(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::SeatUnavailable { .. } => ErrorKind::SeatUnavailable,
            CoreError::StorageFault(_) => ErrorKind::StorageFault,
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        CoreError::StorageFault(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_stable() {
        let err = CoreError::SeatUnavailable { flight_id: 1, seat_id: 12 };
        assert_eq!(err.kind(), ErrorKind::SeatUnavailable);
        assert_eq!(err.kind().as_str(), "SEAT_UNAVAILABLE");
        assert_eq!(err.to_string(), "Seat 12 is already booked on flight 1");

        let json = serde_json::to_string(&ErrorKind::StorageFault).unwrap();
        assert_eq!(json, "\"STORAGE_FAULT\"");
    }
}
