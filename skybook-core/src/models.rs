use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use skybook_shared::{Cents, Masked};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airport {
    pub id: i64,
    pub iata_code: String,
    pub name: String,
    pub city: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightStatus {
    Scheduled,
    Boarding,
    Delayed,
    Departed,
    Arrived,
    Cancelled,
}

impl FlightStatus {
    /// Statuses under which seats can still be sold.
    pub const SELLABLE: [FlightStatus; 2] = [FlightStatus::Scheduled, FlightStatus::Boarding];

    pub fn is_sellable(&self) -> bool {
        Self::SELLABLE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "Scheduled",
            FlightStatus::Boarding => "Boarding",
            FlightStatus::Delayed => "Delayed",
            FlightStatus::Departed => "Departed",
            FlightStatus::Arrived => "Arrived",
            FlightStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(FlightStatus::Scheduled),
            "Boarding" => Ok(FlightStatus::Boarding),
            "Delayed" => Ok(FlightStatus::Delayed),
            "Departed" => Ok(FlightStatus::Departed),
            "Arrived" => Ok(FlightStatus::Arrived),
            "Cancelled" => Ok(FlightStatus::Cancelled),
            other => Err(format!("unknown flight status: {}", other)),
        }
    }
}

/// A scheduled flight. Immutable after creation apart from its status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    pub flight_number: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub flight_date: NaiveDate,
    pub route_id: i64,
    pub aircraft_id: i64,
    pub status: FlightStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: i64,
    pub origin_airport_id: i64,
    pub destination_airport_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: i64,
    pub model: String,
}

/// Physical seat, static per aircraft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub seat_number: String,
    pub seat_class: String,
    pub aircraft_id: i64,
}

/// Ledger entry: whether a physical seat is sold on one specific flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSeat {
    pub flight_id: i64,
    pub seat_id: i64,
    pub booked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    pub id: i64,
    pub name: String,
    pub base_fare: Cents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub passenger_id: i64,
    pub flight_id: i64,
    pub ticket_type_id: i64,
    pub status: BookingStatus,
    pub total_amount: Cents,
    pub created_at: DateTime<Utc>,
}

/// Single seat attached to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSeat {
    pub booking_id: Uuid,
    pub seat_id: i64,
}

/// The subject of a booking, owned by the profile subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerIdentity {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<Masked<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sellable_statuses() {
        assert!(FlightStatus::Scheduled.is_sellable());
        assert!(FlightStatus::Boarding.is_sellable());
        assert!(!FlightStatus::Delayed.is_sellable());
        assert!(!FlightStatus::Departed.is_sellable());
        assert!(!FlightStatus::Cancelled.is_sellable());
    }

    #[test]
    fn test_status_round_trip_names() {
        assert_eq!("Boarding".parse::<FlightStatus>().unwrap(), FlightStatus::Boarding);
        assert!("Lost".parse::<FlightStatus>().is_err());
        assert_eq!(BookingStatus::Confirmed.to_string(), "Confirmed");
    }
}
