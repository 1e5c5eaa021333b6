use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use skybook_shared::Cents;

use crate::models::Airport;
use crate::{CoreError, CoreResult};

/// Raw query parameters for an availability search. Blank values mean "no filter".
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FlightSearchParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub class: Option<String>,
}

impl FlightSearchParams {
    pub fn into_request(self) -> CoreResult<FlightSearchRequest> {
        let date = match non_blank(self.date) {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                CoreError::InvalidRequest(format!("date must be YYYY-MM-DD, got {:?}", raw))
            })?),
            None => None,
        };

        Ok(FlightSearchRequest {
            origin: non_blank(self.origin),
            destination: non_blank(self.destination),
            date,
            class: non_blank(self.class),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlightSearchRequest {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
    /// Exact ticket-type display name.
    pub class: Option<String>,
}

impl FlightSearchRequest {
    pub fn matches_origin(&self, airport: &Airport) -> bool {
        self.origin
            .as_deref()
            .map_or(true, |term| airport_matches(term, airport))
    }

    pub fn matches_destination(&self, airport: &Airport) -> bool {
        self.destination
            .as_deref()
            .map_or(true, |term| airport_matches(term, airport))
    }

    pub fn matches_date(&self, flight_date: NaiveDate) -> bool {
        self.date.map_or(true, |d| d == flight_date)
    }

    pub fn matches_class(&self, ticket_type_name: &str) -> bool {
        self.class.as_deref().map_or(true, |c| c == ticket_type_name)
    }
}

/// Case-insensitive substring match against city, IATA code, or airport name.
pub fn airport_matches(term: &str, airport: &Airport) -> bool {
    let needle = term.to_lowercase();
    [&airport.city, &airport.iata_code, &airport.name]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Builds an `ILIKE` pattern that matches `term` literally anywhere in a column.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// One (flight, ticket type) row with at least one unsold seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightOption {
    pub flight_id: i64,
    pub flight_number: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub flight_date: NaiveDate,
    pub origin_city: String,
    pub origin_code: String,
    pub destination_city: String,
    pub destination_code: String,
    pub aircraft_model: String,
    pub flight_status: String,
    pub ticket_type_id: i64,
    pub ticket_type: String,
    pub base_price: Cents,
    pub available_seats: i64,
}

#[derive(Debug, Serialize)]
pub struct FlightSearchResult {
    pub flights: Vec<FlightOption>,
    pub count: usize,
}

impl From<Vec<FlightOption>> for FlightSearchResult {
    fn from(flights: Vec<FlightOption>) -> Self {
        let count = flights.len();
        Self { flights, count }
    }
}

/// A physical seat annotated with its booked flag for one flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatView {
    pub seat_id: i64,
    pub seat_number: String,
    pub seat_class: String,
    pub booked: bool,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SeatMapParams {
    pub class: Option<String>,
}

impl SeatMapParams {
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct SeatMap {
    pub flight_id: i64,
    pub seats: Vec<SeatView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jfk() -> Airport {
        Airport {
            id: 1,
            iata_code: "JFK".to_string(),
            name: "John F. Kennedy International".to_string(),
            city: "New York".to_string(),
        }
    }

    #[test]
    fn test_airport_matching_any_field() {
        let airport = jfk();
        assert!(airport_matches("jfk", &airport));
        assert!(airport_matches("york", &airport));
        assert!(airport_matches("Kennedy", &airport));
        assert!(!airport_matches("LHR", &airport));
    }

    #[test]
    fn test_blank_params_are_no_filter() {
        let params = FlightSearchParams {
            origin: Some("  ".to_string()),
            destination: Some(" London ".to_string()),
            date: Some(String::new()),
            class: None,
        };
        let req = params.into_request().unwrap();
        assert_eq!(req.origin, None);
        assert_eq!(req.destination.as_deref(), Some("London"));
        assert_eq!(req.date, None);
        assert!(req.matches_origin(&jfk()));
    }

    #[test]
    fn test_bad_date_is_invalid_request() {
        let params = FlightSearchParams {
            date: Some("25/12/2024".to_string()),
            ..Default::default()
        };
        let err = params.into_request().unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("JFK"), "%JFK%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
