use std::sync::Arc;

use skybook_core::booking::BookingConfirmation;
use skybook_core::models::FlightSeat;
use skybook_core::repository::{InventoryReader, ReferenceData};
use skybook_core::search::{FlightOption, FlightSearchRequest, SeatMap};
use skybook_core::{CoreError, CoreResult};
use tracing::debug;
use uuid::Uuid;

/// Read side of the seat inventory: availability search, per-flight seat
/// maps and ledger lookups. Results may be stale by the time a booking is
/// attempted; the booking path re-checks through the atomic claim.
#[derive(Clone)]
pub struct InventoryService {
    reference: Arc<dyn ReferenceData>,
    reader: Arc<dyn InventoryReader>,
}

impl InventoryService {
    pub fn new(reference: Arc<dyn ReferenceData>, reader: Arc<dyn InventoryReader>) -> Self {
        Self { reference, reader }
    }

    pub async fn search(&self, req: &FlightSearchRequest) -> CoreResult<Vec<FlightOption>> {
        let options = self.reader.search_availability(req).await?;
        debug!("Search {:?} matched {} flight options", req, options.len());
        Ok(options)
    }

    pub async fn seat_map(&self, flight_id: i64, class: Option<&str>) -> CoreResult<SeatMap> {
        let flight = self
            .reference
            .resolve_flight(flight_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("flight {}", flight_id)))?;

        let seats = self
            .reader
            .aircraft_seats(flight.id, flight.aircraft_id, class)
            .await?;
        debug!("Found {} seats for flight {}", seats.len(), flight_id);

        Ok(SeatMap { flight_id, seats })
    }

    /// Ledger state for (flight, seat); `None` when never materialized,
    /// which is equivalent to free.
    pub async fn ledger_status(&self, flight_id: i64, seat_id: i64) -> CoreResult<Option<FlightSeat>> {
        self.reader.ledger_entry(flight_id, seat_id).await
    }

    /// Committed, confirmed booking with its passenger, flight, seat and
    /// payment details.
    pub async fn booking(&self, booking_id: Uuid) -> CoreResult<BookingConfirmation> {
        self.reader
            .find_confirmation(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("booking {}", booking_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use skybook_core::repository::BookingStore;
    use skybook_store::memory::InMemoryStore;
    use skybook_store::seed;

    fn service() -> (InMemoryStore, InventoryService) {
        let store = InMemoryStore::new();
        seed::seed_demo(&store);
        let shared = Arc::new(store.clone());
        (store, InventoryService::new(shared.clone(), shared))
    }

    async fn book_committed(store: &InMemoryStore, flight_id: i64, seat_id: i64) {
        let mut unit = store.begin().await.unwrap();
        unit.ensure_entry(flight_id, seat_id).await.unwrap();
        assert!(unit.try_claim(flight_id, seat_id).await.unwrap());
        unit.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_search_excludes_unsellable_and_orders_by_departure() {
        let (_store, service) = service();
        let options = service.search(&FlightSearchRequest::default()).await.unwrap();

        assert!(!options.is_empty());
        assert!(options.iter().all(|o| o.flight_id != seed::FLIGHT_DEPARTED));
        let departures: Vec<_> = options.iter().map(|o| o.departure_time).collect();
        let mut sorted = departures.clone();
        sorted.sort();
        assert_eq!(departures, sorted);
        // One row per ticket type for each sellable flight.
        assert_eq!(options.len(), 4);
    }

    #[tokio::test]
    async fn test_search_filters() {
        let (_store, service) = service();
        let req = FlightSearchRequest {
            origin: Some("new york".to_string()),
            destination: Some("LHR".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
            class: Some("Economy".to_string()),
        };
        let options = service.search(&req).await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].flight_id, seed::FLIGHT_JFK_LHR);
        assert_eq!(options[0].ticket_type, "Economy");
        assert_eq!(options[0].base_price, 10_000);
        assert_eq!(options[0].available_seats, 2);

        let none = FlightSearchRequest {
            date: NaiveDate::from_ymd_opt(2030, 1, 1),
            ..Default::default()
        };
        assert!(service.search(&none).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fully_booked_flight_disappears_from_search() {
        let (store, service) = service();
        book_committed(&store, seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await;

        let options = service.search(&FlightSearchRequest::default()).await.unwrap();
        let jfk: Vec<_> = options.iter().filter(|o| o.flight_id == seed::FLIGHT_JFK_LHR).collect();
        assert!(jfk.iter().all(|o| o.available_seats == 1));

        book_committed(&store, seed::FLIGHT_JFK_LHR, seed::SEAT_12B).await;
        let options = service.search(&FlightSearchRequest::default()).await.unwrap();
        assert!(options.iter().all(|o| o.flight_id != seed::FLIGHT_JFK_LHR));
    }

    #[tokio::test]
    async fn test_seat_map_flags_and_order() {
        let (store, service) = service();
        book_committed(&store, seed::FLIGHT_JFK_LHR, seed::SEAT_12B).await;

        let map = service.seat_map(seed::FLIGHT_JFK_LHR, None).await.unwrap();
        let numbers: Vec<_> = map.seats.iter().map(|s| s.seat_number.as_str()).collect();
        assert_eq!(numbers, vec!["12A", "12B"]);
        assert!(!map.seats[0].booked);
        assert!(map.seats[1].booked);

        // Same physical seat is free on another flight.
        let other = service.seat_map(seed::FLIGHT_DEPARTED, None).await.unwrap();
        assert!(other.seats.iter().all(|s| !s.booked));
    }

    #[tokio::test]
    async fn test_seat_map_class_filter_and_missing_flight() {
        let (_store, service) = service();
        let map = service.seat_map(seed::FLIGHT_LHR_DXB, Some("Business")).await.unwrap();
        assert_eq!(map.seats.len(), 2);
        assert!(map.seats.iter().all(|s| s.seat_class == "Business"));

        let err = service.seat_map(404, None).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_seat_map_never_materializes_ledger_rows() {
        let (store, service) = service();
        service.seat_map(seed::FLIGHT_JFK_LHR, None).await.unwrap();
        assert_eq!(store.ledger_row_count(), 0);
        assert!(service
            .ledger_status(seed::FLIGHT_JFK_LHR, seed::SEAT_12A)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_unknown_booking_is_not_found() {
        let (_store, service) = service();
        let err = service.booking(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
