use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::BookingConfirmation;
use crate::models::{Booking, BookingSeat, Flight, FlightSeat, PassengerIdentity, Seat, TicketType};
use crate::payment::Payment;
use crate::search::{FlightOption, FlightSearchRequest, SeatView};
use crate::CoreResult;

/// Lookups served by the subsystems that own passengers, flights, fares
/// and payment methods. `None` means the referenced row does not exist.
#[async_trait]
pub trait ReferenceData: Send + Sync {
    async fn resolve_passenger(&self, id: i64) -> CoreResult<Option<PassengerIdentity>>;

    async fn resolve_flight(&self, id: i64) -> CoreResult<Option<Flight>>;

    async fn resolve_seat(&self, id: i64) -> CoreResult<Option<Seat>>;

    async fn resolve_ticket_type(&self, id: i64) -> CoreResult<Option<TicketType>>;

    async fn resolve_payment_method(&self, id: i64) -> CoreResult<bool>;
}

/// Read-only projections over the seat ledger. Nothing here claims or
/// materializes ledger rows.
#[async_trait]
pub trait InventoryReader: Send + Sync {
    /// Sellable (flight, ticket type) pairs with at least one free seat,
    /// ordered by departure time.
    async fn search_availability(
        &self,
        req: &FlightSearchRequest,
    ) -> CoreResult<Vec<FlightOption>>;

    /// Every seat of `aircraft_id`, flagged as booked for `flight_id`,
    /// ordered by seat number.
    async fn aircraft_seats(
        &self,
        flight_id: i64,
        aircraft_id: i64,
        class: Option<&str>,
    ) -> CoreResult<Vec<SeatView>>;

    async fn ledger_entry(&self, flight_id: i64, seat_id: i64) -> CoreResult<Option<FlightSeat>>;

    async fn find_confirmation(&self, booking_id: Uuid) -> CoreResult<Option<BookingConfirmation>>;
}

/// Opens atomic units of work against the shared store.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn begin(&self) -> CoreResult<Box<dyn BookingUnit>>;
}

/// One all-or-nothing unit of work. Writes become visible to other units
/// only on `commit`; dropping the unit without committing discards them.
#[async_trait]
pub trait BookingUnit: Send {
    /// Inserts a free ledger row for (flight, seat) unless one exists.
    async fn ensure_entry(&mut self, flight_id: i64, seat_id: i64) -> CoreResult<()>;

    /// Flips the ledger row from free to booked in one conditional step.
    /// `Ok(false)` means another caller already holds the seat.
    async fn try_claim(&mut self, flight_id: i64, seat_id: i64) -> CoreResult<bool>;

    async fn insert_booking(&mut self, booking: &Booking) -> CoreResult<()>;

    async fn link_seat(&mut self, link: &BookingSeat) -> CoreResult<()>;

    async fn insert_payment(&mut self, payment: &Payment) -> CoreResult<()>;

    async fn confirm_booking(&mut self, booking_id: Uuid) -> CoreResult<()>;

    /// Reads the joined view of a booking, including this unit's own writes.
    async fn load_confirmation(&mut self, booking_id: Uuid) -> CoreResult<Option<BookingConfirmation>>;

    async fn commit(self: Box<Self>) -> CoreResult<()>;

    async fn rollback(self: Box<Self>) -> CoreResult<()>;
}
