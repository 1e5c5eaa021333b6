//! In-memory implementation of the storage traits.
//!
//! Used by tests and by local runs without PostgreSQL. Semantics follow the
//! PostgreSQL store: a claim is a single conditional transition taken under
//! the store lock, unit writes stay private until `commit`, and dropping a
//! unit without committing releases its claims and discards its rows. One
//! difference: a seat claimed by a unit that has not yet committed is
//! reported as unavailable instead of blocking until that unit finishes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use skybook_core::booking::BookingConfirmation;
use skybook_core::models::{
    Aircraft, Airport, Booking, BookingSeat, BookingStatus, Flight, FlightSeat, PassengerIdentity,
    PaymentMethod, Route, Seat, TicketType,
};
use skybook_core::payment::Payment;
use skybook_core::repository::{BookingStore, BookingUnit, InventoryReader, ReferenceData};
use skybook_core::search::{FlightOption, FlightSearchRequest, SeatView};
use skybook_core::{CoreError, CoreResult};
use tracing::debug;
use uuid::Uuid;

/// Step at which an injected storage fault fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    Begin,
    EnsureEntry,
    Claim,
    InsertBooking,
    LinkSeat,
    InsertPayment,
    ConfirmBooking,
    Commit,
}

#[derive(Debug, Clone, Copy)]
struct LedgerRow {
    booked: bool,
    claimed_by: Option<u64>,
}

#[derive(Default)]
struct State {
    airports: BTreeMap<i64, Airport>,
    routes: BTreeMap<i64, Route>,
    aircraft: BTreeMap<i64, Aircraft>,
    flights: BTreeMap<i64, Flight>,
    seats: BTreeMap<i64, Seat>,
    ticket_types: BTreeMap<i64, TicketType>,
    passengers: BTreeMap<i64, PassengerIdentity>,
    payment_methods: BTreeMap<i64, PaymentMethod>,
    ledger: HashMap<(i64, i64), LedgerRow>,
    bookings: HashMap<Uuid, Booking>,
    booking_seats: HashMap<Uuid, BookingSeat>,
    payments: HashMap<Uuid, Payment>,
    faults: HashSet<FaultPoint>,
    next_unit: u64,
}

impl State {
    fn is_booked(&self, flight_id: i64, seat_id: i64) -> bool {
        self.ledger
            .get(&(flight_id, seat_id))
            .map_or(false, |row| row.booked)
    }

    fn fault(&self, point: FaultPoint) -> CoreResult<()> {
        if self.faults.contains(&point) {
            return Err(CoreError::StorageFault(format!("injected fault at {:?}", point)));
        }
        Ok(())
    }

    fn confirmation(
        &self,
        booking: &Booking,
        link: &BookingSeat,
        payment: &Payment,
    ) -> Option<BookingConfirmation> {
        let passenger = self.passengers.get(&booking.passenger_id)?;
        let flight = self.flights.get(&booking.flight_id)?;
        let seat = self.seats.get(&link.seat_id)?;
        let ticket_type = self.ticket_types.get(&booking.ticket_type_id)?;

        Some(BookingConfirmation {
            booking_id: booking.id,
            booking_date: booking.created_at,
            status: booking.status,
            total_amount: booking.total_amount,
            first_name: passenger.first_name.clone(),
            last_name: passenger.last_name.clone(),
            email: passenger.email.clone(),
            flight_number: flight.flight_number.clone(),
            seat_number: seat.seat_number.clone(),
            ticket_type: ticket_type.name.clone(),
            transaction_id: payment.transaction_id.clone(),
        })
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    pub fn add_airport(&self, airport: Airport) {
        self.state().airports.insert(airport.id, airport);
    }

    pub fn add_route(&self, route: Route) {
        self.state().routes.insert(route.id, route);
    }

    pub fn add_aircraft(&self, aircraft: Aircraft) {
        self.state().aircraft.insert(aircraft.id, aircraft);
    }

    pub fn add_flight(&self, flight: Flight) {
        self.state().flights.insert(flight.id, flight);
    }

    pub fn add_seat(&self, seat: Seat) {
        self.state().seats.insert(seat.id, seat);
    }

    pub fn add_ticket_type(&self, ticket_type: TicketType) {
        self.state().ticket_types.insert(ticket_type.id, ticket_type);
    }

    pub fn remove_ticket_type(&self, id: i64) {
        self.state().ticket_types.remove(&id);
    }

    pub fn add_passenger(&self, passenger: PassengerIdentity) {
        self.state().passengers.insert(passenger.id, passenger);
    }

    pub fn add_payment_method(&self, method: PaymentMethod) {
        self.state().payment_methods.insert(method.id, method);
    }

    /// Makes every subsequent operation at `point` fail with `StorageFault`.
    pub fn inject_fault(&self, point: FaultPoint) {
        self.state().faults.insert(point);
    }

    pub fn clear_faults(&self) {
        self.state().faults.clear();
    }

    pub fn ledger_row_count(&self) -> usize {
        self.state().ledger.len()
    }

    pub fn booked_count(&self, flight_id: i64, seat_id: i64) -> usize {
        let state = self.state();
        state
            .ledger
            .iter()
            .filter(|((f, s), row)| *f == flight_id && *s == seat_id && row.booked)
            .count()
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.state().bookings.values().cloned().collect()
    }

    pub fn booking_seat_count(&self) -> usize {
        self.state().booking_seats.len()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.state().payments.values().cloned().collect()
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ReferenceData for InMemoryStore {
    async fn resolve_passenger(&self, id: i64) -> CoreResult<Option<PassengerIdentity>> {
        Ok(self.state().passengers.get(&id).cloned())
    }

    async fn resolve_flight(&self, id: i64) -> CoreResult<Option<Flight>> {
        Ok(self.state().flights.get(&id).cloned())
    }

    async fn resolve_seat(&self, id: i64) -> CoreResult<Option<Seat>> {
        Ok(self.state().seats.get(&id).cloned())
    }

    async fn resolve_ticket_type(&self, id: i64) -> CoreResult<Option<TicketType>> {
        Ok(self.state().ticket_types.get(&id).cloned())
    }

    async fn resolve_payment_method(&self, id: i64) -> CoreResult<bool> {
        Ok(self.state().payment_methods.contains_key(&id))
    }
}

#[async_trait]
impl InventoryReader for InMemoryStore {
    async fn search_availability(&self, req: &FlightSearchRequest) -> CoreResult<Vec<FlightOption>> {
        let state = self.state();
        let mut options = Vec::new();

        for flight in state.flights.values().filter(|f| f.status.is_sellable()) {
            if !req.matches_date(flight.flight_date) {
                continue;
            }
            let route = match state.routes.get(&flight.route_id) {
                Some(r) => r,
                None => continue,
            };
            let (origin, destination) = match (
                state.airports.get(&route.origin_airport_id),
                state.airports.get(&route.destination_airport_id),
            ) {
                (Some(o), Some(d)) => (o, d),
                _ => continue,
            };
            if !req.matches_origin(origin) || !req.matches_destination(destination) {
                continue;
            }
            let aircraft_model = state
                .aircraft
                .get(&flight.aircraft_id)
                .map(|a| a.model.clone())
                .unwrap_or_default();

            let available = state
                .seats
                .values()
                .filter(|s| s.aircraft_id == flight.aircraft_id)
                .filter(|s| !state.is_booked(flight.id, s.id))
                .count() as i64;
            if available == 0 {
                continue;
            }

            for ticket_type in state.ticket_types.values().filter(|t| req.matches_class(&t.name)) {
                options.push(FlightOption {
                    flight_id: flight.id,
                    flight_number: flight.flight_number.clone(),
                    departure_time: flight.departure_time,
                    arrival_time: flight.arrival_time,
                    flight_date: flight.flight_date,
                    origin_city: origin.city.clone(),
                    origin_code: origin.iata_code.clone(),
                    destination_city: destination.city.clone(),
                    destination_code: destination.iata_code.clone(),
                    aircraft_model: aircraft_model.clone(),
                    flight_status: flight.status.to_string(),
                    ticket_type_id: ticket_type.id,
                    ticket_type: ticket_type.name.clone(),
                    base_price: ticket_type.base_fare,
                    available_seats: available,
                });
            }
        }

        options.sort_by(|a, b| {
            a.departure_time
                .cmp(&b.departure_time)
                .then(a.flight_id.cmp(&b.flight_id))
                .then(a.ticket_type_id.cmp(&b.ticket_type_id))
        });
        Ok(options)
    }

    async fn aircraft_seats(
        &self,
        flight_id: i64,
        aircraft_id: i64,
        class: Option<&str>,
    ) -> CoreResult<Vec<SeatView>> {
        let state = self.state();
        let mut seats: Vec<SeatView> = state
            .seats
            .values()
            .filter(|s| s.aircraft_id == aircraft_id)
            .filter(|s| class.map_or(true, |c| s.seat_class == c))
            .map(|s| SeatView {
                seat_id: s.id,
                seat_number: s.seat_number.clone(),
                seat_class: s.seat_class.clone(),
                booked: state.is_booked(flight_id, s.id),
            })
            .collect();
        seats.sort_by(|a, b| a.seat_number.cmp(&b.seat_number).then(a.seat_id.cmp(&b.seat_id)));
        Ok(seats)
    }

    async fn ledger_entry(&self, flight_id: i64, seat_id: i64) -> CoreResult<Option<FlightSeat>> {
        Ok(self
            .state()
            .ledger
            .get(&(flight_id, seat_id))
            .map(|row| FlightSeat {
                flight_id,
                seat_id,
                booked: row.booked,
            }))
    }

    async fn find_confirmation(&self, booking_id: Uuid) -> CoreResult<Option<BookingConfirmation>> {
        let state = self.state();
        let booking = match state.bookings.get(&booking_id) {
            Some(b) if b.status == BookingStatus::Confirmed => b,
            _ => return Ok(None),
        };
        let link = state.booking_seats.get(&booking_id);
        let payment = state.payments.get(&booking_id);
        Ok(match (link, payment) {
            (Some(link), Some(payment)) => state.confirmation(booking, link, payment),
            _ => None,
        })
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn begin(&self) -> CoreResult<Box<dyn BookingUnit>> {
        let mut state = self.state();
        state.fault(FaultPoint::Begin)?;
        state.next_unit += 1;
        let id = state.next_unit;
        drop(state);

        Ok(Box::new(MemoryUnit {
            id,
            state: self.state.clone(),
            claims: Vec::new(),
            bookings: Vec::new(),
            booking_seats: Vec::new(),
            payments: Vec::new(),
            finished: false,
        }))
    }
}

/// Unit of work over [`InMemoryStore`]. Claims are recorded on the shared
/// ledger immediately (so rival units see the seat as taken) but only turn
/// into `booked` on commit.
pub struct MemoryUnit {
    id: u64,
    state: Arc<Mutex<State>>,
    claims: Vec<(i64, i64)>,
    bookings: Vec<Booking>,
    booking_seats: Vec<BookingSeat>,
    payments: Vec<Payment>,
    finished: bool,
}

impl MemoryUnit {
    fn release(&mut self) {
        let mut state = lock(&self.state);
        for key in self.claims.drain(..) {
            if let Some(row) = state.ledger.get_mut(&key) {
                if row.claimed_by == Some(self.id) {
                    row.claimed_by = None;
                }
            }
        }
        self.bookings.clear();
        self.booking_seats.clear();
        self.payments.clear();
        self.finished = true;
    }

    fn staged_booking(&self, booking_id: Uuid) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == booking_id)
    }
}

#[async_trait]
impl BookingUnit for MemoryUnit {
    async fn ensure_entry(&mut self, flight_id: i64, seat_id: i64) -> CoreResult<()> {
        let mut state = lock(&self.state);
        state.fault(FaultPoint::EnsureEntry)?;
        state.ledger.entry((flight_id, seat_id)).or_insert(LedgerRow {
            booked: false,
            claimed_by: None,
        });
        Ok(())
    }

    async fn try_claim(&mut self, flight_id: i64, seat_id: i64) -> CoreResult<bool> {
        let mut state = lock(&self.state);
        state.fault(FaultPoint::Claim)?;
        let row = match state.ledger.get_mut(&(flight_id, seat_id)) {
            Some(row) => row,
            None => return Ok(false),
        };
        if row.booked || row.claimed_by.is_some() {
            return Ok(false);
        }
        row.claimed_by = Some(self.id);
        self.claims.push((flight_id, seat_id));
        Ok(true)
    }

    async fn insert_booking(&mut self, booking: &Booking) -> CoreResult<()> {
        let state = lock(&self.state);
        state.fault(FaultPoint::InsertBooking)?;
        if state.bookings.contains_key(&booking.id) || self.staged_booking(booking.id).is_some() {
            return Err(CoreError::StorageFault(format!("duplicate booking id {}", booking.id)));
        }
        drop(state);
        self.bookings.push(booking.clone());
        Ok(())
    }

    async fn link_seat(&mut self, link: &BookingSeat) -> CoreResult<()> {
        lock(&self.state).fault(FaultPoint::LinkSeat)?;
        if self.staged_booking(link.booking_id).is_none() {
            return Err(CoreError::StorageFault(format!(
                "booking {} does not exist",
                link.booking_id
            )));
        }
        if self.booking_seats.iter().any(|l| l.booking_id == link.booking_id) {
            return Err(CoreError::StorageFault(format!(
                "booking {} already has a seat",
                link.booking_id
            )));
        }
        self.booking_seats.push(*link);
        Ok(())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> CoreResult<()> {
        let state = lock(&self.state);
        state.fault(FaultPoint::InsertPayment)?;
        let duplicate_txn = state
            .payments
            .values()
            .chain(self.payments.iter())
            .any(|p| p.transaction_id == payment.transaction_id);
        if duplicate_txn {
            return Err(CoreError::StorageFault(format!(
                "duplicate transaction id {}",
                payment.transaction_id
            )));
        }
        drop(state);
        if self.staged_booking(payment.booking_id).is_none() {
            return Err(CoreError::StorageFault(format!(
                "booking {} does not exist",
                payment.booking_id
            )));
        }
        self.payments.push(payment.clone());
        Ok(())
    }

    async fn confirm_booking(&mut self, booking_id: Uuid) -> CoreResult<()> {
        lock(&self.state).fault(FaultPoint::ConfirmBooking)?;
        let booking = self
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| CoreError::StorageFault(format!("booking {} does not exist", booking_id)))?;
        booking.status = BookingStatus::Confirmed;
        Ok(())
    }

    async fn load_confirmation(&mut self, booking_id: Uuid) -> CoreResult<Option<BookingConfirmation>> {
        let state = lock(&self.state);
        let booking = match self.staged_booking(booking_id) {
            Some(b) => b,
            None => return Ok(None),
        };
        let link = self.booking_seats.iter().find(|l| l.booking_id == booking_id);
        let payment = self.payments.iter().find(|p| p.booking_id == booking_id);
        Ok(match (link, payment) {
            (Some(link), Some(payment)) => state.confirmation(booking, link, payment),
            _ => None,
        })
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        let mut this = self;
        {
            let mut state = lock(&this.state);
            state.fault(FaultPoint::Commit)?;

            for key in &this.claims {
                if let Some(row) = state.ledger.get_mut(key) {
                    row.booked = true;
                    row.claimed_by = None;
                }
            }
            for booking in this.bookings.drain(..) {
                state.bookings.insert(booking.id, booking);
            }
            for link in this.booking_seats.drain(..) {
                state.booking_seats.insert(link.booking_id, link);
            }
            for payment in this.payments.drain(..) {
                state.payments.insert(payment.booking_id, payment);
            }
        }
        this.claims.clear();
        this.finished = true;
        debug!("Memory unit {} committed", this.id);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> CoreResult<()> {
        let mut this = self;
        this.release();
        debug!("Memory unit {} rolled back", this.id);
        Ok(())
    }
}

impl Drop for MemoryUnit {
    fn drop(&mut self) {
        if !self.finished {
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        seed::seed_demo(&store);
        store
    }

    #[tokio::test]
    async fn test_ensure_entry_is_idempotent() {
        let store = store();
        for _ in 0..3 {
            let mut unit = store.begin().await.unwrap();
            unit.ensure_entry(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap();
            unit.ensure_entry(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap();
            unit.rollback().await.unwrap();
        }
        assert_eq!(store.ledger_row_count(), 1);
    }

    #[tokio::test]
    async fn test_second_claim_loses() {
        let store = store();
        let mut first = store.begin().await.unwrap();
        first.ensure_entry(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap();
        assert!(first.try_claim(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap());

        let mut second = store.begin().await.unwrap();
        second.ensure_entry(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap();
        assert!(!second.try_claim(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap());

        first.commit().await.unwrap();
        assert!(!second.try_claim(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap());
        assert_eq!(store.booked_count(seed::FLIGHT_JFK_LHR, seed::SEAT_12A), 1);
    }

    #[tokio::test]
    async fn test_uncommitted_claim_is_invisible_to_readers() {
        let store = store();
        let mut unit = store.begin().await.unwrap();
        unit.ensure_entry(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap();
        assert!(unit.try_claim(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap());

        let entry = store
            .ledger_entry(seed::FLIGHT_JFK_LHR, seed::SEAT_12A)
            .await
            .unwrap()
            .unwrap();
        assert!(!entry.booked);
        unit.commit().await.unwrap();

        let entry = store
            .ledger_entry(seed::FLIGHT_JFK_LHR, seed::SEAT_12A)
            .await
            .unwrap()
            .unwrap();
        assert!(entry.booked);
    }

    #[tokio::test]
    async fn test_dropped_unit_releases_claim() {
        let store = store();
        {
            let mut unit = store.begin().await.unwrap();
            unit.ensure_entry(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap();
            assert!(unit.try_claim(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap());
        }
        let mut unit = store.begin().await.unwrap();
        assert!(unit.try_claim(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_nothing_behind() {
        let store = store();
        store.inject_fault(FaultPoint::Commit);
        let mut unit = store.begin().await.unwrap();
        unit.ensure_entry(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap();
        assert!(unit.try_claim(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap());
        assert!(matches!(unit.commit().await, Err(CoreError::StorageFault(_))));

        store.clear_faults();
        assert_eq!(store.booked_count(seed::FLIGHT_JFK_LHR, seed::SEAT_12A), 0);
        let mut retry = store.begin().await.unwrap();
        assert!(retry.try_claim(seed::FLIGHT_JFK_LHR, seed::SEAT_12A).await.unwrap());
    }
}
