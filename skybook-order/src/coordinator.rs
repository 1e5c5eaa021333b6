use std::sync::Arc;

use chrono::Utc;
use skybook_catalog::FareResolver;
use skybook_core::booking::{BookingConfirmation, CreateBookingRequest, SeatRequest};
use skybook_core::models::{Booking, BookingSeat, BookingStatus};
use skybook_core::payment::Payment;
use skybook_core::repository::{BookingStore, BookingUnit, ReferenceData};
use skybook_core::{CoreError, CoreResult};
use skybook_shared::format_cents;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::{BookingAttempt, BookingState};

/// Turns a seat request into a confirmed booking inside one unit of work.
/// Either every row (ledger claim, booking, seat link, payment) is
/// committed together or none of them is.
pub struct BookingCoordinator {
    store: Arc<dyn BookingStore>,
    reference: Arc<dyn ReferenceData>,
    fares: FareResolver,
}

impl BookingCoordinator {
    pub fn new(store: Arc<dyn BookingStore>, reference: Arc<dyn ReferenceData>) -> Self {
        let fares = FareResolver::new(reference.clone());
        Self {
            store,
            reference,
            fares,
        }
    }

    pub async fn create_booking(&self, req: &CreateBookingRequest) -> CoreResult<BookingConfirmation> {
        let mut attempt = BookingAttempt::new();
        let result = self.execute(&mut attempt, req).await;

        if let Err(err) = &result {
            let reached = attempt.state();
            let _ = attempt.abort();
            debug!("Booking attempt aborted after {:?}", reached);
            match err {
                CoreError::StorageFault(msg) => error!("Booking aborted on storage fault: {}", msg),
                CoreError::SeatUnavailable { flight_id, seat_id } => {
                    info!("Seat {} on flight {} is no longer available", seat_id, flight_id)
                }
                other => debug!("Booking rejected: {}", other),
            }
        }

        result
    }

    async fn execute(
        &self,
        attempt: &mut BookingAttempt,
        req: &CreateBookingRequest,
    ) -> CoreResult<BookingConfirmation> {
        let request = req.validate()?;
        self.resolve_references(&request).await?;
        attempt.advance(BookingState::Validated)?;

        let mut unit = self.store.begin().await?;
        match self.run_unit(unit.as_mut(), attempt, &request).await {
            Ok(confirmation) => {
                unit.commit().await?;
                attempt.advance(BookingState::Confirmed)?;
                info!(
                    "Booking {} confirmed: flight {} seat {} total {}",
                    confirmation.booking_id,
                    request.flight_id,
                    request.seat_id,
                    format_cents(confirmation.total_amount)
                );
                Ok(confirmation)
            }
            Err(err) => {
                if let Err(rollback_err) = unit.rollback().await {
                    error!("Rollback failed for flight {} seat {}: {}", request.flight_id, request.seat_id, rollback_err);
                }
                Err(err)
            }
        }
    }

    /// Every referenced row must exist before anything is written.
    async fn resolve_references(&self, request: &SeatRequest) -> CoreResult<()> {
        self.reference
            .resolve_passenger(request.passenger_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("passenger {}", request.passenger_id)))?;

        let flight = self
            .reference
            .resolve_flight(request.flight_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("flight {}", request.flight_id)))?;
        if !flight.status.is_sellable() {
            return Err(CoreError::InvalidRequest(format!(
                "flight {} is {} and cannot be booked",
                flight.flight_number, flight.status
            )));
        }

        let seat = self
            .reference
            .resolve_seat(request.seat_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("seat {}", request.seat_id)))?;
        if seat.aircraft_id != flight.aircraft_id {
            return Err(CoreError::NotFound(format!(
                "seat {} is not on flight {}",
                request.seat_id, request.flight_id
            )));
        }

        self.reference
            .resolve_ticket_type(request.ticket_type_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("ticket type {}", request.ticket_type_id)))?;

        if !self
            .reference
            .resolve_payment_method(request.payment_method_id)
            .await?
        {
            return Err(CoreError::NotFound(format!(
                "payment method {}",
                request.payment_method_id
            )));
        }

        Ok(())
    }

    async fn run_unit(
        &self,
        unit: &mut dyn BookingUnit,
        attempt: &mut BookingAttempt,
        request: &SeatRequest,
    ) -> CoreResult<BookingConfirmation> {
        unit.ensure_entry(request.flight_id, request.seat_id).await?;
        if !unit.try_claim(request.flight_id, request.seat_id).await? {
            return Err(CoreError::SeatUnavailable {
                flight_id: request.flight_id,
                seat_id: request.seat_id,
            });
        }
        attempt.advance(BookingState::SeatClaimed)?;

        let total_amount = self.fares.total_fare(request.ticket_type_id).await?;
        attempt.advance(BookingState::Priced)?;

        let booking = Booking {
            id: Uuid::new_v4(),
            passenger_id: request.passenger_id,
            flight_id: request.flight_id,
            ticket_type_id: request.ticket_type_id,
            status: BookingStatus::Pending,
            total_amount,
            created_at: Utc::now(),
        };
        unit.insert_booking(&booking).await?;
        unit.link_seat(&BookingSeat {
            booking_id: booking.id,
            seat_id: request.seat_id,
        })
        .await?;
        attempt.advance(BookingState::Recorded)?;

        let payment = Payment::completed(booking.id, total_amount, request.payment_method_id, Utc::now());
        unit.insert_payment(&payment).await?;
        attempt.advance(BookingState::PaymentRecorded)?;

        unit.confirm_booking(booking.id).await?;
        debug!("Booking {} recorded with transaction {}", booking.id, payment.transaction_id);

        unit.load_confirmation(booking.id).await?.ok_or_else(|| {
            CoreError::StorageFault(format!("booking {} missing after confirmation", booking.id))
        })
    }
}
