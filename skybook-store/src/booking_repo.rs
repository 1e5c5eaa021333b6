use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skybook_core::booking::BookingConfirmation;
use skybook_core::models::{Booking, BookingSeat, BookingStatus};
use skybook_core::payment::Payment;
use skybook_core::repository::{BookingStore, BookingUnit};
use skybook_core::{CoreError, CoreResult};
use skybook_shared::Masked;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

pub(crate) const CONFIRMATION_QUERY: &str = r#"
    SELECT
        b.id AS booking_id,
        b.created_at AS booking_date,
        b.status,
        b.total_amount,
        p.first_name,
        p.last_name,
        p.email,
        f.flight_number,
        s.seat_number,
        tt.name AS ticket_type,
        pay.transaction_id
    FROM bookings b
    JOIN passengers p ON b.passenger_id = p.id
    JOIN flights f ON b.flight_id = f.id
    JOIN booking_seats bs ON b.id = bs.booking_id
    JOIN seats s ON bs.seat_id = s.id
    JOIN ticket_types tt ON b.ticket_type_id = tt.id
    JOIN payments pay ON b.id = pay.booking_id
    WHERE b.id = $1
"#;

#[derive(sqlx::FromRow)]
pub(crate) struct ConfirmationRow {
    booking_id: Uuid,
    booking_date: DateTime<Utc>,
    status: String,
    total_amount: i64,
    first_name: String,
    last_name: String,
    email: Option<String>,
    flight_number: String,
    seat_number: String,
    ticket_type: String,
    transaction_id: String,
}

impl ConfirmationRow {
    pub(crate) fn into_confirmation(self) -> CoreResult<BookingConfirmation> {
        let status: BookingStatus = self.status.parse().map_err(CoreError::StorageFault)?;
        Ok(BookingConfirmation {
            booking_id: self.booking_id,
            booking_date: self.booking_date,
            status,
            total_amount: self.total_amount,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email.map(Masked::new),
            flight_number: self.flight_number,
            seat_number: self.seat_number,
            ticket_type: self.ticket_type,
            transaction_id: self.transaction_id,
        })
    }
}

/// Opens one pooled transaction per booking attempt.
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PostgresBookingRepository {
    async fn begin(&self) -> CoreResult<Box<dyn BookingUnit>> {
        let tx = self.pool.begin().await.map_err(CoreError::storage)?;
        Ok(Box::new(PostgresBookingUnit { tx }))
    }
}

/// A booking attempt's transaction. Dropping it without `commit` rolls back,
/// which returns the connection to the pool with nothing applied.
pub struct PostgresBookingUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BookingUnit for PostgresBookingUnit {
    async fn ensure_entry(&mut self, flight_id: i64, seat_id: i64) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO flight_seats (flight_id, seat_id, is_booked)
            VALUES ($1, $2, FALSE)
            ON CONFLICT (flight_id, seat_id) DO NOTHING
            "#,
        )
        .bind(flight_id)
        .bind(seat_id)
        .execute(&mut *self.tx)
        .await
        .map_err(CoreError::storage)?;
        Ok(())
    }

    async fn try_claim(&mut self, flight_id: i64, seat_id: i64) -> CoreResult<bool> {
        // Conditional update: concurrent claimers serialize on the row lock
        // and re-check `is_booked` once the winner commits.
        let result = sqlx::query(
            r#"
            UPDATE flight_seats SET is_booked = TRUE
            WHERE flight_id = $1 AND seat_id = $2 AND is_booked = FALSE
            "#,
        )
        .bind(flight_id)
        .bind(seat_id)
        .execute(&mut *self.tx)
        .await
        .map_err(CoreError::storage)?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_booking(&mut self, booking: &Booking) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, passenger_id, flight_id, ticket_type_id, status, total_amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id)
        .bind(booking.passenger_id)
        .bind(booking.flight_id)
        .bind(booking.ticket_type_id)
        .bind(booking.status.as_str())
        .bind(booking.total_amount)
        .bind(booking.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(CoreError::storage)?;
        Ok(())
    }

    async fn link_seat(&mut self, link: &BookingSeat) -> CoreResult<()> {
        sqlx::query("INSERT INTO booking_seats (booking_id, seat_id) VALUES ($1, $2)")
            .bind(link.booking_id)
            .bind(link.seat_id)
            .execute(&mut *self.tx)
            .await
            .map_err(CoreError::storage)?;
        Ok(())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (booking_id, amount, payment_method_id, transaction_id, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(payment.booking_id)
        .bind(payment.amount)
        .bind(payment.payment_method_id)
        .bind(&payment.transaction_id)
        .bind(payment.status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(CoreError::storage)?;
        Ok(())
    }

    async fn confirm_booking(&mut self, booking_id: Uuid) -> CoreResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(BookingStatus::Confirmed.as_str())
            .bind(booking_id)
            .execute(&mut *self.tx)
            .await
            .map_err(CoreError::storage)?;

        if result.rows_affected() != 1 {
            return Err(CoreError::StorageFault(format!("booking {} vanished before confirmation", booking_id)));
        }
        Ok(())
    }

    async fn load_confirmation(&mut self, booking_id: Uuid) -> CoreResult<Option<BookingConfirmation>> {
        let row = sqlx::query_as::<_, ConfirmationRow>(CONFIRMATION_QUERY)
            .bind(booking_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(CoreError::storage)?;

        row.map(ConfirmationRow::into_confirmation).transpose()
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        self.tx.commit().await.map_err(CoreError::storage)?;
        debug!("Booking transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> CoreResult<()> {
        self.tx.rollback().await.map_err(CoreError::storage)?;
        debug!("Booking transaction rolled back");
        Ok(())
    }
}
