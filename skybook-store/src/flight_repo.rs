use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use skybook_core::booking::BookingConfirmation;
use skybook_core::models::{BookingStatus, FlightSeat, FlightStatus};
use skybook_core::repository::InventoryReader;
use skybook_core::search::{like_pattern, FlightOption, FlightSearchRequest, SeatView};
use skybook_core::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::booking_repo::{ConfirmationRow, CONFIRMATION_QUERY};

pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightOptionRow {
    flight_id: i64,
    flight_number: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    flight_date: NaiveDate,
    origin_city: String,
    origin_code: String,
    destination_city: String,
    destination_code: String,
    aircraft_model: String,
    flight_status: String,
    ticket_type_id: i64,
    ticket_type: String,
    base_price: i64,
    available_seats: i64,
}

impl From<FlightOptionRow> for FlightOption {
    fn from(row: FlightOptionRow) -> Self {
        FlightOption {
            flight_id: row.flight_id,
            flight_number: row.flight_number,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            flight_date: row.flight_date,
            origin_city: row.origin_city,
            origin_code: row.origin_code,
            destination_city: row.destination_city,
            destination_code: row.destination_code,
            aircraft_model: row.aircraft_model,
            flight_status: row.flight_status,
            ticket_type_id: row.ticket_type_id,
            ticket_type: row.ticket_type,
            base_price: row.base_price,
            available_seats: row.available_seats,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SeatViewRow {
    seat_id: i64,
    seat_number: String,
    seat_class: String,
    booked: bool,
}

// Availability counts seats of the aircraft that have no booked ledger row
// for this flight; unmaterialized seats count as free.
const SEARCH_QUERY: &str = r#"
    SELECT * FROM (
        SELECT
            f.id AS flight_id,
            f.flight_number,
            f.departure_time,
            f.arrival_time,
            f.flight_date,
            orig.city AS origin_city,
            orig.iata_code AS origin_code,
            dest.city AS destination_city,
            dest.iata_code AS destination_code,
            a.model AS aircraft_model,
            fs.name AS flight_status,
            tt.id AS ticket_type_id,
            tt.name AS ticket_type,
            tt.base_fare AS base_price,
            (
                SELECT COUNT(*)
                FROM seats s
                WHERE s.aircraft_id = f.aircraft_id
                  AND NOT EXISTS (
                      SELECT 1 FROM flight_seats l
                      WHERE l.flight_id = f.id AND l.seat_id = s.id AND l.is_booked
                  )
            ) AS available_seats
        FROM flights f
        JOIN routes r ON f.route_id = r.id
        JOIN airports orig ON r.origin_airport_id = orig.id
        JOIN airports dest ON r.destination_airport_id = dest.id
        JOIN aircraft a ON f.aircraft_id = a.id
        JOIN flight_statuses fs ON f.status_id = fs.id
        CROSS JOIN ticket_types tt
        WHERE fs.name = ANY($1)
          AND ($2::text IS NULL OR orig.city ILIKE $2 OR orig.iata_code ILIKE $2 OR orig.airport_name ILIKE $2)
          AND ($3::text IS NULL OR dest.city ILIKE $3 OR dest.iata_code ILIKE $3 OR dest.airport_name ILIKE $3)
          AND ($4::date IS NULL OR f.flight_date = $4)
          AND ($5::text IS NULL OR tt.name = $5)
    ) AS candidates
    WHERE available_seats > 0
    ORDER BY departure_time, flight_id, ticket_type_id
"#;

#[async_trait]
impl InventoryReader for PostgresFlightRepository {
    async fn search_availability(&self, req: &FlightSearchRequest) -> CoreResult<Vec<FlightOption>> {
        let sellable: Vec<String> = FlightStatus::SELLABLE
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let rows = sqlx::query_as::<_, FlightOptionRow>(SEARCH_QUERY)
            .bind(sellable)
            .bind(req.origin.as_deref().map(like_pattern))
            .bind(req.destination.as_deref().map(like_pattern))
            .bind(req.date)
            .bind(req.class.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(CoreError::storage)?;

        Ok(rows.into_iter().map(FlightOption::from).collect())
    }

    async fn aircraft_seats(
        &self,
        flight_id: i64,
        aircraft_id: i64,
        class: Option<&str>,
    ) -> CoreResult<Vec<SeatView>> {
        let rows = sqlx::query_as::<_, SeatViewRow>(
            r#"
            SELECT s.id AS seat_id, s.seat_number, s.seat_class,
                   COALESCE(l.is_booked, FALSE) AS booked
            FROM seats s
            LEFT JOIN flight_seats l ON l.seat_id = s.id AND l.flight_id = $1
            WHERE s.aircraft_id = $2
              AND ($3::text IS NULL OR s.seat_class = $3)
            ORDER BY s.seat_number, s.id
            "#,
        )
        .bind(flight_id)
        .bind(aircraft_id)
        .bind(class)
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(rows
            .into_iter()
            .map(|r| SeatView {
                seat_id: r.seat_id,
                seat_number: r.seat_number,
                seat_class: r.seat_class,
                booked: r.booked,
            })
            .collect())
    }

    async fn ledger_entry(&self, flight_id: i64, seat_id: i64) -> CoreResult<Option<FlightSeat>> {
        let row: Option<(bool,)> = sqlx::query_as(
            "SELECT is_booked FROM flight_seats WHERE flight_id = $1 AND seat_id = $2",
        )
        .bind(flight_id)
        .bind(seat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(row.map(|(booked,)| FlightSeat { flight_id, seat_id, booked }))
    }

    async fn find_confirmation(&self, booking_id: Uuid) -> CoreResult<Option<BookingConfirmation>> {
        let row = sqlx::query_as::<_, ConfirmationRow>(CONFIRMATION_QUERY)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(CoreError::storage)?;

        let confirmation = row.map(ConfirmationRow::into_confirmation).transpose()?;
        Ok(confirmation.filter(|c| c.status == BookingStatus::Confirmed))
    }
}
