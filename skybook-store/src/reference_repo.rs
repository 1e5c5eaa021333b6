use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use skybook_core::models::{Flight, FlightStatus, PassengerIdentity, Seat, TicketType};
use skybook_core::repository::ReferenceData;
use skybook_core::{CoreError, CoreResult};
use skybook_shared::Masked;
use sqlx::PgPool;

/// Reads the tables owned by the profile, schedule and fare subsystems.
pub struct PostgresReferenceRepository {
    pool: PgPool,
}

impl PostgresReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: Option<String>,
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i64,
    flight_number: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    flight_date: NaiveDate,
    route_id: i64,
    aircraft_id: i64,
    status: String,
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    id: i64,
    seat_number: String,
    seat_class: String,
    aircraft_id: i64,
}

#[derive(sqlx::FromRow)]
struct TicketTypeRow {
    id: i64,
    name: String,
    base_fare: i64,
}

#[async_trait]
impl ReferenceData for PostgresReferenceRepository {
    async fn resolve_passenger(&self, id: i64) -> CoreResult<Option<PassengerIdentity>> {
        let row = sqlx::query_as::<_, PassengerRow>(
            "SELECT id, first_name, last_name, email FROM passengers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(row.map(|r| PassengerIdentity {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email.map(Masked::new),
        }))
    }

    async fn resolve_flight(&self, id: i64) -> CoreResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(
            r#"
            SELECT f.id, f.flight_number, f.departure_time, f.arrival_time, f.flight_date,
                   f.route_id, f.aircraft_id, fs.name AS status
            FROM flights f
            JOIN flight_statuses fs ON f.status_id = fs.id
            WHERE f.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        row.map(|r| {
            let status: FlightStatus = r.status.parse().map_err(CoreError::StorageFault)?;
            Ok(Flight {
                id: r.id,
                flight_number: r.flight_number,
                departure_time: r.departure_time,
                arrival_time: r.arrival_time,
                flight_date: r.flight_date,
                route_id: r.route_id,
                aircraft_id: r.aircraft_id,
                status,
            })
        })
        .transpose()
    }

    async fn resolve_seat(&self, id: i64) -> CoreResult<Option<Seat>> {
        let row = sqlx::query_as::<_, SeatRow>(
            "SELECT id, seat_number, seat_class, aircraft_id FROM seats WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(row.map(|r| Seat {
            id: r.id,
            seat_number: r.seat_number,
            seat_class: r.seat_class,
            aircraft_id: r.aircraft_id,
        }))
    }

    async fn resolve_ticket_type(&self, id: i64) -> CoreResult<Option<TicketType>> {
        let row = sqlx::query_as::<_, TicketTypeRow>(
            "SELECT id, name, base_fare FROM ticket_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(row.map(|r| TicketType {
            id: r.id,
            name: r.name,
            base_fare: r.base_fare,
        }))
    }

    async fn resolve_payment_method(&self, id: i64) -> CoreResult<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM payment_methods WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(CoreError::storage)?;
        Ok(exists)
    }
}
