//! Demo reference data for local runs and tests.

use chrono::{NaiveDate, TimeZone, Utc};
use skybook_core::models::{
    Aircraft, Airport, Flight, FlightStatus, PassengerIdentity, PaymentMethod, Route, Seat,
    TicketType,
};
use skybook_shared::Masked;

use crate::memory::InMemoryStore;

pub const FLIGHT_JFK_LHR: i64 = 1;
pub const FLIGHT_LHR_DXB: i64 = 2;
pub const FLIGHT_DEPARTED: i64 = 3;

pub const SEAT_12A: i64 = 1;
pub const SEAT_12B: i64 = 2;
pub const SEAT_1A: i64 = 3;
pub const SEAT_1B: i64 = 4;
pub const SEAT_20C: i64 = 5;

pub const ECONOMY: i64 = 1;
pub const BUSINESS: i64 = 2;

pub const PASSENGER_ADA: i64 = 1;
pub const PASSENGER_ALAN: i64 = 2;

pub const CREDIT_CARD: i64 = 1;

pub fn seed_demo(store: &InMemoryStore) {
    let airports = [
        (1, "JFK", "John F. Kennedy International Airport", "New York"),
        (2, "LHR", "Heathrow Airport", "London"),
        (3, "DXB", "Dubai International Airport", "Dubai"),
    ];
    for (id, code, name, city) in airports {
        store.add_airport(Airport {
            id,
            iata_code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
        });
    }

    store.add_route(Route { id: 1, origin_airport_id: 1, destination_airport_id: 2 });
    store.add_route(Route { id: 2, origin_airport_id: 2, destination_airport_id: 3 });

    store.add_aircraft(Aircraft { id: 1, model: "Airbus A320".to_string() });
    store.add_aircraft(Aircraft { id: 2, model: "Boeing 777-300ER".to_string() });

    let seats = [
        (SEAT_12A, "12A", "Economy", 1),
        (SEAT_12B, "12B", "Economy", 1),
        (SEAT_1A, "1A", "Business", 2),
        (SEAT_1B, "1B", "Business", 2),
        (SEAT_20C, "20C", "Economy", 2),
    ];
    for (id, number, class, aircraft_id) in seats {
        store.add_seat(Seat {
            id,
            seat_number: number.to_string(),
            seat_class: class.to_string(),
            aircraft_id,
        });
    }

    let flights = [
        (FLIGHT_JFK_LHR, "SB100", (2025, 3, 1), (8, 0), (20, 0), 1, 1, FlightStatus::Scheduled),
        (FLIGHT_LHR_DXB, "SB200", (2025, 3, 1), (6, 0), (13, 0), 2, 2, FlightStatus::Boarding),
        (FLIGHT_DEPARTED, "SB101", (2025, 2, 28), (8, 0), (20, 0), 1, 1, FlightStatus::Departed),
    ];
    for (id, number, (y, m, d), (dep_h, dep_m), (arr_h, arr_m), route_id, aircraft_id, status) in flights {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        store.add_flight(Flight {
            id,
            flight_number: number.to_string(),
            departure_time: Utc
                .with_ymd_and_hms(y, m, d, dep_h, dep_m, 0)
                .single()
                .unwrap_or_default(),
            arrival_time: Utc
                .with_ymd_and_hms(y, m, d, arr_h, arr_m, 0)
                .single()
                .unwrap_or_default(),
            flight_date: date,
            route_id,
            aircraft_id,
            status,
        });
    }

    store.add_ticket_type(TicketType { id: ECONOMY, name: "Economy".to_string(), base_fare: 10_000 });
    store.add_ticket_type(TicketType { id: BUSINESS, name: "Business".to_string(), base_fare: 45_000 });

    store.add_passenger(PassengerIdentity {
        id: PASSENGER_ADA,
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: Some(Masked::new("ada@example.com".to_string())),
    });
    store.add_passenger(PassengerIdentity {
        id: PASSENGER_ALAN,
        first_name: "Alan".to_string(),
        last_name: "Turing".to_string(),
        email: None,
    });

    store.add_payment_method(PaymentMethod { id: CREDIT_CARD, name: "Credit Card".to_string() });
    store.add_payment_method(PaymentMethod { id: 2, name: "PayPal".to_string() });
}
