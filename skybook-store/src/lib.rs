pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod flight_repo;
pub mod memory;
pub mod redis_repo;
pub mod reference_repo;
pub mod seed;

pub use booking_repo::PostgresBookingRepository;
pub use database::DbClient;
pub use flight_repo::PostgresFlightRepository;
pub use memory::InMemoryStore;
pub use redis_repo::RedisClient;
pub use reference_repo::PostgresReferenceRepository;
