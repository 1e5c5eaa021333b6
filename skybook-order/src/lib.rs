pub mod coordinator;
pub mod models;

pub use coordinator::BookingCoordinator;
pub use models::{BookingAttempt, BookingState, BookingStateError};
