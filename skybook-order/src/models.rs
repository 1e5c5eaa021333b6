/// Lifecycle of a single booking attempt.
///
/// `Requested → Validated → SeatClaimed → Priced → Recorded → PaymentRecorded → Confirmed`,
/// or `Aborted` from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    Requested,
    Validated,
    SeatClaimed,
    Priced,
    Recorded,
    PaymentRecorded,
    Confirmed,
    Aborted,
}

impl BookingState {
    /// The only state reachable on success from `self`.
    pub fn next(&self) -> Option<BookingState> {
        match self {
            BookingState::Requested => Some(BookingState::Validated),
            BookingState::Validated => Some(BookingState::SeatClaimed),
            BookingState::SeatClaimed => Some(BookingState::Priced),
            BookingState::Priced => Some(BookingState::Recorded),
            BookingState::Recorded => Some(BookingState::PaymentRecorded),
            BookingState::PaymentRecorded => Some(BookingState::Confirmed),
            BookingState::Confirmed | BookingState::Aborted => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingState::Confirmed | BookingState::Aborted)
    }
}

#[derive(Debug, Clone)]
pub struct BookingAttempt {
    state: BookingState,
}

impl BookingAttempt {
    pub fn new() -> Self {
        Self {
            state: BookingState::Requested,
        }
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn advance(&mut self, to: BookingState) -> Result<(), BookingStateError> {
        if self.state.next() != Some(to) {
            return Err(BookingStateError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!("Booking attempt {:?} -> {:?}", self.state, to);
        self.state = to;
        Ok(())
    }

    pub fn abort(&mut self) -> Result<(), BookingStateError> {
        if self.state.is_terminal() {
            return Err(BookingStateError::InvalidTransition {
                from: self.state,
                to: BookingState::Aborted,
            });
        }
        tracing::debug!("Booking attempt {:?} -> Aborted", self.state);
        self.state = BookingState::Aborted;
        Ok(())
    }
}

impl Default for BookingAttempt {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingStateError {
    #[error("Invalid booking state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: BookingState,
        to: BookingState,
    },
}

impl From<BookingStateError> for skybook_core::CoreError {
    fn from(err: BookingStateError) -> Self {
        skybook_core::CoreError::StorageFault(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_lifecycle() {
        let mut attempt = BookingAttempt::new();
        for state in [
            BookingState::Validated,
            BookingState::SeatClaimed,
            BookingState::Priced,
            BookingState::Recorded,
            BookingState::PaymentRecorded,
            BookingState::Confirmed,
        ] {
            attempt.advance(state).unwrap();
            assert_eq!(attempt.state(), state);
        }
        assert!(attempt.state().is_terminal());
        assert!(attempt.abort().is_err());
    }

    #[test]
    fn test_cannot_skip_steps() {
        let mut attempt = BookingAttempt::new();
        attempt.advance(BookingState::Validated).unwrap();

        // Cannot record a booking before the seat is claimed
        let result = attempt.advance(BookingState::Recorded);
        assert!(matches!(
            result,
            Err(BookingStateError::InvalidTransition {
                from: BookingState::Validated,
                to: BookingState::Recorded
            })
        ));
    }

    #[test]
    fn test_abort_from_any_step() {
        let mut attempt = BookingAttempt::new();
        attempt.advance(BookingState::Validated).unwrap();
        attempt.advance(BookingState::SeatClaimed).unwrap();
        attempt.abort().unwrap();
        assert_eq!(attempt.state(), BookingState::Aborted);
        assert!(attempt.advance(BookingState::Priced).is_err());
    }
}
