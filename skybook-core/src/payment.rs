use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skybook_shared::Cents;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "Completed",
        }
    }
}

/// Recorded payment for a booking. Not authorized against any processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub booking_id: Uuid,
    pub amount: Cents,
    pub payment_method_id: i64,
    pub transaction_id: String,
    pub status: PaymentStatus,
}

impl Payment {
    pub fn completed(booking_id: Uuid, amount: Cents, payment_method_id: i64, at: DateTime<Utc>) -> Self {
        Self {
            booking_id,
            amount,
            payment_method_id,
            transaction_id: transaction_id(booking_id, at),
            status: PaymentStatus::Completed,
        }
    }
}

/// `TXN-<unix millis>-<booking id>`; unique because booking ids are.
pub fn transaction_id(booking_id: Uuid, at: DateTime<Utc>) -> String {
    format!("TXN-{}-{}", at.timestamp_millis(), booking_id.simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_transaction_id_format() {
        let booking_id = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2024, 12, 25, 8, 30, 0).unwrap();
        let txn = transaction_id(booking_id, at);
        assert_eq!(txn, format!("TXN-1735115400000-{}", booking_id.simple()));
    }

    #[test]
    fn test_distinct_bookings_get_distinct_ids() {
        let at = Utc::now();
        let a = Payment::completed(Uuid::new_v4(), 12500, 1, at);
        let b = Payment::completed(Uuid::new_v4(), 12500, 1, at);
        assert_ne!(a.transaction_id, b.transaction_id);
        assert_eq!(a.status, PaymentStatus::Completed);
    }
}
