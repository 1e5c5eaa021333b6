use std::sync::Arc;

use skybook_core::repository::ReferenceData;
use skybook_core::{CoreError, CoreResult};
use skybook_shared::Cents;

/// Flat amount added to every base fare (25.00).
pub const SURCHARGE: Cents = 2_500;

/// Resolves ticket types to the amount actually charged.
#[derive(Clone)]
pub struct FareResolver {
    reference: Arc<dyn ReferenceData>,
}

impl FareResolver {
    pub fn new(reference: Arc<dyn ReferenceData>) -> Self {
        Self { reference }
    }

    /// Base fare of the ticket type, or `NotFound` if it does not exist.
    pub async fn base_fare(&self, ticket_type_id: i64) -> CoreResult<Cents> {
        let ticket_type = self
            .reference
            .resolve_ticket_type(ticket_type_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("ticket type {}", ticket_type_id)))?;
        Ok(ticket_type.base_fare)
    }

    /// Base fare plus the flat surcharge.
    pub async fn total_fare(&self, ticket_type_id: i64) -> CoreResult<Cents> {
        let base = self.base_fare(ticket_type_id).await?;
        with_surcharge(base).ok_or_else(|| {
            CoreError::StorageFault(format!(
                "base fare {} of ticket type {} overflows with surcharge",
                base, ticket_type_id
            ))
        })
    }
}

/// `None` when the total does not fit in `Cents`.
pub fn with_surcharge(base_fare: Cents) -> Option<Cents> {
    base_fare.checked_add(SURCHARGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybook_core::models::TicketType;
    use skybook_store::memory::InMemoryStore;
    use skybook_store::seed;

    fn resolver() -> (InMemoryStore, FareResolver) {
        let store = InMemoryStore::new();
        seed::seed_demo(&store);
        let resolver = FareResolver::new(Arc::new(store.clone()));
        (store, resolver)
    }

    #[test]
    fn test_with_surcharge() {
        assert_eq!(with_surcharge(10_000), Some(12_500));
        assert_eq!(with_surcharge(0), Some(2_500));
        assert_eq!(with_surcharge(Cents::MAX), None);
    }

    #[tokio::test]
    async fn test_overflowing_fare_is_storage_fault() {
        let (store, resolver) = resolver();
        store.add_ticket_type(TicketType {
            id: 77,
            name: "Corrupt".to_string(),
            base_fare: Cents::MAX - 1,
        });
        let err = resolver.total_fare(77).await.unwrap_err();
        assert!(matches!(err, CoreError::StorageFault(_)));
    }

    #[tokio::test]
    async fn test_total_fare_adds_surcharge_exactly() {
        let (store, resolver) = resolver();
        assert_eq!(resolver.base_fare(seed::ECONOMY).await.unwrap(), 10_000);
        assert_eq!(resolver.total_fare(seed::ECONOMY).await.unwrap(), 12_500);

        store.add_ticket_type(TicketType {
            id: 99,
            name: "Odd".to_string(),
            base_fare: 12_345,
        });
        assert_eq!(resolver.total_fare(99).await.unwrap(), 14_845);
    }

    #[tokio::test]
    async fn test_unknown_ticket_type_is_not_found() {
        let (_store, resolver) = resolver();
        let err = resolver.total_fare(404).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
