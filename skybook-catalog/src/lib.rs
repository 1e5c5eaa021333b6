pub mod inventory;
pub mod pricing;

pub use inventory::InventoryService;
pub use pricing::{FareResolver, SURCHARGE};
