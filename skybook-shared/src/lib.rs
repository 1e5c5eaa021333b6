pub mod money;
pub mod pii;

pub use money::{format_cents, Cents};
pub use pii::Masked;
