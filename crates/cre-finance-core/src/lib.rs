pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "returns")]
pub mod returns;

#[cfg(feature = "construction")]
pub mod construction;

#[cfg(feature = "equity")]
pub mod equity;

pub use error::CreFinanceError;
pub use types::*;

/// Standard result type for all cre-finance operations
pub type CreFinanceResult<T> = Result<T, CreFinanceError>;
