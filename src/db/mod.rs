//! Database gateway: one lazily opened, shared connection used for test fixtures and
//! for cross-checking API responses against stored data.

pub mod gateway;
pub mod settings;
mod value;

pub use gateway::{DatabaseGateway, DbOutcome, GatewayState};
pub use settings::DbSettings;
pub use value::{DbRow, SqlParam};
