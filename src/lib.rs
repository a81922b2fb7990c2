pub mod assertion;
pub mod config;
pub mod context;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod logger;
pub mod steps;

// Re-export commonly used types
pub use error::{HarnessError, Result};
