//! # addrcache core
//!
//! Core types, errors, and configuration shared by the addrcache crates.
//!
//! - **Types**: time units, cache configuration, and statistics
//! - **Errors**: the error taxonomy for cache construction, waiting, and scheduling
//! - **Constants**: defaults and environment variable names
//! - **Traits**: the bound an address type must satisfy to be cached
//!
//! ## Example
//!
//! ```rust
//! use addrcache_core::{CacheConfig, TimeUnit};
//!
//! let config = CacheConfig::new(30, TimeUnit::Seconds).expiry_workers(2);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.ttl().unwrap().as_secs(), 30);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{AddressCacheError, Result};
pub use traits::*;
pub use types::*;
