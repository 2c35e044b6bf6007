//! Domain types for addrcache.
//!
//! - [`TimeUnit`]: Unit a maximum age is expressed in
//! - [`CacheConfig`]: Maximum age and expiry pool sizing
//! - [`CacheStats`]: Point-in-time view of a cache

mod config;
mod stats;
mod time_unit;

pub use config::*;
pub use stats::*;
pub use time_unit::*;
