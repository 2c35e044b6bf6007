//! # addrcache
//!
//! Thread-safe cache of recently seen network addresses.
//!
//! ## Features
//!
//! - **Unique entries**: an address is cached at most once
//! - **Most recent first**: `peek` and `take` return the newest address
//! - **Per-entry expiry**: each address is dropped once its max age passes,
//!   by a timer on a small dedicated worker pool
//! - **Blocking take**: consumers wait for the next address instead of polling
//!
//! ## Example
//!
//! ```rust
//! use std::net::{IpAddr, Ipv4Addr};
//! use addrcache::{AddressCache, TimeUnit};
//!
//! let cache: AddressCache<IpAddr> = AddressCache::new(30, TimeUnit::Seconds)?;
//!
//! let resolver = IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8));
//! assert!(cache.add(resolver)?);
//! assert!(!cache.add(resolver)?);
//!
//! assert_eq!(cache.take()?, Some(resolver));
//! cache.clear();
//! # Ok::<(), addrcache::AddressCacheError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod expiry;
mod gate;
mod store;

pub use cache::AddressCache;

// Re-export core types
pub use addrcache_core::error::{AddressCacheError, Result};
pub use addrcache_core::types::{CacheConfig, CacheStats, TimeUnit};
pub use addrcache_core::CacheAddress;
