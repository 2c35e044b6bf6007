//! Common traits for addrcache.

use std::fmt::Debug;
use std::hash::Hash;

/// Bound for values the cache can hold.
///
/// The cache never inspects an address: it only compares, hashes, and clones
/// it, and hands it across threads to the expiry workers. `Debug` is required
/// so addresses can be recorded in log events.
///
/// Implemented automatically for every type meeting the bounds, e.g.
/// [`std::net::IpAddr`], [`std::net::SocketAddr`], or a resolved host name.
pub trait CacheAddress: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> CacheAddress for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}
