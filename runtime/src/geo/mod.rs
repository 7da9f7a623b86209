//! Geolocation of server addresses.
//!
//! One HTTP GET per address against a templated endpoint. Failures are
//! logged and turned into unresolved results; nothing is retried or cached.

pub mod resolver;
pub mod throttle;
pub mod types;

pub use resolver::GeoResolver;
pub use throttle::LookupThrottle;
pub use types::{parse_loc, Coordinates, GeoRecord, LookupError, ResolvedLocation};

use futures::stream::{self, StreamExt};

/// Resolve every address, returning results in input order.
///
/// At most `throttle.max_in_flight()` lookups run at once. `on_result` is
/// called once per address as results come back in order.
pub async fn resolve_all<F>(
    resolver: &GeoResolver,
    addresses: &[String],
    throttle: &LookupThrottle,
    mut on_result: F,
) -> Vec<ResolvedLocation>
where
    F: FnMut(&ResolvedLocation),
{
    let mut results = Vec::with_capacity(addresses.len());
    let mut lookups = stream::iter(addresses)
        .map(|address| async move {
            let _guard = throttle.acquire().await;
            resolver.resolve(address).await
        })
        .buffered(throttle.max_in_flight());

    while let Some(location) = lookups.next().await {
        on_result(&location);
        results.push(location);
    }

    results
}
