//! Shared helpers for the `releasedag` integration tests.
//!
//! - [`builders`]: config builders that skip the TOML round trip.
//! - [`journal`]: units of work that record when they start and finish.
//! - [`fake_executor`]: an `ExecutorBackend` that never runs anything.
//! - [`fake_vcs`]: a scripted `Vcs` for the release action.
//! - [`opener`]: a `UrlOpener` that records instead of opening.

pub mod builders;
pub mod fake_executor;
pub mod fake_vcs;
pub mod journal;
pub mod opener;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Upper bound for any single awaited operation in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a subscriber that writes through the test harness, so output
/// only shows up for failing tests. `RUST_LOG=releasedag=debug` turns on
/// more detail.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("releasedag=info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    within(TEST_TIMEOUT, f).await
}

/// Await `f`, panicking if it takes longer than `limit`.
pub async fn within<F, T>(limit: Duration, f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, f).await {
        Ok(value) => value,
        Err(_) => panic!("test timed out after {limit:?}"),
    }
}
