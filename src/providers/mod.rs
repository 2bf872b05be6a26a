//! HTTP source clients and the fallback generator.
//!
//! Each client keeps its transport code as a private `Result`-returning
//! request; the public trait impl wraps it with [`recover`], which substitutes
//! fallback data on any failure. Transport and schema errors therefore never
//! propagate past this module.

pub mod fallback;
pub mod forecast;
pub mod history;
pub mod news;
pub mod rates;

use crate::core::source::SourceResult;
use anyhow::Result;
use tracing::warn;

pub(crate) const USER_AGENT: &str = "fxsync/0.1";

/// Resolves a transport result into a [`SourceResult`], generating fallback
/// data on failure. Fallback generation stays decoupled from the transport
/// call so both halves are testable in isolation.
pub(crate) fn recover<T>(
    source: &str,
    result: Result<T>,
    fallback: impl FnOnce() -> T,
) -> SourceResult<T> {
    match result {
        Ok(data) => SourceResult::live(data),
        Err(err) => {
            warn!("{source} fetch failed, substituting fallback data: {err:#}");
            SourceResult::fallback(fallback())
        }
    }
}
