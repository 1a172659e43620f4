//! Service layer for the newsroom backend.
//! - Article likes with remote-first, ledger-fallback persistence.
//! - Storage seams (object store, JSON ledger) the likes logic is built on.
//! - Runtime wiring from `configs::AppConfig`.

pub mod errors;
pub mod likes;
pub mod observability;
pub mod runtime;
pub mod storage;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
