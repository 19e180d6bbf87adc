//! Intercept prediction and convergence analysis.
//!
//! The numerical work lives in the `crates/*` members; this crate re-exports them under
//! short names so binaries and front-ends depend on a single package, and adds the glue
//! that turns analysis results into export records.

pub use intercept_analysis as analysis;
pub use intercept_config as config;
pub use intercept_core as geometry;
pub use intercept_export as export;
pub use intercept_session as session;
pub use intercept_solvers as solvers;

pub mod report;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
