//! Domain core for the Marginalia editorial annotation service.
//!
//! Pure types and logic only: annotation records, filter/action extension
//! points, label resolution, and HTML fragment building. Anything that talks
//! to the content host or the network lives in the `marginalia-store` and
//! `marginalia-api` crates.

pub mod annotation;
pub mod content;
pub mod error;
pub mod filters;
pub mod fragment;
pub mod labels;
pub mod types;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
