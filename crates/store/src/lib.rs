//! Storage and rendering services over a content host.
//!
//! The [`host::ContentHost`] trait is the single seam to the CMS the
//! service runs against: everything above it works with the neutral record
//! shapes from `marginalia-core`. Two host backends ship here -- an
//! in-memory one for tests and local development, and a SQLite one for
//! standalone deployments. On top of the host sit the annotation store
//! adapter, the settings reader, and the fragment renderer.

pub mod adapter;
pub mod host;
pub mod memory;
pub mod render;
pub mod settings;
pub mod sqlite;

pub use adapter::AnnotationStore;
pub use host::ContentHost;
pub use memory::MemoryHost;
pub use render::Renderer;
pub use settings::Settings;
pub use sqlite::SqliteHost;
