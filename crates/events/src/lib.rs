//! Content lifecycle events.
//!
//! The host CMS reports editorial activity (saves and status transitions)
//! as events on an in-process bus:
//!
//! - [`EventBus`] -- publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ContentEvent`] -- the lifecycle facts the host reports.
//! - [`LifecycleRecorder`] -- background service that turns qualifying
//!   events into stored revision and status annotations.

pub mod bus;
pub mod recorder;

pub use bus::{ContentEvent, EventBus};
pub use recorder::LifecycleRecorder;
