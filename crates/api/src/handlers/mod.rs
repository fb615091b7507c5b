//! Request handlers.
//!
//! Comment endpoints answer with the `{success, data}` envelope and the
//! re-rendered fragment; the admin surfaces return rendered HTML; the
//! event endpoints accept host lifecycle callbacks. Handlers delegate to
//! the store and renderer services and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod comments;
pub mod events;
pub mod surfaces;
