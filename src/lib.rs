//! Zoomage - deep-zoom image explorer core
//!
//! Interactive pan/zoom viewing of large remote images with
//! coordinate-anchored annotations, backed by a remote collaborator for
//! search, persistence, and AI analysis.

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod message;
pub mod model;
pub mod placement;
pub mod remote;
pub mod store;
pub mod tasks;
pub mod viewer;
pub mod viewport;

pub use app::App;
pub use config::AppConfig;
pub use error::{RemoteError, ViewerError};
pub use message::Message;
