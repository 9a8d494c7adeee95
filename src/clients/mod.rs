pub mod backend_client;
pub mod scripted_backend;

pub use backend_client::{Backend, HttpBackend};
pub use scripted_backend::{CallCounts, ScriptedBackend};
