pub mod handlers;
pub mod router;
mod settings;

pub use settings::{default_local_origins, ServerSettings};
