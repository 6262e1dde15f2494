//! CLI command implementations.

mod config;
mod doctor;
mod ingest;
mod window;

pub use config::run_config;
pub use doctor::run_doctor;
pub use ingest::run_ingest;
pub use window::run_window;
