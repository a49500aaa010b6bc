//! HTTP shell for the EduScan pipeline.

pub mod routes;

pub use routes::{router, AppState};
