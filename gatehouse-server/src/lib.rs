//! # Gatehouse Server
//!
//! Axum front for the Gatehouse identity core: registration, login/logout
//! and role administration. Views are rendered as JSON view models; every
//! successful form submission answers `303 See Other` with a one-shot notice.

pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod routes;
pub mod views;

pub use infra::app_state::AppState;
pub use routes::create_app;
