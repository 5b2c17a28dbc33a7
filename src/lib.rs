//! Customer portal authentication service.
//!
//! Issues stateless magic-link tokens for customers with an active account
//! and resolves the authenticated customer for each request through an
//! ordered chain of guards (identity-provider JWT, then magic link).

pub mod auth;
pub mod cli;
pub mod clock;
pub mod config;
pub mod customer;
pub mod error;
pub mod handlers;
pub mod magic_link;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::app;
pub use state::AppState;
