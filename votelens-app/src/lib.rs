//! HTTP surface of Votelens: facet analysis routes, accounts, what-if
//! history and saved reports, behind one axum [`Router`](axum::Router).

pub mod app;
pub mod error;
mod gate;
pub mod routes;

pub use app::{build_router, AppState, CookieSettings};
pub use error::ApiError;
