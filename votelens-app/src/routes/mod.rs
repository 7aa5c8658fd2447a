//! Route groups; each exposes a `router()` merged by [`crate::build_router`].

pub mod auth;
pub mod facets;
pub mod history;
pub mod reports;
