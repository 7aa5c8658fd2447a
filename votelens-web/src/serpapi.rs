//! SerpAPI Google News vertical.

mod client;
mod types;

pub use client::SerpApiClient;
pub use types::{NewsResult, NewsResultsResponse, NewsSource};
