//! Facet analytics for Votelens.
//!
//! Every facet endpoint runs the same pipeline ([`Analyzer::run`]):
//!
//! 1. resolve the subject from the [`AnalysisRequest`](votelens_common::AnalysisRequest)
//! 2. optionally ground the prompt with recent headlines
//! 3. build a deterministic [`prompts::Prompt`]
//! 4. call the LLM, under a per-facet ceiling when one is set
//! 5. extract JSON from the reply and apply the facet's [`repair`] rules
//!
//! [`whatif`] covers the scenario Q&A feature, which produces prose instead
//! of JSON.

pub mod facets;
pub mod pipeline;
pub mod prompts;
pub mod repair;
pub mod whatif;

pub use facets::FacetSpec;
pub use pipeline::Analyzer;
pub use repair::{RepairReport, RepairRule};
