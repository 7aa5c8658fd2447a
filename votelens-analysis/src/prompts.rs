//! Deterministic prompt construction for every facet.

use crate::facets::{news_item_schema, FacetSpec};
use votelens_common::{AnalysisRequest, Facet};
use votelens_web::NewsHeadline;

/// System and user halves of a model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const SYSTEM_PROMPT: &str = "You are a senior political analyst specialising in Indian elections. \
You produce structured, data-driven assessments grounded in electoral history, demographics and current affairs. \
You always answer with a single valid JSON document and nothing else.";

const FORMAT_RULES: &[&str] = &[
    "Respond with valid JSON only.",
    "Do not wrap the JSON in markdown or code fences.",
    "Do not add any text before or after the JSON.",
    "Do not use trailing commas.",
    "Use double quotes for every key and string value.",
    "Every key shown in the schema must be present.",
];

/// Build the prompt for `facet` about `subject`.
///
/// `headlines` are embedded verbatim when non-empty; callers pass an empty
/// slice when grounding is off or unavailable.
pub fn build_prompt(
    facet: Facet,
    subject: &str,
    request: &AnalysisRequest,
    headlines: &[NewsHeadline],
) -> Prompt {
    let spec = FacetSpec::for_facet(facet);
    let mut user = String::with_capacity(2048);

    user.push_str(spec.task);
    user.push_str(match facet {
        Facet::LeaderProfile => " for: ",
        _ => " for the following subject: ",
    });
    user.push_str(subject);
    user.push('\n');

    if let Some(region) = request.region() {
        user.push_str(&format!("Region: {region}\n"));
    }
    if let Some(range) = request.time_range() {
        user.push_str(&format!("Time range: {range}\n"));
    }

    if !headlines.is_empty() {
        user.push_str("\nRecent headlines (use them where relevant, do not invent sources):\n");
        for h in headlines {
            user.push_str("- ");
            user.push_str(&h.prompt_line());
            user.push('\n');
        }
    }

    user.push_str("\nReturn JSON with exactly this structure:\n");
    user.push_str(&spec.schema.replace("NEWS_ITEM", news_item_schema()));
    user.push('\n');

    user.push_str("\nRequirements:\n");
    for rule in spec.constraints {
        user.push_str("- ");
        user.push_str(rule);
        user.push('\n');
    }
    for rule in FORMAT_RULES {
        user.push_str("- ");
        user.push_str(rule);
        user.push('\n');
    }

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}
