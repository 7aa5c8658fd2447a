//! Static per-facet configuration: schema, cardinality, required keys,
//! token budget and repair rules.

use crate::repair::KeyDefault::{self, Array, Object, Text};
use crate::repair::{NewsBuckets, RepairRule, RequiredKeys};
use votelens_common::Facet;

/// Everything the pipeline needs to know about one facet.
#[derive(Debug)]
pub struct FacetSpec {
    pub facet: Facet,
    /// What the model is asked to produce, in one sentence.
    pub task: &'static str,
    /// Example-shaped JSON schema embedded in the prompt.
    pub schema: &'static str,
    /// Cardinality constraints, one per line.
    pub constraints: &'static [&'static str],
    pub required: &'static [(&'static str, KeyDefault)],
    /// Whether the result carries a top-level `news` object with buckets.
    pub news_buckets: bool,
    /// Whether the prompt is grounded with live headlines.
    pub grounded: bool,
    pub max_tokens: u32,
}

impl FacetSpec {
    pub fn for_facet(facet: Facet) -> &'static FacetSpec {
        match facet {
            Facet::Sentiment => &SENTIMENT,
            Facet::Caste => &CASTE,
            Facet::Region => &REGION,
            Facet::Platform => &PLATFORM,
            Facet::News => &NEWS,
            Facet::Opposition => &OPPOSITION,
            Facet::LeaderProfile => &LEADER_PROFILE,
            Facet::ExecutiveSummary => &EXECUTIVE_SUMMARY,
            Facet::Hyperlocal => &HYPERLOCAL,
            Facet::StrategyReport => &STRATEGY_REPORT,
            Facet::Search => &SEARCH,
        }
    }

    /// Repair rules in application order.
    pub fn rules(&self) -> Vec<Box<dyn RepairRule>> {
        let mut rules: Vec<Box<dyn RepairRule>> =
            vec![Box::new(RequiredKeys::new(self.required.to_vec()))];
        if self.news_buckets {
            rules.push(Box::new(NewsBuckets::default()));
        }
        rules
    }

    pub fn required_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required.iter().map(|(k, _)| *k)
    }
}

const NEWS_ITEM_SCHEMA: &str = r#"{"headline": "string", "source": "string", "date": "YYYY-MM-DD", "summary": "string", "sentiment_score": -1.0 to 1.0, "key_phrases": ["string"]}"#;

const NEWS_CONSTRAINTS: &[&str] = &[
    "news.positive must contain exactly 10 items",
    "news.negative must contain exactly 10 items",
    "news.neutral must contain exactly 5 items",
    "positive items have sentiment_score above 0.3, negative items below -0.3, neutral items between -0.3 and 0.3",
];

static SENTIMENT: FacetSpec = FacetSpec {
    facet: Facet::Sentiment,
    task: "Analyse public sentiment",
    schema: r#"{
  "overall_sentiment": {"positive": 0-100, "negative": 0-100, "neutral": 0-100, "score": -1.0 to 1.0, "label": "positive|negative|neutral|mixed"},
  "sentiment_trend": [{"period": "Mon YYYY", "positive": 0-100, "negative": 0-100, "neutral": 0-100}],
  "key_drivers": [{"driver": "string", "impact": "positive|negative", "description": "string"}],
  "summary": "string"
}"#,
    constraints: &[
        "sentiment_trend must contain exactly 6 entries, one per month, oldest first",
        "key_drivers must contain exactly 5 items",
        "positive + negative + neutral must equal 100 in every entry",
    ],
    required: &[
        ("overall_sentiment", Object),
        ("sentiment_trend", Array),
        ("key_drivers", Array),
        ("summary", Text),
    ],
    news_buckets: false,
    grounded: false,
    max_tokens: 4000,
};

static CASTE: FacetSpec = FacetSpec {
    facet: Facet::Caste,
    task: "Break down caste and community voting patterns",
    schema: r#"{
  "caste_distribution": [{"caste": "string", "percentage": 0-100, "leaning": "party name", "support_level": "strong|moderate|weak", "key_concerns": ["string"]}],
  "summary": "string"
}"#,
    constraints: &[
        "caste_distribution must contain exactly 10 groups",
        "percentages must sum to roughly 100",
    ],
    required: &[("caste_distribution", Array), ("summary", Text)],
    news_buckets: false,
    grounded: false,
    max_tokens: 4000,
};

static REGION: FacetSpec = FacetSpec {
    facet: Facet::Region,
    task: "Compare sentiment and issues across regions",
    schema: r#"{
  "regions": [{"name": "string", "sentiment_score": -1.0 to 1.0, "dominant_party": "string", "voter_turnout": 0-100, "key_issues": ["string"]}],
  "summary": "string"
}"#,
    constraints: &["regions must contain exactly 8 regions"],
    required: &[("regions", Array), ("summary", Text)],
    news_buckets: false,
    grounded: false,
    max_tokens: 4000,
};

static PLATFORM: FacetSpec = FacetSpec {
    facet: Facet::Platform,
    task: "Analyse conversation across social and media platforms",
    schema: r#"{
  "platforms": [{"name": "string", "mentions": integer, "sentiment": {"positive": 0-100, "negative": 0-100, "neutral": 0-100}, "engagement_rate": 0-100, "trending_topics": ["string"]}],
  "summary": "string"
}"#,
    constraints: &[
        "platforms must contain exactly 6 platforms: Twitter/X, Facebook, Instagram, YouTube, WhatsApp, News portals",
    ],
    required: &[("platforms", Array), ("summary", Text)],
    news_buckets: false,
    grounded: false,
    max_tokens: 4000,
};

static NEWS: FacetSpec = FacetSpec {
    facet: Facet::News,
    task: "Collect and classify recent news coverage",
    schema: r#"{
  "news": {
    "positive": [NEWS_ITEM],
    "negative": [NEWS_ITEM],
    "neutral": [NEWS_ITEM]
  },
  "summary": "string"
}"#,
    constraints: NEWS_CONSTRAINTS,
    required: &[("summary", Text)],
    news_buckets: true,
    grounded: true,
    max_tokens: 4000,
};

static OPPOSITION: FacetSpec = FacetSpec {
    facet: Facet::Opposition,
    task: "Profile the main opponents and compare them",
    schema: r#"{
  "opponents": [{"name": "string", "party": "string", "sentiment_score": -1.0 to 1.0, "threat_level": "high|medium|low", "strengths": ["string"], "weaknesses": ["string"]}],
  "comparative_summary": "string"
}"#,
    constraints: &["opponents must contain exactly 5 items"],
    required: &[("opponents", Array), ("comparative_summary", Text)],
    news_buckets: false,
    grounded: false,
    max_tokens: 4000,
};

static LEADER_PROFILE: FacetSpec = FacetSpec {
    facet: Facet::LeaderProfile,
    task: "Build a profile of the political leader",
    schema: r#"{
  "profile": {"name": "string", "party": "string", "position": "string", "constituency": "string", "background": "string"},
  "achievements": [{"title": "string", "year": "YYYY", "description": "string"}],
  "controversies": [{"title": "string", "year": "YYYY", "description": "string", "impact": "high|medium|low"}],
  "public_perception": {"approval_rating": 0-100, "strengths": ["string"], "weaknesses": ["string"], "summary": "string"}
}"#,
    constraints: &[
        "achievements must contain exactly 5 items",
        "controversies may be empty when none are documented",
    ],
    required: &[
        ("profile", Object),
        ("achievements", Array),
        ("controversies", Array),
        ("public_perception", Object),
    ],
    news_buckets: false,
    grounded: false,
    max_tokens: 4000,
};

static EXECUTIVE_SUMMARY: FacetSpec = FacetSpec {
    facet: Facet::ExecutiveSummary,
    task: "Write an executive briefing",
    schema: r#"{
  "headline": "string",
  "overview": "string",
  "key_findings": ["string"],
  "risks": ["string"],
  "opportunities": ["string"],
  "outlook": "string"
}"#,
    constraints: &["key_findings must contain exactly 5 items"],
    required: &[
        ("headline", Text),
        ("overview", Text),
        ("key_findings", Array),
        ("risks", Array),
        ("opportunities", Array),
        ("outlook", Text),
    ],
    news_buckets: false,
    grounded: false,
    max_tokens: 4000,
};

static HYPERLOCAL: FacetSpec = FacetSpec {
    facet: Facet::Hyperlocal,
    task: "Report ground-level sentiment for individual localities",
    schema: r#"{
  "localities": [{"name": "string", "district": "string", "sentiment_score": -1.0 to 1.0, "key_issues": ["string"], "influential_groups": ["string"], "ground_report": "string"}],
  "summary": "string"
}"#,
    constraints: &["localities must contain exactly 10 items"],
    required: &[("localities", Array), ("summary", Text)],
    news_buckets: false,
    grounded: false,
    max_tokens: 4000,
};

static STRATEGY_REPORT: FacetSpec = FacetSpec {
    facet: Facet::StrategyReport,
    task: "Draft a campaign strategy report",
    schema: r#"{
  "objectives": ["string"],
  "target_segments": [{"segment": "string", "size": "string", "approach": "string"}],
  "messaging_pillars": [{"pillar": "string", "message": "string"}],
  "action_plan": [{"phase": "string", "timeline": "string", "actions": ["string"]}],
  "risk_mitigation": [{"risk": "string", "mitigation": "string"}],
  "kpis": [{"metric": "string", "target": "string"}]
}"#,
    constraints: &["action_plan must contain exactly 3 phases"],
    required: &[
        ("objectives", Array),
        ("target_segments", Array),
        ("messaging_pillars", Array),
        ("action_plan", Array),
        ("risk_mitigation", Array),
        ("kpis", Array),
    ],
    news_buckets: false,
    grounded: false,
    max_tokens: 8000,
};

static SEARCH: FacetSpec = FacetSpec {
    facet: Facet::Search,
    task: "Produce a complete election intelligence report",
    schema: r#"{
  "summary": "string",
  "sentiment_analysis": {"positive": 0-100, "negative": 0-100, "neutral": 0-100, "trend": "improving|stable|declining"},
  "caste_distribution": [{"caste": "string", "percentage": 0-100, "leaning": "party name"}],
  "region_analysis": [{"region": "string", "sentiment_score": -1.0 to 1.0, "key_issues": ["string"]}],
  "key_issues": [{"issue": "string", "salience": "high|medium|low", "description": "string"}],
  "recommendations": ["string"],
  "news": {
    "positive": [NEWS_ITEM],
    "negative": [NEWS_ITEM],
    "neutral": [NEWS_ITEM]
  }
}"#,
    constraints: NEWS_CONSTRAINTS,
    required: &[
        ("summary", Text),
        ("sentiment_analysis", Object),
        ("caste_distribution", Array),
        ("region_analysis", Array),
        ("key_issues", Array),
        ("recommendations", Array),
    ],
    news_buckets: true,
    grounded: true,
    max_tokens: 8000,
};

/// Shape of one news item, substituted for `NEWS_ITEM` in schemas.
pub fn news_item_schema() -> &'static str {
    NEWS_ITEM_SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_facet_has_a_spec() {
        for facet in Facet::ALL {
            let spec = FacetSpec::for_facet(facet);
            assert_eq!(spec.facet, facet);
            assert!(!spec.required.is_empty());
            for key in spec.required_keys() {
                assert!(spec.schema.contains(key), "{facet}: {key} missing from schema");
            }
        }
    }

    #[test]
    fn long_reports_get_larger_budgets() {
        assert_eq!(FacetSpec::for_facet(Facet::Search).max_tokens, 8000);
        assert_eq!(FacetSpec::for_facet(Facet::StrategyReport).max_tokens, 8000);
        assert_eq!(FacetSpec::for_facet(Facet::Caste).max_tokens, 4000);
    }

    #[test]
    fn news_is_validated_by_buckets_not_defaulted() {
        let spec = FacetSpec::for_facet(Facet::News);
        assert!(!spec.required_keys().any(|k| k == "news"));
        assert_eq!(spec.rules().len(), 2);
        assert_eq!(FacetSpec::for_facet(Facet::Region).rules().len(), 1);
    }
}
