use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One independently fetched analytic report shown as a dashboard section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Facet {
    Sentiment,
    Caste,
    Region,
    Platform,
    News,
    Opposition,
    LeaderProfile,
    ExecutiveSummary,
    Hyperlocal,
    StrategyReport,
    Search,
}

/// Which request field names the subject of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectField {
    Query,
    Name,
}

impl Facet {
    pub const ALL: [Facet; 11] = [
        Facet::Sentiment,
        Facet::Caste,
        Facet::Region,
        Facet::Platform,
        Facet::News,
        Facet::Opposition,
        Facet::LeaderProfile,
        Facet::ExecutiveSummary,
        Facet::Hyperlocal,
        Facet::StrategyReport,
        Facet::Search,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Facet::Sentiment => "sentiment",
            Facet::Caste => "caste",
            Facet::Region => "region",
            Facet::Platform => "platform",
            Facet::News => "news",
            Facet::Opposition => "opposition",
            Facet::LeaderProfile => "leader-profile",
            Facet::ExecutiveSummary => "executive-summary",
            Facet::Hyperlocal => "hyperlocal",
            Facet::StrategyReport => "strategy-report",
            Facet::Search => "search",
        }
    }

    /// Route path of the facet endpoint, e.g. `/api/sentiment`.
    pub fn path(self) -> &'static str {
        match self {
            Facet::Sentiment => "/api/sentiment",
            Facet::Caste => "/api/caste",
            Facet::Region => "/api/region",
            Facet::Platform => "/api/platform",
            Facet::News => "/api/news",
            Facet::Opposition => "/api/opposition",
            Facet::LeaderProfile => "/api/leader-profile",
            Facet::ExecutiveSummary => "/api/executive-summary",
            Facet::Hyperlocal => "/api/hyperlocal",
            Facet::StrategyReport => "/api/strategy-report",
            Facet::Search => "/api/search",
        }
    }

    pub fn subject_field(self) -> SubjectField {
        match self {
            Facet::LeaderProfile => SubjectField::Name,
            _ => SubjectField::Query,
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Facet::ALL
            .into_iter()
            .find(|f| f.slug() == wanted)
            .ok_or_else(|| format!("unknown facet: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_and_paths_agree() {
        for facet in Facet::ALL {
            assert_eq!(facet.path(), format!("/api/{}", facet.slug()));
            assert_eq!(facet.slug().parse::<Facet>().unwrap(), facet);
        }
    }

    #[test]
    fn serde_uses_slugs() {
        let v = serde_json::to_value(Facet::ExecutiveSummary).unwrap();
        assert_eq!(v, serde_json::json!("executive-summary"));
        assert_eq!("strategy_report".parse::<Facet>().unwrap(), Facet::StrategyReport);
    }
}
