use crate::types::SourceType;
use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Resolved credibility for a source domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credibility {
    pub category: SourceType,
    pub score: u32,
}

// Ordered heuristic fallback: first match wins. Fact-check is checked before
// health authorities so fact-check wins on overlapping domains like who.int.
const GOVT_DOMAINS: &[&str] = &["gov.in", "gov.", "who.int", "cdc.gov", "eci.gov", "pib.gov", "mygov"];
const FACTCHECK_DOMAINS: &[&str] =
    &["factcheck", "snopes", "afp.com", "altnews", "boomlive", "thequint", "vishvasnews"];
const HEALTH_DOMAINS: &[&str] = &["who.int", "cdc", "mohfw", "nih.gov"];
const REPUTABLE_NEWS: &[&str] =
    &["bbc", "reuters", "thehindu", "indianexpress", "apnews", "npr", "theguardian"];
const GENERIC_NEWS: &[&str] = &["news", "times", "tribune", "ndtv", "livemint"];

#[derive(Debug, Deserialize)]
struct OverrideRow {
    domain: String,
    #[serde(rename = "type")]
    category: SourceType,
    score: u32,
}

/// Immutable override snapshot plus heuristic fallback. Read-only after
/// construction, so it can be shared across concurrent claim evaluations
/// without locking.
#[derive(Debug, Default)]
pub struct CredibilityTable {
    overrides: HashMap<String, Credibility>,
}

impl CredibilityTable {
    /// Heuristics-only table (no override file available).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the override table from a `domain,type,score` CSV. Override
    /// scores are taken verbatim; callers supplying the table own its
    /// validity.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path.as_ref())?;
        let mut overrides = HashMap::new();
        for row in rdr.deserialize() {
            let row: OverrideRow = row?;
            overrides.insert(row.domain, Credibility { category: row.category, score: row.score });
        }
        tracing::info!(entries = overrides.len(), "loaded credibility override table");
        Ok(Self { overrides })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, SourceType, u32)>) -> Self {
        let overrides = entries
            .into_iter()
            .map(|(domain, category, score)| (domain, Credibility { category, score }))
            .collect();
        Self { overrides }
    }

    /// Map a domain to its credibility. Pure string matching, no I/O;
    /// deterministic for a given domain and table snapshot.
    pub fn resolve(&self, domain: &str) -> Credibility {
        let domain = domain.strip_prefix("www.").unwrap_or(domain);

        if let Some(hit) = self.overrides.get(domain) {
            return *hit;
        }

        let lower = domain.to_lowercase();
        let matches = |set: &[&str]| set.iter().any(|frag| lower.contains(frag));

        if matches(GOVT_DOMAINS) {
            Credibility { category: SourceType::Govt, score: 100 }
        } else if matches(FACTCHECK_DOMAINS) {
            Credibility { category: SourceType::Factcheck, score: 95 }
        } else if matches(HEALTH_DOMAINS) {
            Credibility { category: SourceType::HealthAuthority, score: 100 }
        } else if matches(REPUTABLE_NEWS) {
            Credibility { category: SourceType::News, score: 85 }
        } else if matches(GENERIC_NEWS) {
            Credibility { category: SourceType::News, score: 70 }
        } else {
            Credibility { category: SourceType::Other, score: 50 }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn heuristics_follow_priority_order() {
        let t = CredibilityTable::empty();
        assert_eq!(t.resolve("pib.gov.in"), Credibility { category: SourceType::Govt, score: 100 });
        assert_eq!(t.resolve("snopes.com"), Credibility { category: SourceType::Factcheck, score: 95 });
        assert_eq!(
            t.resolve("mohfw.example"),
            Credibility { category: SourceType::HealthAuthority, score: 100 }
        );
        assert_eq!(t.resolve("reuters.com"), Credibility { category: SourceType::News, score: 85 });
        assert_eq!(t.resolve("ndtv.com"), Credibility { category: SourceType::News, score: 70 });
        assert_eq!(t.resolve("randomblog.xyz"), Credibility { category: SourceType::Other, score: 50 });
    }

    #[test]
    fn govt_outranks_factcheck_and_health() {
        // who.int appears in both the govt and health sets; govt is checked first.
        let t = CredibilityTable::empty();
        assert_eq!(t.resolve("who.int").category, SourceType::Govt);
    }

    #[test]
    fn www_prefix_is_stripped() {
        let t = CredibilityTable::empty();
        assert_eq!(t.resolve("www.reuters.com"), t.resolve("reuters.com"));
    }

    #[test]
    fn override_wins_verbatim_without_clamping() {
        let t = CredibilityTable::from_entries([
            ("wikipedia.org".to_string(), SourceType::Reference, 70),
            ("sketchy.example".to_string(), SourceType::Other, 120),
        ]);
        assert_eq!(
            t.resolve("wikipedia.org"),
            Credibility { category: SourceType::Reference, score: 70 }
        );
        assert_eq!(t.resolve("www.sketchy.example").score, 120);
    }

    #[test]
    fn resolve_is_idempotent() {
        let t = CredibilityTable::empty();
        let first = t.resolve("thehindu.com");
        for _ in 0..3 {
            assert_eq!(t.resolve("thehindu.com"), first);
        }
    }

    #[test]
    fn loads_override_rows_from_csv() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "domain,type,score").unwrap();
        writeln!(f, "who.int,health_authority,100").unwrap();
        writeln!(f, "wikipedia.org,reference,70").unwrap();
        let t = CredibilityTable::from_csv_path(f.path()).unwrap();
        assert_eq!(t.resolve("who.int").category, SourceType::HealthAuthority);
        assert_eq!(t.resolve("wikipedia.org").score, 70);
    }
}
