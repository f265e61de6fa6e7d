use crate::credibility::CredibilityTable;
use crate::search::{FactChecker, SearchHit, Searcher};
use crate::types::{EvidenceItem, SourceType};
use anyhow::Result;
use url::Url;

/// Cap on general-search evidence kept per claim. Fact-check items are not
/// subject to this cap; the aggregator bounds them by its own page size.
pub const GENERAL_EVIDENCE_CAP: usize = 5;

const SEARCH_RESULTS_REQUESTED: usize = 10;

const SOURCE_NAMES: &[(&str, &str)] = &[
    ("bbc.com", "BBC News"),
    ("bbc.co.uk", "BBC News"),
    ("reuters.com", "Reuters"),
    ("thehindu.com", "The Hindu"),
    ("indianexpress.com", "Indian Express"),
    ("apnews.com", "Associated Press"),
    ("npr.org", "NPR"),
    ("theguardian.com", "The Guardian"),
    ("nytimes.com", "New York Times"),
    ("washingtonpost.com", "Washington Post"),
    ("cnn.com", "CNN"),
    ("ndtv.com", "NDTV"),
    ("livemint.com", "Livemint"),
    ("thequint.com", "The Quint"),
    ("altnews.in", "Alt News"),
    ("boomlive.in", "BOOM Live"),
    ("factcheck.org", "FactCheck.org"),
    ("snopes.com", "Snopes"),
    ("afp.com", "AFP Fact Check"),
    ("vishvasnews.com", "Vishvas News"),
    ("who.int", "World Health Organization"),
    ("cdc.gov", "CDC"),
    ("mohfw.gov.in", "Ministry of Health & Family Welfare"),
    ("pib.gov.in", "Press Information Bureau"),
    ("eci.gov.in", "Election Commission of India"),
];

pub fn extract_domain(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else { return String::new() };
    let host = parsed.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Friendly source name for a domain, falling back to a title-cased,
/// TLD-stripped rendering of the domain itself.
pub fn source_name(domain: &str) -> String {
    let lower = domain.to_lowercase();
    for (frag, name) in SOURCE_NAMES {
        if lower.contains(frag) {
            return (*name).to_string();
        }
    }
    if domain.is_empty() {
        return String::new();
    }
    let mut name = domain.to_string();
    for tld in [".com", ".org", ".in", ".co.uk", ".gov", ".net"] {
        name = name.replace(tld, "");
    }
    name.split('.')
        .flat_map(|part| part.split(' '))
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Annotate general-search hits with credibility, stable-sort them by score
/// descending (ties keep retrieval order), and keep the top
/// `GENERAL_EVIDENCE_CAP`.
pub fn rank_search_hits(hits: Vec<SearchHit>, table: &CredibilityTable) -> Vec<EvidenceItem> {
    let mut items: Vec<EvidenceItem> = hits
        .into_iter()
        .map(|hit| {
            let domain = extract_domain(&hit.url);
            let cred = table.resolve(&domain);
            EvidenceItem {
                url: hit.url,
                title: hit.title,
                snippet: hit.snippet,
                source_name: source_name(&domain),
                domain,
                source_type: cred.category,
                credibility_score: cred.score,
                rating: None,
                publisher: None,
            }
        })
        .collect();
    items.sort_by(|a, b| b.credibility_score.cmp(&a.credibility_score));
    items.truncate(GENERAL_EVIDENCE_CAP);
    items
}

fn factcheck_item(hit: crate::search::FactCheckHit) -> EvidenceItem {
    let domain = extract_domain(&hit.url);
    EvidenceItem {
        snippet: format!("Fact Check Rating: {}. {}", hit.rating, hit.title),
        title: format!("[FACT CHECK] {}", hit.title),
        url: hit.url,
        source_name: hit.publisher.clone(),
        domain,
        source_type: SourceType::Factcheck,
        credibility_score: 100,
        rating: Some(hit.rating),
        publisher: Some(hit.publisher),
    }
}

/// Retrieve and rank evidence for one claim: fact-check items first, then the
/// capped general-search set. Retrieval failure is "no data", never an error;
/// an empty list is a valid, meaningful result.
pub async fn gather_evidence(
    claim_text: &str,
    searcher: &dyn Searcher,
    factcheck: Option<&dyn FactChecker>,
    table: &CredibilityTable,
) -> Vec<EvidenceItem> {
    let mut evidence = Vec::new();

    if let Some(fc) = factcheck {
        match fc.search_factcheck(claim_text).await {
            Ok(hits) => {
                tracing::info!(count = hits.len(), "fact-check results");
                evidence.extend(hits.into_iter().map(factcheck_item));
            }
            Err(e) => tracing::warn!(error = %e, "fact-check lookup failed"),
        }
    }

    match searcher.search(claim_text, SEARCH_RESULTS_REQUESTED).await {
        Ok(hits) => evidence.extend(rank_search_hits(hits, table)),
        Err(e) => tracing::error!(error = %e, "web search failed, keeping fact-check evidence only"),
    }

    evidence
}

/// Same contract as `gather_evidence`, for callers that already hold raw hits.
pub fn rank(
    factcheck_hits: Vec<crate::search::FactCheckHit>,
    search_hits: Vec<SearchHit>,
    table: &CredibilityTable,
) -> Vec<EvidenceItem> {
    let mut evidence: Vec<EvidenceItem> = factcheck_hits.into_iter().map(factcheck_item).collect();
    evidence.extend(rank_search_hits(search_hits, table));
    evidence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::FactCheckHit;

    fn hit(url: &str, title: &str) -> SearchHit {
        SearchHit { url: url.into(), title: title.into(), snippet: "s".into() }
    }

    #[test]
    fn extracts_domain_without_www() {
        assert_eq!(extract_domain("https://www.reuters.com/article/x"), "reuters.com");
        assert_eq!(extract_domain("not a url"), "");
    }

    #[test]
    fn source_name_falls_back_to_title_case() {
        assert_eq!(source_name("reuters.com"), "Reuters");
        assert_eq!(source_name("dailybugle.net"), "Dailybugle");
        assert_eq!(source_name("some.blog"), "Some Blog");
    }

    #[test]
    fn general_hits_sorted_by_credibility_and_capped() {
        let table = CredibilityTable::empty();
        let hits = vec![
            hit("https://randomblog.xyz/a", "blog"),          // 50
            hit("https://reuters.com/b", "reuters"),          // 85
            hit("https://pib.gov.in/c", "pib"),               // 100
            hit("https://ndtv.com/d", "ndtv"),                // 70
            hit("https://another.xyz/e", "other1"),           // 50
            hit("https://yetanother.xyz/f", "other2"),        // 50
            hit("https://snopes.com/g", "snopes"),            // 95
        ];
        let items = rank_search_hits(hits, &table);
        assert_eq!(items.len(), GENERAL_EVIDENCE_CAP);
        let scores: Vec<u32> = items.iter().map(|i| i.credibility_score).collect();
        assert_eq!(scores, vec![100, 95, 85, 70, 50]);
        // Stable sort: among the tied 50s, retrieval order is preserved.
        assert_eq!(items[4].title, "blog");
    }

    #[test]
    fn factcheck_items_lead_and_escape_the_cap() {
        let table = CredibilityTable::empty();
        let fc = vec![
            FactCheckHit {
                url: "https://factcheck.example/1".into(),
                title: "5G claim debunked".into(),
                rating: "False".into(),
                publisher: "Example Checkers".into(),
            };
            3
        ];
        let search: Vec<SearchHit> =
            (0..8).map(|i| hit(&format!("https://blog{i}.xyz/p"), "b")).collect();
        let items = rank(fc, search, &table);
        assert_eq!(items.len(), 3 + GENERAL_EVIDENCE_CAP);
        assert_eq!(items[0].source_type, SourceType::Factcheck);
        assert_eq!(items[0].credibility_score, 100);
        assert!(items[0].title.starts_with("[FACT CHECK]"));
        assert_eq!(items[0].rating.as_deref(), Some("False"));
        assert!(items[0].snippet.starts_with("Fact Check Rating: False."));
    }

    struct FailingSearch;
    #[async_trait::async_trait]
    impl Searcher for FailingSearch {
        async fn search(&self, _q: &str, _n: usize) -> anyhow::Result<Vec<SearchHit>> {
            anyhow::bail!("timeout")
        }
    }

    struct OneFactCheck;
    #[async_trait::async_trait]
    impl FactChecker for OneFactCheck {
        async fn search_factcheck(&self, _q: &str) -> anyhow::Result<Vec<FactCheckHit>> {
            Ok(vec![FactCheckHit {
                url: "https://fc.example".into(),
                title: "t".into(),
                rating: "Misleading".into(),
                publisher: "FC".into(),
            }])
        }
    }

    #[tokio::test]
    async fn search_failure_keeps_factcheck_evidence() {
        let table = CredibilityTable::empty();
        let items =
            gather_evidence("claim", &FailingSearch, Some(&OneFactCheck), &table).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source_type, SourceType::Factcheck);
    }

    #[tokio::test]
    async fn search_failure_without_factcheck_yields_empty() {
        let table = CredibilityTable::empty();
        let items = gather_evidence("claim", &FailingSearch, None, &table).await;
        assert!(items.is_empty());
    }
}
