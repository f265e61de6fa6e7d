use crate::types::{EngagementMetadata, RiskLevel, UserLabel, Verdict, ViralityProfile};

const VIRAL_KEYWORDS: &[&str] = &[
    "breaking", "urgent", "alert", "warning", "shocking",
    "exposed", "revealed", "truth", "scandal", "secret",
    "share", "forward", "spread", "viral", "must watch",
];

const MAX_CONTENT_BOOST: f64 = 2.5;

/// Logarithmic reach scale: ~20 at 1K views, ~40 at 10K, ~60 at 100K,
/// ~80 at 1M, saturating at 100.
pub fn reach_score(views: u64) -> u32 {
    if views < 100 {
        return 10;
    }
    let score = 20.0 + ((views as f64).log10() - 3.0) * 20.0;
    (score as i64).clamp(0, 100) as u32
}

/// Engagement rate scaled to 0-100, shares weighted double.
pub fn engagement_score(views: u64, likes: u64, shares: u64, comments: u64) -> u32 {
    if views == 0 {
        return 0;
    }
    let total = (likes + 2 * shares + comments) as f64;
    let rate = total / views as f64 * 100.0;
    ((rate * 10.0) as i64).clamp(0, 100) as u32
}

fn has_shouted_word(text: &str) -> bool {
    text.split_whitespace().any(|w| {
        w.len() > 3
            && w.chars().any(|c| c.is_alphabetic())
            && w.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase())
    })
}

/// Sensationalism multiplier in [1.0, 2.5]: +0.2 per distinct viral keyword,
/// +0.3 for shouted all-caps words, +0.2 for more than two exclamation marks.
pub fn content_boost_score(claim_text: &str, original_text: &str) -> f64 {
    let combined = format!("{claim_text} {original_text}").to_lowercase();
    let mut boost = 1.0;

    let keyword_hits = VIRAL_KEYWORDS.iter().filter(|k| combined.contains(*k)).count();
    boost += keyword_hits as f64 * 0.2;

    if has_shouted_word(original_text) {
        boost += 0.3;
    }
    if original_text.matches('!').count() > 2 {
        boost += 0.2;
    }

    boost.min(MAX_CONTENT_BOOST)
}

/// Weighted blend of the sub-scores, amplified by the content boost.
pub fn virality_score(reach: u32, engagement: u32, boost: f64) -> u32 {
    let boost_normalized = (boost - 1.0) * 100.0;
    let base = 0.4 * reach as f64 + 0.3 * engagement as f64 + 0.3 * boost_normalized;
    let final_score = base * (boost / 1.5);
    (final_score as i64).clamp(0, 100) as u32
}

/// Risk tier as a pure function of (user label, virality, review flag).
pub fn risk_level(user_label: UserLabel, virality: u32, needs_review: bool) -> RiskLevel {
    match user_label {
        UserLabel::False => {
            if virality > 70 {
                RiskLevel::Critical
            } else if virality > 40 {
                RiskLevel::High
            } else {
                RiskLevel::Medium
            }
        }
        UserLabel::Neutral => {
            if needs_review && virality > 60 {
                RiskLevel::High
            } else if virality > 50 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            }
        }
        UserLabel::True => {
            if virality > 80 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            }
        }
    }
}

/// Derive the full virality profile for one verdicted claim. Missing
/// engagement telemetry falls back to the fixed sample defaults.
pub fn score(
    claim_text: &str,
    original_text: &str,
    verdict: &Verdict,
    metadata: Option<&EngagementMetadata>,
) -> ViralityProfile {
    let defaults = EngagementMetadata::default();
    let m = metadata.unwrap_or(&defaults);

    let reach = reach_score(m.views);
    let engagement = engagement_score(m.views, m.likes, m.shares, m.comments);
    let boost = content_boost_score(claim_text, original_text);
    let virality = virality_score(reach, engagement, boost);

    ViralityProfile {
        reach_score: reach,
        engagement_score: engagement,
        content_boost_score: (boost * 100.0).round() / 100.0,
        virality_score: virality,
        risk_level: risk_level(verdict.user_label, virality, verdict.needs_human_review),
    }
}
