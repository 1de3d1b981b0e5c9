//! Risk classification of enriched candidates.

use crate::core::{ReputationVerdict, RiskStatus};

/// Combines the enrichment signals into a final status.
///
/// Any similarity match starts at `Suspicious` and escalates to
/// `High-Risk Phishing` when the page carried at least one phishing-indicator
/// keyword or the reputation verdict is a threat. A failed reputation check
/// never escalates. Escalation is monotonic and order-independent.
pub fn classify(keywords_found: &[String], reputation: ReputationVerdict) -> RiskStatus {
    if !keywords_found.is_empty() || reputation.is_threat() {
        RiskStatus::HighRiskPhishing
    } else {
        RiskStatus::Suspicious
    }
}
