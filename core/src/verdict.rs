//! Verdict assembly: an ordered rule cascade over categorized red flags.
//!
//! Every rule is an entry in [`RULES`]; the first entry whose predicate holds
//! decides the verdict. `Disaster` is only reachable through
//! [`RuleId::StructuralWithSecondary`] and `Deal` only through the clean
//! branch of [`RuleId::NoMeaningfulRisks`]. Everything else is `Caution`.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::categorize::{RiskBucket, RiskBuckets, categorize};
use crate::flags::RedFlag;
use crate::narrative::{Narrative, render};
use crate::quality::{ConfidenceLevel, DataQualityAssessment, DataQualityImpact, data_quality_impact};
use crate::signals::{
    RiskCounts, has_only_environmental_risk, has_strong_structural_risk, is_strong_structural,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Deal,
    Caution,
    Disaster,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Deal => "deal",
            Verdict::Caution => "caution",
            Verdict::Disaster => "disaster",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerdictReasoning {
    pub verdict: Verdict,
    /// 0-100
    pub confidence: u8,
    pub explanation: String,
    pub structural_risks: Vec<RedFlag>,
    pub market_risks: Vec<RedFlag>,
    pub seller_behavior_risks: Vec<RedFlag>,
    pub data_quality_impact: DataQualityImpact,
}

/// How a rule turns the external confidence score into its own.
///
/// `confidence = max(floor, (score ?? default) - penalty)`, capped at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScorePolicy {
    pub default: u8,
    pub penalty: u8,
    pub floor: u8,
}

impl ScorePolicy {
    pub const fn passthrough(default: u8) -> Self {
        Self {
            default,
            penalty: 0,
            floor: 0,
        }
    }

    pub fn apply(self, score: Option<u8>) -> u8 {
        score
            .unwrap_or(self.default)
            .saturating_sub(self.penalty)
            .max(self.floor)
            .min(100)
    }
}

pub mod scores {
    use super::ScorePolicy;

    pub const CLEAN_LOW_QUALITY: ScorePolicy = ScorePolicy {
        default: 75,
        penalty: 10,
        floor: 40,
    };
    pub const CLEAN: ScorePolicy = ScorePolicy::passthrough(85);
    pub const CLEAN_UNCERTAIN_QUALITY: ScorePolicy = ScorePolicy {
        default: 70,
        penalty: 5,
        floor: 50,
    };
    pub const DISASTER: ScorePolicy = ScorePolicy::passthrough(75);
    pub const DISASTER_SOFTENED: ScorePolicy = ScorePolicy {
        default: 75,
        penalty: 5,
        floor: 50,
    };
    pub const ENVIRONMENTAL_ONLY: ScorePolicy = ScorePolicy {
        default: 75,
        penalty: 10,
        floor: 50,
    };
    pub const SUSPICIOUS_PRICING: ScorePolicy = ScorePolicy {
        default: 75,
        penalty: 5,
        floor: 50,
    };
    pub const CAUTION: ScorePolicy = ScorePolicy::passthrough(70);
    pub const CAUTION_SOFTENED: ScorePolicy = ScorePolicy {
        default: 75,
        penalty: 5,
        floor: 50,
    };
    pub const MINOR_STRUCTURAL_ONLY: ScorePolicy = ScorePolicy {
        default: 75,
        penalty: 5,
        floor: 55,
    };
    pub const STRONG_STRUCTURAL_ONLY: ScorePolicy = ScorePolicy {
        default: 75,
        penalty: 10,
        floor: 50,
    };
    pub const SINGLE_CONCERN: ScorePolicy = ScorePolicy {
        default: 75,
        penalty: 5,
        floor: 60,
    };
}

/// Market ids that suggest a price too good to be true.
pub const SUSPICIOUS_PRICING_FLAG_IDS: &[&str] = &["unusually-low-price", "too-good-for-too-long"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    NoMeaningfulRisks,
    StructuralWithSecondary,
    EnvironmentalOnly,
    SuspiciousPricing,
    MultipleConcerns,
    MinorStructuralOnly,
    StrongStructuralOnly,
    SingleConcern,
    Fallback,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::NoMeaningfulRisks => "no_meaningful_risks",
            RuleId::StructuralWithSecondary => "structural_with_secondary",
            RuleId::EnvironmentalOnly => "environmental_only",
            RuleId::SuspiciousPricing => "suspicious_pricing",
            RuleId::MultipleConcerns => "multiple_concerns",
            RuleId::MinorStructuralOnly => "minor_structural_only",
            RuleId::StrongStructuralOnly => "strong_structural_only",
            RuleId::SingleConcern => "single_concern",
            RuleId::Fallback => "fallback",
        }
    }
}

/// Everything the rules look at, computed once per evaluation.
#[derive(Debug, Clone)]
pub struct RiskProfile<'a> {
    pub buckets: RiskBuckets,
    pub counts: RiskCounts,
    pub strong_structural: bool,
    pub only_environmental: bool,
    pub data_quality: Option<&'a DataQualityAssessment>,
}

impl<'a> RiskProfile<'a> {
    pub fn new(flags: &[RedFlag], data_quality: Option<&'a DataQualityAssessment>) -> Self {
        let buckets = categorize(flags);
        let counts = RiskCounts::from_buckets(&buckets);
        let strong_structural = has_strong_structural_risk(&buckets.structural);
        let only_environmental = has_only_environmental_risk(&buckets.structural);
        Self {
            buckets,
            counts,
            strong_structural,
            only_environmental,
            data_quality,
        }
    }

    fn score(&self) -> Option<u8> {
        self.data_quality.and_then(|dq| dq.confidence_score)
    }

    fn overall_confidence(&self) -> Option<ConfidenceLevel> {
        self.data_quality.map(|dq| dq.overall_confidence)
    }
}

/// What a rule decided, before the narrative is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub verdict: Verdict,
    pub confidence: u8,
    pub impact: DataQualityImpact,
    pub narrative: Narrative,
}

pub struct Rule {
    pub id: RuleId,
    pub applies: fn(&RiskProfile<'_>) -> bool,
    pub resolve: fn(&RiskProfile<'_>) -> Outcome,
}

/// The cascade, in priority order. The last entry always applies.
pub const RULES: &[Rule] = &[
    Rule {
        id: RuleId::NoMeaningfulRisks,
        applies: no_meaningful_risks,
        resolve: resolve_no_meaningful_risks,
    },
    Rule {
        id: RuleId::StructuralWithSecondary,
        applies: structural_with_secondary,
        resolve: resolve_structural_with_secondary,
    },
    Rule {
        id: RuleId::EnvironmentalOnly,
        applies: environmental_only,
        resolve: resolve_environmental_only,
    },
    Rule {
        id: RuleId::SuspiciousPricing,
        applies: suspicious_pricing,
        resolve: resolve_suspicious_pricing,
    },
    Rule {
        id: RuleId::MultipleConcerns,
        applies: multiple_concerns,
        resolve: resolve_multiple_concerns,
    },
    Rule {
        id: RuleId::MinorStructuralOnly,
        applies: minor_structural_only,
        resolve: resolve_minor_structural_only,
    },
    Rule {
        id: RuleId::StrongStructuralOnly,
        applies: strong_structural_only,
        resolve: resolve_strong_structural_only,
    },
    Rule {
        id: RuleId::SingleConcern,
        applies: single_concern,
        resolve: resolve_single_concern,
    },
    Rule {
        id: RuleId::Fallback,
        applies: always,
        resolve: resolve_fallback,
    },
];

/// Run the cascade and return the winning rule with its outcome.
pub fn resolve(profile: &RiskProfile<'_>) -> (RuleId, Outcome) {
    for rule in RULES {
        if (rule.applies)(profile) {
            return (rule.id, (rule.resolve)(profile));
        }
    }
    (RuleId::Fallback, resolve_fallback(profile))
}

/// A verdict together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedVerdict {
    pub rule: RuleId,
    pub reasoning: VerdictReasoning,
}

pub fn evaluate_traced(
    flags: &[RedFlag],
    data_quality: Option<&DataQualityAssessment>,
) -> TracedVerdict {
    let profile = RiskProfile::new(flags, data_quality);
    let (rule, outcome) = resolve(&profile);
    let explanation = render(&outcome.narrative, data_quality);
    let RiskBuckets {
        structural,
        market,
        seller_behavior,
    } = profile.buckets;

    TracedVerdict {
        rule,
        reasoning: VerdictReasoning {
            verdict: outcome.verdict,
            confidence: outcome.confidence,
            explanation,
            structural_risks: structural,
            market_risks: market,
            seller_behavior_risks: seller_behavior,
            data_quality_impact: outcome.impact,
        },
    }
}

/// Map red flags and an optional data-quality assessment to a verdict.
pub fn evaluate(
    flags: &[RedFlag],
    data_quality: Option<&DataQualityAssessment>,
) -> VerdictReasoning {
    evaluate_traced(flags, data_quality).reasoning
}

// --- predicates ---

fn no_meaningful_risks(p: &RiskProfile<'_>) -> bool {
    p.counts.total() == 0
}

fn structural_with_secondary(p: &RiskProfile<'_>) -> bool {
    p.strong_structural && !p.only_environmental && p.counts.has_secondary()
}

fn environmental_only(p: &RiskProfile<'_>) -> bool {
    p.only_environmental
}

fn suspicious_pricing(p: &RiskProfile<'_>) -> bool {
    !p.strong_structural && !suspicious_pricing_titles(p).is_empty()
}

fn multiple_concerns(p: &RiskProfile<'_>) -> bool {
    p.counts.total() >= 2 && !p.strong_structural
}

fn minor_structural_only(p: &RiskProfile<'_>) -> bool {
    p.counts.structural > 0 && !p.strong_structural && !p.counts.has_secondary()
}

fn strong_structural_only(p: &RiskProfile<'_>) -> bool {
    p.strong_structural && !p.counts.has_secondary()
}

fn single_concern(p: &RiskProfile<'_>) -> bool {
    p.counts.total() == 1
}

fn always(_: &RiskProfile<'_>) -> bool {
    true
}

// --- actions ---

fn resolve_no_meaningful_risks(p: &RiskProfile<'_>) -> Outcome {
    match p.overall_confidence() {
        Some(ConfidenceLevel::Low) => Outcome {
            verdict: Verdict::Caution,
            confidence: scores::CLEAN_LOW_QUALITY.apply(p.score()),
            impact: DataQualityImpact::PreventingDeal,
            narrative: Narrative::CleanButLowConfidence,
        },
        None | Some(ConfidenceLevel::Medium) | Some(ConfidenceLevel::High) => Outcome {
            verdict: Verdict::Deal,
            confidence: scores::CLEAN.apply(p.score()),
            impact: DataQualityImpact::None,
            narrative: Narrative::Clean,
        },
        Some(ConfidenceLevel::Unknown) => Outcome {
            verdict: Verdict::Caution,
            confidence: scores::CLEAN_UNCERTAIN_QUALITY.apply(p.score()),
            impact: DataQualityImpact::Softening,
            narrative: Narrative::CleanUncertainQuality,
        },
    }
}

fn resolve_structural_with_secondary(p: &RiskProfile<'_>) -> Outcome {
    let impact = data_quality_impact(p.data_quality, Verdict::Disaster);
    let policy = if impact == DataQualityImpact::Softening {
        scores::DISASTER_SOFTENED
    } else {
        scores::DISASTER
    };
    let structural_titles = p
        .buckets
        .structural
        .iter()
        .filter(|flag| is_strong_structural(flag))
        .map(|flag| flag.title.clone())
        .collect();

    Outcome {
        verdict: Verdict::Disaster,
        confidence: policy.apply(p.score()),
        impact,
        narrative: Narrative::StructuralWithSecondary {
            structural_titles,
            market: p.counts.market > 0,
            seller_behavior: p.counts.seller_behavior > 0,
        },
    }
}

fn resolve_environmental_only(p: &RiskProfile<'_>) -> Outcome {
    let title = p
        .buckets
        .structural
        .first()
        .map(|flag| flag.title.clone())
        .unwrap_or_default();
    softened_caution(
        p,
        scores::ENVIRONMENTAL_ONLY,
        Narrative::EnvironmentalOnly { title },
    )
}

fn resolve_suspicious_pricing(p: &RiskProfile<'_>) -> Outcome {
    softened_caution(
        p,
        scores::SUSPICIOUS_PRICING,
        Narrative::SuspiciousPricing {
            titles: suspicious_pricing_titles(p),
        },
    )
}

fn resolve_multiple_concerns(p: &RiskProfile<'_>) -> Outcome {
    let buckets = [
        (RiskBucket::Structural, p.counts.structural),
        (RiskBucket::Market, p.counts.market),
        (RiskBucket::SellerBehavior, p.counts.seller_behavior),
    ]
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .map(|(bucket, _)| bucket)
    .collect();

    modified_caution(
        p,
        Narrative::MultipleConcerns {
            buckets,
            count: p.counts.total(),
        },
    )
}

fn resolve_minor_structural_only(p: &RiskProfile<'_>) -> Outcome {
    let titles = p
        .buckets
        .structural
        .iter()
        .filter(|flag| flag.is_meaningful())
        .map(|flag| flag.title.clone())
        .collect();
    softened_caution(
        p,
        scores::MINOR_STRUCTURAL_ONLY,
        Narrative::MinorStructuralOnly { titles },
    )
}

fn resolve_strong_structural_only(p: &RiskProfile<'_>) -> Outcome {
    let titles = p
        .buckets
        .structural
        .iter()
        .filter(|flag| is_strong_structural(flag))
        .map(|flag| flag.title.clone())
        .collect();
    softened_caution(
        p,
        scores::STRONG_STRUCTURAL_ONLY,
        Narrative::StrongStructuralOnly { titles },
    )
}

fn resolve_single_concern(p: &RiskProfile<'_>) -> Outcome {
    let single = [
        RiskBucket::Structural,
        RiskBucket::Market,
        RiskBucket::SellerBehavior,
    ]
    .into_iter()
    .find_map(|bucket| {
        p.buckets
            .bucket(bucket)
            .iter()
            .find(|flag| flag.is_meaningful())
            .map(|flag| (bucket, flag.title.clone()))
    });

    let narrative = match single {
        Some((bucket, title)) => Narrative::SingleConcern { title, bucket },
        None => Narrative::Unclassified { count: 1 },
    };
    softened_caution(p, scores::SINGLE_CONCERN, narrative)
}

fn resolve_fallback(p: &RiskProfile<'_>) -> Outcome {
    modified_caution(
        p,
        Narrative::Unclassified {
            count: p.counts.total(),
        },
    )
}

fn softened_caution(p: &RiskProfile<'_>, policy: ScorePolicy, narrative: Narrative) -> Outcome {
    Outcome {
        verdict: Verdict::Caution,
        confidence: policy.apply(p.score()),
        impact: DataQualityImpact::Softening,
        narrative,
    }
}

/// Caution whose impact and confidence follow the data-quality modifier.
fn modified_caution(p: &RiskProfile<'_>, narrative: Narrative) -> Outcome {
    let impact = data_quality_impact(p.data_quality, Verdict::Caution);
    let policy = if impact == DataQualityImpact::Softening {
        scores::CAUTION_SOFTENED
    } else {
        scores::CAUTION
    };
    Outcome {
        verdict: Verdict::Caution,
        confidence: policy.apply(p.score()),
        impact,
        narrative,
    }
}

fn suspicious_pricing_titles(p: &RiskProfile<'_>) -> Vec<String> {
    p.buckets
        .market
        .iter()
        .filter(|flag| SUSPICIOUS_PRICING_FLAG_IDS.contains(&flag.id.as_str()))
        .map(|flag| flag.title.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{FlagCategory, Severity};

    fn flag(id: &str, severity: Severity, category: FlagCategory) -> RedFlag {
        RedFlag::new(id, format!("{id} title"), severity, category)
    }

    fn quality(level: ConfidenceLevel, score: Option<u8>) -> DataQualityAssessment {
        DataQualityAssessment::new(level, score)
    }

    fn title_brand() -> RedFlag {
        flag("title-brands", Severity::Critical, FlagCategory::Title)
    }

    #[test]
    fn empty_flags_without_quality_is_a_deal() {
        let traced = evaluate_traced(&[], None);
        assert_eq!(traced.rule, RuleId::NoMeaningfulRisks);
        assert_eq!(traced.reasoning.verdict, Verdict::Deal);
        assert_eq!(traced.reasoning.confidence, 85);
        assert_eq!(traced.reasoning.data_quality_impact, DataQualityImpact::None);
    }

    #[test]
    fn empty_flags_with_low_quality_prevents_deal() {
        let dq = quality(ConfidenceLevel::Low, None);
        let result = evaluate(&[], Some(&dq));
        assert_eq!(result.verdict, Verdict::Caution);
        assert_eq!(result.data_quality_impact, DataQualityImpact::PreventingDeal);
        assert_eq!(result.confidence, 65);

        let dq = quality(ConfidenceLevel::Low, Some(30));
        let result = evaluate(&[], Some(&dq));
        assert_eq!(result.confidence, 40);
    }

    #[test]
    fn empty_flags_with_medium_quality_is_still_a_deal() {
        let dq = quality(ConfidenceLevel::Medium, Some(68));
        let result = evaluate(&[], Some(&dq));
        assert_eq!(result.verdict, Verdict::Deal);
        assert_eq!(result.confidence, 68);
        assert_eq!(result.data_quality_impact, DataQualityImpact::None);
    }

    #[test]
    fn empty_flags_with_unrecognized_quality_softens() {
        let dq = quality(ConfidenceLevel::Unknown, None);
        let result = evaluate(&[], Some(&dq));
        assert_eq!(result.verdict, Verdict::Caution);
        assert_eq!(result.confidence, 65);
        assert_eq!(result.data_quality_impact, DataQualityImpact::Softening);
    }

    #[test]
    fn low_severity_flags_alone_are_still_a_deal() {
        let flags = vec![flag("overpriced", Severity::Low, FlagCategory::Pricing)];
        let result = evaluate(&flags, None);
        assert_eq!(result.verdict, Verdict::Deal);
        assert_eq!(result.market_risks.len(), 1);
    }

    #[test]
    fn strong_structural_with_market_signal_is_a_disaster() {
        let flags = vec![
            title_brand(),
            flag("comparable-gap", Severity::Medium, FlagCategory::Pricing),
        ];
        let traced = evaluate_traced(&flags, None);
        assert_eq!(traced.rule, RuleId::StructuralWithSecondary);
        assert_eq!(traced.reasoning.verdict, Verdict::Disaster);
        assert_eq!(traced.reasoning.confidence, 75);
        assert_eq!(traced.reasoning.data_quality_impact, DataQualityImpact::None);
        assert!(traced.reasoning.explanation.contains("title-brands title"));
        assert!(traced.reasoning.explanation.contains("market pricing"));
    }

    #[test]
    fn disaster_confidence_softens_with_medium_quality() {
        let flags = vec![
            title_brand(),
            flag("relisting-detected", Severity::Medium, FlagCategory::Listing),
        ];
        let dq = quality(ConfidenceLevel::Medium, Some(52));
        let result = evaluate(&flags, Some(&dq));
        assert_eq!(result.verdict, Verdict::Disaster);
        assert_eq!(result.data_quality_impact, DataQualityImpact::Softening);
        assert_eq!(result.confidence, 50);
        assert!(result.explanation.contains("suspicious seller behavior"));
    }

    #[test]
    fn strong_structural_alone_is_only_caution() {
        let traced = evaluate_traced(&[title_brand()], None);
        assert_eq!(traced.rule, RuleId::StrongStructuralOnly);
        assert_eq!(traced.reasoning.verdict, Verdict::Caution);
        assert_eq!(traced.reasoning.confidence, 65);
        assert_eq!(
            traced.reasoning.data_quality_impact,
            DataQualityImpact::Softening
        );
    }

    #[test]
    fn environmental_only_is_caution_regardless_of_score() {
        let flags = vec![flag(
            "environmental-risk",
            Severity::Medium,
            FlagCategory::Disaster,
        )];
        for score in [None, Some(0), Some(40), Some(100)] {
            let dq = score.map(|s| quality(ConfidenceLevel::High, Some(s)));
            let traced = evaluate_traced(&flags, dq.as_ref());
            assert_eq!(traced.rule, RuleId::EnvironmentalOnly);
            assert_eq!(traced.reasoning.verdict, Verdict::Caution);
            assert!(traced.reasoning.confidence >= 50);
            assert!(traced.reasoning.explanation.contains("not proof of damage"));
        }
    }

    #[test]
    fn critical_environmental_with_market_is_not_a_disaster() {
        let flags = vec![
            flag("environmental-risk", Severity::Critical, FlagCategory::Disaster),
            flag("overpriced", Severity::High, FlagCategory::Pricing),
        ];
        let traced = evaluate_traced(&flags, None);
        assert_eq!(traced.rule, RuleId::EnvironmentalOnly);
        assert_eq!(traced.reasoning.verdict, Verdict::Caution);
    }

    #[test]
    fn suspiciously_low_price_without_strong_structural_is_caution() {
        let flags = vec![flag(
            "unusually-low-price",
            Severity::Medium,
            FlagCategory::Pricing,
        )];
        let dq = quality(ConfidenceLevel::High, Some(90));
        let traced = evaluate_traced(&flags, Some(&dq));
        assert_eq!(traced.rule, RuleId::SuspiciousPricing);
        assert_eq!(traced.reasoning.confidence, 85);
        assert_eq!(
            traced.reasoning.data_quality_impact,
            DataQualityImpact::Softening
        );
    }

    #[test]
    fn two_medium_flags_across_market_and_seller_are_caution() {
        let flags = vec![
            flag("overpriced", Severity::Medium, FlagCategory::Pricing),
            flag("stale-listing", Severity::Medium, FlagCategory::Listing),
        ];
        let traced = evaluate_traced(&flags, None);
        assert_eq!(traced.rule, RuleId::MultipleConcerns);
        assert_eq!(traced.reasoning.verdict, Verdict::Caution);
        assert_eq!(traced.reasoning.confidence, 70);
        assert_eq!(traced.reasoning.data_quality_impact, DataQualityImpact::None);
        assert!(traced.reasoning.explanation.contains("market and seller behavior"));
    }

    #[test]
    fn multiple_concerns_soften_with_low_quality() {
        let flags = vec![
            flag("overpriced", Severity::Medium, FlagCategory::Pricing),
            flag("stale-listing", Severity::Medium, FlagCategory::Listing),
        ];
        let dq = quality(ConfidenceLevel::Low, Some(35));
        let result = evaluate(&flags, Some(&dq));
        assert_eq!(result.data_quality_impact, DataQualityImpact::Softening);
        assert_eq!(result.confidence, 50);
    }

    #[test]
    fn single_minor_structural_flag_uses_structural_floor() {
        let flags = vec![flag("accident-history", Severity::Medium, FlagCategory::History)];
        let dq = quality(ConfidenceLevel::High, Some(50));
        let traced = evaluate_traced(&flags, Some(&dq));
        assert_eq!(traced.rule, RuleId::MinorStructuralOnly);
        assert_eq!(traced.reasoning.confidence, 55);
    }

    #[test]
    fn single_market_flag_names_the_flag() {
        let flags = vec![flag("overpriced", Severity::Medium, FlagCategory::Pricing)];
        let dq = quality(ConfidenceLevel::High, Some(10));
        let traced = evaluate_traced(&flags, Some(&dq));
        assert_eq!(traced.rule, RuleId::SingleConcern);
        assert_eq!(traced.reasoning.confidence, 60);
        assert!(traced.reasoning.explanation.contains("overpriced title"));
    }

    #[test]
    fn strong_structural_with_only_low_secondary_is_caution() {
        let flags = vec![
            title_brand(),
            flag("overpriced", Severity::Low, FlagCategory::Pricing),
        ];
        let traced = evaluate_traced(&flags, None);
        assert_eq!(traced.rule, RuleId::StrongStructuralOnly);
        assert_eq!(traced.reasoning.verdict, Verdict::Caution);
    }

    #[test]
    fn deal_requires_zero_meaningful_risks_and_non_low_confidence() {
        let severities = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];
        let ids = ["title-brands", "overpriced", "stale-listing", "flood-zone"];
        let qualities = [
            None,
            Some(quality(ConfidenceLevel::Low, Some(20))),
            Some(quality(ConfidenceLevel::Medium, Some(60))),
            Some(quality(ConfidenceLevel::High, Some(95))),
        ];
        for severity in severities {
            for id in ids {
                for dq in &qualities {
                    let flags = vec![flag(id, severity, FlagCategory::History)];
                    let result = evaluate(&flags, dq.as_ref());
                    if result.verdict == Verdict::Deal {
                        assert_eq!(severity, Severity::Low);
                        assert_ne!(
                            dq.as_ref().map(|d| d.overall_confidence),
                            Some(ConfidenceLevel::Low)
                        );
                    }
                    assert!(result.confidence <= 100);
                    assert_eq!(
                        result.structural_risks.len()
                            + result.market_risks.len()
                            + result.seller_behavior_risks.len(),
                        1
                    );
                }
            }
        }
    }

    #[test]
    fn zero_score_clamps_to_each_rule_floor() {
        let high_zero = quality(ConfidenceLevel::High, Some(0));
        let unknown_zero = quality(ConfidenceLevel::Unknown, Some(0));
        let cases = [
            (vec![], &unknown_zero, RuleId::NoMeaningfulRisks, 50),
            (
                vec![flag("unusually-low-price", Severity::Medium, FlagCategory::Pricing)],
                &high_zero,
                RuleId::SuspiciousPricing,
                50,
            ),
            (
                vec![flag("environmental-risk", Severity::High, FlagCategory::Disaster)],
                &high_zero,
                RuleId::EnvironmentalOnly,
                50,
            ),
            (
                vec![flag("accident-history", Severity::Medium, FlagCategory::History)],
                &high_zero,
                RuleId::MinorStructuralOnly,
                55,
            ),
            (vec![title_brand()], &high_zero, RuleId::StrongStructuralOnly, 50),
            (
                vec![flag("overpriced", Severity::Medium, FlagCategory::Pricing)],
                &high_zero,
                RuleId::SingleConcern,
                60,
            ),
        ];

        for (flags, dq, rule, floor) in cases {
            let traced = evaluate_traced(&flags, Some(dq));
            assert_eq!(traced.rule, rule);
            assert_eq!(traced.reasoning.verdict, Verdict::Caution);
            assert_eq!(traced.reasoning.confidence, floor, "{}", rule.as_str());
        }

        let low_zero = quality(ConfidenceLevel::Low, Some(0));
        assert_eq!(evaluate(&[], Some(&low_zero)).confidence, 40);
    }

    #[test]
    fn out_of_range_scores_are_capped() {
        let dq = quality(ConfidenceLevel::High, Some(250));
        assert_eq!(evaluate(&[], Some(&dq)).confidence, 100);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let flags = vec![
            title_brand(),
            flag("overpriced", Severity::High, FlagCategory::Pricing),
            flag("relisting-detected", Severity::Medium, FlagCategory::Listing),
        ];
        let dq = quality(ConfidenceLevel::Medium, Some(72));
        let first = serde_json::to_string(&evaluate(&flags, Some(&dq))).unwrap();
        let second = serde_json::to_string(&evaluate(&flags, Some(&dq))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_rule_is_last_and_always_applies() {
        let last = RULES.last().unwrap();
        assert_eq!(last.id, RuleId::Fallback);
        let profile = RiskProfile::new(&[], None);
        assert!((last.applies)(&profile));
        let outcome = (last.resolve)(&profile);
        assert_eq!(outcome.verdict, Verdict::Caution);
        assert_eq!(outcome.confidence, 70);
    }

    #[test]
    fn reasoning_serializes_camel_case() {
        let value = serde_json::to_value(evaluate(&[], None)).unwrap();
        assert_eq!(value["verdict"], "deal");
        assert_eq!(value["dataQualityImpact"], "none");
        assert!(value["structuralRisks"].as_array().unwrap().is_empty());
        assert!(value["sellerBehaviorRisks"].is_array());
    }
}
