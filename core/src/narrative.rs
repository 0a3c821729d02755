//! Renders the structured explanation chosen by the verdict cascade into
//! buyer-facing text. The cascade never builds strings itself.

use crate::categorize::RiskBucket;
use crate::quality::{ConfidenceLevel, DataQualityAssessment};

/// What the winning rule wants to say, without any wording attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrative {
    /// No meaningful risks and no quality concern.
    Clean,
    /// No meaningful risks, but the data was too thin to call it a deal.
    CleanButLowConfidence,
    /// No meaningful risks, quality assessment present but not interpretable.
    CleanUncertainQuality,
    StructuralWithSecondary {
        structural_titles: Vec<String>,
        market: bool,
        seller_behavior: bool,
    },
    EnvironmentalOnly {
        title: String,
    },
    SuspiciousPricing {
        titles: Vec<String>,
    },
    MultipleConcerns {
        buckets: Vec<RiskBucket>,
        count: usize,
    },
    MinorStructuralOnly {
        titles: Vec<String>,
    },
    StrongStructuralOnly {
        titles: Vec<String>,
    },
    SingleConcern {
        title: String,
        bucket: RiskBucket,
    },
    Unclassified {
        count: usize,
    },
}

pub fn render(narrative: &Narrative, data_quality: Option<&DataQualityAssessment>) -> String {
    let mut text = match narrative {
        Narrative::Clean => "No significant risks were found in the title history, market \
             pricing, or seller activity for this vehicle."
            .to_string(),
        Narrative::CleanButLowConfidence => "No significant risks were found, but the available \
             data is too limited to confidently call this a deal."
            .to_string(),
        Narrative::CleanUncertainQuality => "No significant risks were found, but the quality of \
             the underlying data could not be determined."
            .to_string(),
        Narrative::StructuralWithSecondary {
            structural_titles,
            market,
            seller_behavior,
        } => {
            let mut secondary = Vec::new();
            if *market {
                secondary.push("market pricing concerns");
            }
            if *seller_behavior {
                secondary.push("suspicious seller behavior");
            }
            format!(
                "Serious structural issues ({}) combined with {} make this vehicle a likely disaster.",
                join_titles(structural_titles),
                join_words(&secondary)
            )
        }
        Narrative::EnvironmentalOnly { title } => format!(
            "The only structural concern is environmental exposure ({title}). This is a \
             probability based on where the vehicle has been, not proof of damage; have it \
             inspected before buying."
        ),
        Narrative::SuspiciousPricing { titles } => format!(
            "The asking price looks too good to be true ({}). Verify the vehicle's condition and \
             the seller's story before committing.",
            join_titles(titles)
        ),
        Narrative::MultipleConcerns { buckets, count } => {
            let labels: Vec<&str> = buckets.iter().map(|bucket| bucket.label()).collect();
            format!(
                "{count} concerns were found across {} risk signals. None is decisive on its own, \
                 but together they warrant a closer look.",
                join_words(&labels)
            )
        }
        Narrative::MinorStructuralOnly { titles } => format!(
            "Structural history shows {}, with no pricing or seller red flags. Review the records \
             before deciding.",
            join_titles(titles)
        ),
        Narrative::StrongStructuralOnly { titles } => format!(
            "Serious structural issues were reported ({}), but pricing and seller activity look \
             normal. Get an independent inspection and confirm the price reflects the history.",
            join_titles(titles)
        ),
        Narrative::SingleConcern { title, bucket } => format!(
            "One {} concern was found: {title}. Look into it before buying.",
            bucket.label()
        ),
        Narrative::Unclassified { count } => {
            format!("{count} potential concerns were found. Review the details before buying.")
        }
    };

    if let Some(note) = quality_note(data_quality) {
        text.push(' ');
        text.push_str(&note);
    }
    text
}

fn quality_note(data_quality: Option<&DataQualityAssessment>) -> Option<String> {
    let assessment = data_quality?;
    let level = match assessment.overall_confidence {
        ConfidenceLevel::Low => "low",
        ConfidenceLevel::Medium => "moderate",
        ConfidenceLevel::High | ConfidenceLevel::Unknown => return None,
    };
    let summary = assessment.summary.trim();
    if summary.is_empty() {
        Some(format!("Data confidence is {level}."))
    } else {
        Some(format!("Data confidence is {level}: {summary}"))
    }
}

fn join_titles(titles: &[String]) -> String {
    let words: Vec<&str> = titles.iter().map(String::as_str).collect();
    join_words(&words)
}

/// "a", "a and b", "a, b and c"
fn join_words(words: &[&str]) -> String {
    match words {
        [] => String::new(),
        [only] => (*only).to_string(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_words_uses_natural_list() {
        assert_eq!(join_words(&[]), "");
        assert_eq!(join_words(&["a"]), "a");
        assert_eq!(join_words(&["a", "b"]), "a and b");
        assert_eq!(join_words(&["a", "b", "c"]), "a, b and c");
    }

    #[test]
    fn structural_with_secondary_names_titles_and_categories() {
        let text = render(
            &Narrative::StructuralWithSecondary {
                structural_titles: vec!["Salvage title".to_string()],
                market: true,
                seller_behavior: true,
            },
            None,
        );
        assert!(text.contains("Salvage title"));
        assert!(text.contains("market pricing concerns and suspicious seller behavior"));
    }

    #[test]
    fn environmental_narrative_disclaims_proof_of_damage() {
        let text = render(
            &Narrative::EnvironmentalOnly {
                title: "Hurricane zone".to_string(),
            },
            None,
        );
        assert!(text.contains("not proof of damage"));
    }

    #[test]
    fn low_quality_appends_summary() {
        let mut assessment = DataQualityAssessment::new(ConfidenceLevel::Low, Some(30));
        assessment.summary = "Title history was unavailable.".to_string();
        let text = render(&Narrative::Clean, Some(&assessment));
        assert!(text.ends_with("Data confidence is low: Title history was unavailable."));
    }

    #[test]
    fn high_quality_adds_nothing() {
        let assessment = DataQualityAssessment::new(ConfidenceLevel::High, Some(95));
        assert_eq!(
            render(&Narrative::Clean, Some(&assessment)),
            render(&Narrative::Clean, None)
        );
    }
}
