pub mod auth;
pub mod categorize;
pub mod error;
pub mod flags;
pub mod narrative;
pub mod quality;
pub mod report;
pub mod signals;
pub mod sources;
pub mod verdict;

pub use flags::{FlagCategory, RedFlag, Severity};
pub use quality::{ConfidenceLevel, DataQualityAssessment, DataQualityImpact};
pub use verdict::{RuleId, TracedVerdict, Verdict, VerdictReasoning, evaluate, evaluate_traced};
