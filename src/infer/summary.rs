//! Evidence aggregation into a verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Explanation;

/// Final classification of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Probable,
    Improbable,
    Uncertain,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Probable => "probable",
            Verdict::Improbable => "improbable",
            Verdict::Uncertain => "uncertain",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregated evidence of the top-ranked records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub word1: String,
    pub relation: String,
    pub word2: String,
    pub verdict: Verdict,
    /// Number of supporting records.
    pub positives: usize,
    /// Sum of supporting weights.
    pub pos_score: f64,
    /// Number of contradicting records.
    pub negatives: usize,
    /// Sum of contradicting weight magnitudes.
    pub neg_score: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w1, rel, w2) = (&self.word1, &self.relation, &self.word2);
        writeln!(f, "---")?;
        match self.verdict {
            Verdict::Probable => {
                writeln!(f, "Conclusion: it is probable that '{w1}' {rel} '{w2}'")?
            }
            Verdict::Improbable => {
                writeln!(f, "Conclusion: it is improbable that '{w1}' {rel} '{w2}'")?
            }
            Verdict::Uncertain => writeln!(f, "Conclusion: uncertain whether '{w1}' {rel} '{w2}'")?,
        }
        writeln!(
            f,
            "   yes: {} (total score: {:.1})",
            self.positives, self.pos_score
        )?;
        write!(
            f,
            "   no: {} (total score: {:.1})",
            self.negatives, self.neg_score
        )
    }
}

/// Aggregate the first `top_n` ranked records into a verdict.
///
/// - `diff > 0` and at least as many supporting as contradicting records:
///   probable
/// - `diff < 0` and at least as many contradicting as supporting records:
///   improbable
/// - otherwise uncertain
///
/// where `diff = pos_score - neg_score`.
pub fn summarize(
    ranked: &[Explanation],
    word1: &str,
    relation: &str,
    word2: &str,
    top_n: usize,
) -> Summary {
    let top = &ranked[..ranked.len().min(top_n)];

    let (mut positives, mut pos_score, mut negatives, mut neg_score) = (0, 0.0, 0, 0.0);
    for record in top {
        if record.supports {
            positives += 1;
            pos_score += record.weight.abs();
        } else {
            negatives += 1;
            neg_score += record.weight.abs();
        }
    }

    let diff = pos_score - neg_score;
    let verdict = if diff > 0.0 && positives >= negatives {
        Verdict::Probable
    } else if diff < 0.0 && negatives >= positives {
        Verdict::Improbable
    } else {
        Verdict::Uncertain
    };

    Summary {
        word1: word1.to_string(),
        relation: relation.to_string(),
        word2: word2.to_string(),
        verdict,
        positives,
        pos_score,
        negatives,
        neg_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(supports: bool, weight: f64) -> Explanation {
        Explanation {
            rank: 0,
            supports,
            description: String::new(),
            weight,
        }
    }

    fn verdict_of(records: &[Explanation]) -> Verdict {
        summarize(records, "a", "r", "b", 10).verdict
    }

    #[test]
    fn positive_majority_is_probable() {
        let s = summarize(&[record(true, 8.0), record(false, 6.0)], "a", "r", "b", 10);
        assert_eq!(s.verdict, Verdict::Probable);
        assert_eq!((s.positives, s.negatives), (1, 1));
        assert_eq!((s.pos_score, s.neg_score), (8.0, 6.0));
    }

    #[test]
    fn negative_majority_is_improbable() {
        assert_eq!(
            verdict_of(&[record(false, 9.0), record(true, 3.0)]),
            Verdict::Improbable
        );
    }

    #[test]
    fn score_and_count_disagreement_is_uncertain() {
        // Higher positive score but fewer positive records.
        assert_eq!(
            verdict_of(&[record(true, 30.0), record(false, 5.0), record(false, 5.0)]),
            Verdict::Uncertain
        );
        // Higher negative score but fewer negative records.
        assert_eq!(
            verdict_of(&[record(false, 30.0), record(true, 5.0), record(true, 5.0)]),
            Verdict::Uncertain
        );
    }

    #[test]
    fn exact_tie_is_uncertain() {
        assert_eq!(
            verdict_of(&[record(true, 7.0), record(false, 7.0)]),
            Verdict::Uncertain
        );
        assert_eq!(verdict_of(&[]), Verdict::Uncertain);
    }

    #[test]
    fn only_top_n_records_count() {
        let mut records: Vec<Explanation> = (0..10).map(|_| record(true, 5.0)).collect();
        records.extend((0..20).map(|_| record(false, 50.0)));
        let s = summarize(&records, "a", "r", "b", 10);
        assert_eq!(s.verdict, Verdict::Probable);
        assert_eq!(s.negatives, 0);
        assert_eq!(s.pos_score, 50.0);
    }

    #[test]
    fn summarize_is_idempotent() {
        let records = vec![record(true, 8.0), record(false, 6.0), record(true, 2.5)];
        let first = summarize(&records, "a", "r", "b", 10);
        let second = summarize(&records, "a", "r", "b", 10);
        assert_eq!(first, second);
    }

    #[test]
    fn rendering_names_verdict_and_tallies() {
        let s = summarize(&[record(true, 20.0)], "Paris", "capital_of", "France", 10);
        let text = s.to_string();
        assert!(text.starts_with("---\n"));
        assert!(text.contains("probable that 'Paris' capital_of 'France'"));
        assert!(text.contains("yes: 1 (total score: 20.0)"));
        assert!(text.contains("no: 0 (total score: 0.0)"));
    }
}
