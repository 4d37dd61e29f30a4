//! Evidence ranking and formatting.
//!
//! Evidence is ordered by an adjusted score: a chain's combined weight,
//! discounted by `negative_discount` when it contradicts the relation. A
//! direct relation ranks by its own weight magnitude and is never discounted.
//! The discount only affects order: records carry the raw weight.

use super::{Evidence, Explanation, InferSettings};

/// Score used to order evidence, highest first.
pub fn ranking_score(evidence: &Evidence, settings: &InferSettings) -> f64 {
    match evidence {
        Evidence::Direct(d) => d.weight.abs(),
        Evidence::Chain(c) if c.is_negative => c.combined_weight * settings.negative_discount,
        Evidence::Chain(c) => c.combined_weight,
    }
}

/// Sort evidence by descending ranking score. The sort is stable: equal
/// scores keep their input order.
pub fn rank(mut evidence: Vec<Evidence>, settings: &InferSettings) -> Vec<Evidence> {
    evidence.sort_by(|a, b| ranking_score(b, settings).total_cmp(&ranking_score(a, settings)));
    evidence
}

/// Keep the `top_n` best ranked items. A direct relation that falls past
/// the cut replaces the weakest kept chain, so it always survives and stays
/// at its own rank position.
pub fn select_top(mut ranked: Vec<Evidence>, top_n: usize) -> Vec<Evidence> {
    if ranked.len() <= top_n {
        return ranked;
    }
    let direct: Vec<Evidence> = ranked
        .split_off(top_n)
        .into_iter()
        .filter(|e| matches!(e, Evidence::Direct(_)))
        .collect();
    let room = top_n.saturating_sub(direct.len());
    while ranked.len() > room {
        match ranked.iter().rposition(|e| matches!(e, Evidence::Chain(_))) {
            Some(i) => {
                ranked.remove(i);
            }
            None => break,
        }
    }
    ranked.extend(direct);
    ranked
}

/// Render one explanation record per ranked item, ranks from 1.
pub fn format(ranked: Vec<Evidence>) -> Vec<Explanation> {
    ranked
        .into_iter()
        .enumerate()
        .map(|(i, e)| Explanation {
            rank: i + 1,
            supports: e.supports(),
            description: e.describe(),
            weight: e.weight(),
        })
        .collect()
}

/// Rank evidence and render every item.
pub fn rank_and_format(evidence: Vec<Evidence>, settings: &InferSettings) -> Vec<Explanation> {
    format(rank(evidence, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RelationTypeId;
    use crate::infer::{CandidateChain, DirectRelation};

    fn chain(name: &str, weight: f64, negative: bool) -> Evidence {
        Evidence::Chain(CandidateChain {
            node1: "a".into(),
            r1_type: RelationTypeId(6),
            r1: "r_isa".into(),
            intermediate: name.into(),
            r2_type: RelationTypeId(6),
            r2: "r_isa".into(),
            node2: "b".into(),
            target_relation: "r_isa".into(),
            is_negative: negative,
            combined_weight: weight,
            w1: weight,
            w2: weight,
        })
    }

    fn direct(weight: f64) -> Evidence {
        Evidence::Direct(DirectRelation {
            node1: "a".into(),
            relation: "r_isa".into(),
            node2: "b".into(),
            weight,
        })
    }

    fn intermediates(records: &[Explanation]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.description.split(' ').nth(2).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn negative_chains_are_discounted_for_ordering_only() {
        let s = InferSettings::default();
        // 10 * 0.75 = 7.5 < 8
        let evidence = vec![chain("neg", 10.0, true), chain("pos", 8.0, false)];
        let ranked = rank_and_format(evidence, &s);
        assert_eq!(intermediates(&ranked), vec!["pos", "neg"]);
        assert_eq!(ranked[1].weight, 10.0);
        assert!(!ranked[1].supports);
    }

    #[test]
    fn discount_does_not_flip_large_gaps() {
        let s = InferSettings::default();
        let ranked = rank_and_format(vec![chain("pos", 8.0, false), chain("neg", 20.0, true)], &s);
        assert_eq!(intermediates(&ranked), vec!["neg", "pos"]);
    }

    #[test]
    fn ranks_start_at_one() {
        let s = InferSettings::default();
        let ranked = rank_and_format(vec![chain("x", 1.0, false), chain("y", 2.0, false)], &s);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }

    #[test]
    fn ties_keep_input_order() {
        let s = InferSettings::default();
        let evidence = vec![
            chain("first", 8.0, false),
            chain("second", 8.0, false),
            chain("third", 8.0, false),
        ];
        let ranked = rank_and_format(evidence, &s);
        assert_eq!(intermediates(&ranked), vec!["first", "second", "third"]);
    }

    #[test]
    fn direct_relation_ranks_by_its_own_weight() {
        let s = InferSettings::default();
        let ranked = rank_and_format(
            vec![direct(12.0), chain("strong", 30.0, false), chain("weak", 6.0, false)],
            &s,
        );
        assert_eq!(ranked[1].description, "a r_isa b (direct relation)");
        assert_eq!(ranked[1].weight, 12.0);
        assert_eq!(ranked[1].to_string(), "2 | yes | a r_isa b (direct relation) | 12.00");
    }

    #[test]
    fn direct_relation_is_never_discounted() {
        let s = InferSettings::default();
        assert_eq!(ranking_score(&direct(-12.0), &s), 12.0);
        assert_eq!(ranking_score(&chain("n", 12.0, true), &s), 9.0);
    }

    #[test]
    fn short_lists_are_kept_whole() {
        let kept = select_top(vec![chain("x", 9.0, false), direct(6.0)], 10);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn weak_direct_relation_survives_the_cut() {
        let s = InferSettings::default();
        let mut evidence: Vec<Evidence> =
            (0..12).map(|i| chain(&format!("x{i}"), 50.0, false)).collect();
        evidence.push(direct(6.0));

        let records = format(select_top(rank(evidence, &s), 10));
        assert_eq!(records.len(), 10);
        let expected: Vec<String> = (0..9).map(|i| format!("x{i}")).collect();
        assert_eq!(intermediates(&records[..9]), expected);
        assert_eq!(records[9].to_string(), "10 | yes | a r_isa b (direct relation) | 6.00");
    }

    #[test]
    fn cut_without_direct_relation_keeps_the_best() {
        let s = InferSettings::default();
        let evidence: Vec<Evidence> =
            (1..=4).map(|i| chain(&format!("x{i}"), i as f64 * 10.0, false)).collect();
        let records = format(select_top(rank(evidence, &s), 2));
        assert_eq!(intermediates(&records), vec!["x4", "x3"]);
    }
}
