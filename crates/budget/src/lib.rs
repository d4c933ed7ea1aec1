//! Token Budgeter: truncates a per-need match set so the total estimated
//! token count of the surviving content fits a caller-supplied budget,
//! without starving any need that had at least one candidate.
//!
//! Truncation runs in two phases. Phase A walks needs in their original
//! order and reserves each need's single highest-ranked candidate, so a
//! need with a strong single hit is never crowded out by another need's
//! many weaker ones. Phase B then spends whatever budget remains on the
//! globally best remaining candidates, regardless of which need they
//! belong to, so the budget isn't wasted evenly across needs that don't
//! need it.

use matcher::{Match, MatchResult};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("token accounting overflowed while truncating matches")]
    Overflow,
}

/// Estimate the token cost of delivering `m`'s content, falling back to a
/// `serialized_bytes / 4` heuristic since the budgeter has no tokenizer of
/// its own.
pub fn estimate_tokens(m: &Match) -> usize {
    let serialized = serde_json::to_vec(&m.record.content).unwrap_or_default();
    (serialized.len() / 4).max(1)
}

/// Truncate `results` to fit `budget` estimated tokens, preserving every
/// need's entry (possibly with an empty match list) and original order.
pub fn truncate(results: &[MatchResult], budget: usize) -> Result<Vec<MatchResult>, BudgetError> {
    let total: usize = results
        .iter()
        .flat_map(|r| r.matches.iter())
        .map(estimate_tokens)
        .sum();
    if total <= budget {
        return Ok(results.to_vec());
    }

    let mut admitted: Vec<Vec<bool>> = results
        .iter()
        .map(|r| vec![false; r.matches.len()])
        .collect();
    let mut used = 0usize;

    // Phase A: reserve each need's top candidate, in need order.
    for (need_idx, result) in results.iter().enumerate() {
        if let Some(top) = result.matches.first() {
            let cost = estimate_tokens(top);
            if let Some(next) = used.checked_add(cost) {
                if next <= budget {
                    used = next;
                    admitted[need_idx][0] = true;
                }
            } else {
                return Err(BudgetError::Overflow);
            }
        }
    }

    // Phase B: fill remaining budget with the globally best leftovers,
    // ties broken by (need_index, original_position) to stay deterministic.
    let mut remaining: Vec<(usize, usize, &Match)> = Vec::new();
    for (need_idx, result) in results.iter().enumerate() {
        for (pos, m) in result.matches.iter().enumerate() {
            if !admitted[need_idx][pos] {
                remaining.push((need_idx, pos, m));
            }
        }
    }
    remaining.sort_by(|a, b| {
        b.2.score
            .partial_cmp(&a.2.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
            .then_with(|| a.1.cmp(&b.1))
    });

    for (need_idx, pos, m) in remaining {
        if used >= budget {
            break;
        }
        let cost = estimate_tokens(m);
        if cost <= budget - used {
            used += cost;
            admitted[need_idx][pos] = true;
        }
    }

    Ok(results
        .iter()
        .enumerate()
        .map(|(need_idx, r)| {
            let matches = r
                .matches
                .iter()
                .enumerate()
                .filter(|(pos, _)| admitted[need_idx][*pos])
                .map(|(_, m)| m.clone())
                .collect();
            MatchResult {
                need: r.need.clone(),
                matches,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest::{NodeType, Payload};
    use index::NodeRecord;

    fn record(data_key: &str, text: &str) -> NodeRecord {
        NodeRecord {
            project: "p".into(),
            data_key: data_key.into(),
            node_key: data_key.into(),
            node_path: String::new(),
            node_type: NodeType::Object,
            description: text.into(),
            content: Payload::Str(text.to_string()),
            original_payload: Payload::Str(text.to_string()),
            data_format: "json".into(),
            vector: Vec::new(),
        }
    }

    fn hit(data_key: &str, score: f32, text_len: usize) -> Match {
        Match {
            data_key: data_key.into(),
            node_key: data_key.into(),
            score,
            vector_similarity: Some(score),
            lexical_rank: None,
            record: record(data_key, &"x".repeat(text_len)),
        }
    }

    fn result(need: &str, matches: Vec<Match>) -> MatchResult {
        MatchResult {
            need: need.into(),
            matches,
        }
    }

    #[test]
    fn total_under_budget_returns_everything_unchanged() {
        let input = vec![result("a", vec![hit("k1", 0.9, 4), hit("k2", 0.5, 4)])];
        let out = truncate(&input, 1000).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn phase_a_reserves_top_candidate_per_need() {
        let input = vec![
            result("a", vec![hit("a1", 0.9, 400), hit("a2", 0.8, 400)]),
            result("b", vec![hit("b1", 0.95, 400)]),
        ];
        // Budget only large enough for the two top candidates.
        let out = truncate(&input, 200).unwrap();
        assert_eq!(out[0].matches.iter().map(|m| &m.data_key).collect::<Vec<_>>(), vec!["a1"]);
        assert_eq!(out[1].matches.iter().map(|m| &m.data_key).collect::<Vec<_>>(), vec!["b1"]);
    }

    #[test]
    fn phase_b_fills_remaining_budget_by_similarity_desc() {
        let input = vec![
            result("a", vec![hit("a1", 0.9, 40), hit("a2", 0.85, 40)]),
            result("b", vec![hit("b1", 0.95, 40), hit("b2", 0.80, 40)]),
        ];
        // Enough room for both reserved tops (20 tokens) plus one more leftover.
        let out = truncate(&input, 30).unwrap();
        let survivors: Vec<&str> = out
            .iter()
            .flat_map(|r| r.matches.iter())
            .map(|m| m.data_key.as_str())
            .collect();
        assert!(survivors.contains(&"a1"));
        assert!(survivors.contains(&"b1"));
        // a2 (0.85) outranks b2 (0.80) in phase B.
        assert!(survivors.contains(&"a2"));
        assert!(!survivors.contains(&"b2"));
    }

    #[test]
    fn single_oversized_candidate_can_be_dropped_entirely() {
        let input = vec![result("a", vec![hit("a1", 0.9, 10_000)])];
        let out = truncate(&input, 10).unwrap();
        assert!(out[0].matches.is_empty());
    }

    #[test]
    fn needs_with_no_candidates_are_preserved_as_empty() {
        let input = vec![result("a", vec![hit("a1", 0.9, 10_000)]), result("empty", vec![])];
        let out = truncate(&input, 10).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].need, "empty");
        assert!(out[1].matches.is_empty());
    }
}
