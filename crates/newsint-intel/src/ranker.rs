//! Top-K semantic ranking over a collection of stored fingerprints.

use crate::similarity::cosine_similarity;

/// One ranked item: the article id and its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch {
    pub id: i64,
    pub score: f32,
}

/// Rank `items` by descending similarity to `query` and keep the top K.
///
/// A linear scan is deliberate at this corpus scale. The sort is stable, so
/// exactly equal scores keep their input order — no secondary key is
/// imposed. `top_k` is clamped to `[1, items.len()]`: asking for more than
/// the corpus holds returns the whole corpus ranked, and an empty corpus
/// returns an empty list.
#[must_use]
pub fn rank(query: &[f32], items: &[(i64, Vec<f32>)], top_k: usize) -> Vec<RankedMatch> {
    let mut ranked: Vec<RankedMatch> = items
        .iter()
        .map(|(id, vector)| RankedMatch {
            id: *id,
            score: cosine_similarity(query, vector),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_k.max(1).min(items.len()));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(vectors: &[Vec<f32>]) -> Vec<(i64, Vec<f32>)> {
        vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i64::try_from(i).unwrap() + 1, v.clone()))
            .collect()
    }

    #[test]
    fn ranks_descending_and_truncates() {
        let query = vec![1.0, 0.0];
        // Similarities to the query: ~0.9, ~0.95, ~0.1 by construction.
        let corpus = items(&[
            vec![0.9, 0.435_889_9],
            vec![0.95, 0.312_249_9],
            vec![0.1, 0.994_987_4],
        ]);

        let ranked = rank(&query, &corpus, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, 2, "highest similarity first");
        assert_eq!(ranked[1].id, 1);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn empty_corpus_returns_empty_list() {
        let ranked = rank(&[1.0, 0.0], &[], 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn top_k_larger_than_corpus_returns_whole_corpus() {
        let corpus = items(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let ranked = rank(&[1.0, 0.0], &corpus, 50);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn top_k_zero_is_clamped_to_one() {
        let corpus = items(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let ranked = rank(&[1.0, 0.0], &corpus, 0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, 1);
    }

    #[test]
    fn exact_ties_keep_input_order() {
        // Both items are identical to the query, so both score exactly 1.0.
        let corpus = items(&[vec![1.0, 0.0], vec![1.0, 0.0]]);
        let ranked = rank(&[1.0, 0.0], &corpus, 2);
        assert_eq!(ranked[0].id, 1, "stable sort keeps first-inserted first");
        assert_eq!(ranked[1].id, 2);
    }

    #[test]
    fn zero_query_scores_everything_zero_but_still_ranks() {
        let corpus = items(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let ranked = rank(&[0.0, 0.0], &corpus, 2);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|m| m.score == 0.0));
    }
}
