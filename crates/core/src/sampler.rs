//! Frequency-weighted sampling without replacement.

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;

use crate::question::Question;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("cannot draw {count} questions from a bank of {available}")]
    Oversized { count: usize, available: usize },
}

/// Draw `count` distinct questions from `bank`, weighted by frequency.
///
/// Drawing the whole bank returns it unchanged, in bank order.
pub fn draw<R: Rng + ?Sized>(
    bank: &[Arc<Question>],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Arc<Question>>, SampleError> {
    if count > bank.len() {
        return Err(SampleError::Oversized { count, available: bank.len() });
    }
    if count == bank.len() {
        return Ok(bank.to_vec());
    }

    let mut pool: Vec<Arc<Question>> = bank.to_vec();
    let mut chosen = Vec::with_capacity(count);
    for _ in 0..count {
        let index = roulette(&pool, rng);
        chosen.push(pool.remove(index));
    }
    Ok(chosen)
}

/// Index of the roulette-wheel pick over a non-empty pool.
fn roulette<R: Rng + ?Sized>(pool: &[Arc<Question>], rng: &mut R) -> usize {
    let total: f64 = pool.iter().map(|q| q.frequency).sum();
    let last = pool.len() - 1;
    if total <= 0.0 {
        return last;
    }

    let cursor = rng.gen_range(0.0..total);
    let mut accum = 0.0;
    for (index, question) in pool.iter().enumerate() {
        accum += question.frequency;
        if cursor < accum {
            return index;
        }
    }
    last
}

/// Frequency-weighted mean difficulty of a bank.
///
/// Used for diagnostics; returns `None` for an empty bank.
#[must_use]
pub fn estimated_difficulty(bank: &[Arc<Question>]) -> Option<f64> {
    let weight: f64 = bank.iter().map(|q| q.frequency).sum();
    if bank.is_empty() || weight <= 0.0 {
        return None;
    }
    let weighted: f64 = bank.iter().map(|q| q.difficulty * q.frequency).sum();
    Some(weighted / weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::QuestionBuilder;
    use crate::rng::seeded;
    use rand::rngs::mock::StepRng;
    use std::collections::BTreeSet;

    fn bank(freqs: &[f64]) -> Vec<Arc<Question>> {
        freqs
            .iter()
            .enumerate()
            .map(|(i, f)| Arc::new(QuestionBuilder::new(format!("q{i}")).frequency(*f).build()))
            .collect()
    }

    #[test]
    fn full_and_empty_draws() {
        let b = bank(&[1.0, 2.0, 3.0]);
        let mut rng = seeded(7);
        let all = draw(&b, 3, &mut rng).unwrap();
        assert!(all.iter().zip(&b).all(|(x, y)| Arc::ptr_eq(x, y)));
        assert!(draw(&b, 0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn draws_are_distinct() {
        let b = bank(&[1.0; 10]);
        let mut rng = seeded(2024);
        for count in 1..10 {
            let picked = draw(&b, count, &mut rng).unwrap();
            let titles: BTreeSet<&str> = picked.iter().map(|q| q.title.as_str()).collect();
            assert_eq!(picked.len(), count);
            assert_eq!(titles.len(), count);
        }
    }

    #[test]
    fn zero_cursor_picks_first_candidate() {
        let b = bank(&[1.0, 5.0, 1.0]);
        let mut rng = StepRng::new(0, 0);
        let picked = draw(&b, 2, &mut rng).unwrap();
        assert_eq!(picked[0].title, "q0");
        assert_eq!(picked[1].title, "q1");
    }

    #[test]
    fn oversized_draw_is_an_error() {
        let b = bank(&[1.0]);
        let mut rng = seeded(1);
        assert_eq!(
            draw(&b, 2, &mut rng).unwrap_err(),
            SampleError::Oversized { count: 2, available: 1 }
        );
    }

    #[test]
    fn weighted_mean_difficulty() {
        let b = vec![
            Arc::new(QuestionBuilder::new("a").difficulty(1.0).frequency(1.0).build()),
            Arc::new(QuestionBuilder::new("b").difficulty(4.0).frequency(2.0).build()),
        ];
        assert_eq!(estimated_difficulty(&b), Some(3.0));
        assert_eq!(estimated_difficulty(&[]), None);
    }
}
