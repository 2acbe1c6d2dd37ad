//! Tolerance search for a question selection near a target difficulty.

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::question::Question;
use crate::quota::{NodeKind, QuotaError, QuotaNode};
use crate::sampler::{SampleError, draw};

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub target: f64,
    pub tolerance: f64,
    /// Attempt budget; zero behaves as one.
    pub tries: usize,
}

/// One concrete selection and its summed difficulty.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub questions: Vec<Arc<Question>>,
    pub difficulty: f64,
}

/// Statistics of a search that never got within tolerance.
#[derive(Debug, Clone)]
pub struct SearchExhausted {
    /// Closest attempt seen.
    pub best: Attempt,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
    pub attempts: usize,
}

/// Outcome of [`assemble`].
#[derive(Debug, Clone)]
pub enum Assembly {
    Found(Attempt),
    NotFound(SearchExhausted),
}


/// Try up to `params.tries` random selections and keep the closest one.
///
/// Returns as soon as an attempt lands strictly within tolerance.
pub fn assemble<R: Rng + ?Sized>(
    tree: &QuotaNode,
    params: &SearchParams,
    rng: &mut R,
) -> Result<Assembly, AssembleError> {
    if let Some(bad) = tree.first_incorrect() {
        return Err(QuotaError::IncorrectTree(bad.lemma.clone()).into());
    }

    let tries = params.tries.max(1);
    let deviation = |d: f64| (params.target - d).abs();

    let mut best = attempt(tree, rng)?;
    let mut min_difficulty = best.difficulty;
    let mut max_difficulty = best.difficulty;
    let mut attempts = 1;

    while deviation(best.difficulty) >= params.tolerance && attempts < tries {
        let next = attempt(tree, rng)?;
        attempts += 1;
        min_difficulty = min_difficulty.min(next.difficulty);
        max_difficulty = max_difficulty.max(next.difficulty);
        if deviation(next.difficulty) < deviation(best.difficulty) {
            debug!(attempt = attempts, difficulty = next.difficulty, "new best attempt");
            best = next;
        }
    }

    if deviation(best.difficulty) < params.tolerance {
        info!(attempts, difficulty = best.difficulty, "exam assembled");
        return Ok(Assembly::Found(best));
    }

    info!(attempts, min_difficulty, max_difficulty, best = best.difficulty, "search exhausted");
    Ok(Assembly::NotFound(SearchExhausted { best, min_difficulty, max_difficulty, attempts }))
}

/// One random selection over a fresh copy of the tree.
pub fn attempt<R: Rng + ?Sized>(tree: &QuotaNode, rng: &mut R) -> Result<Attempt, AssembleError> {
    let mut working = tree.clone();
    working.reset();
    let total = rng.gen_range(working.min..=working.max);
    working.fill_to(total, rng)?;

    let mut questions = Vec::with_capacity(total);
    gather(&working, rng, &mut questions)?;
    let difficulty: f64 = questions.iter().map(|q| q.difficulty).sum();
    debug!(total, difficulty, "attempt drawn");
    Ok(Attempt { questions, difficulty })
}

fn gather<R: Rng + ?Sized>(
    node: &QuotaNode,
    rng: &mut R,
    out: &mut Vec<Arc<Question>>,
) -> Result<(), AssembleError> {
    match &node.kind {
        NodeKind::Leaf { bank } => out.extend(draw(bank, node.taken, rng)?),
        NodeKind::Branch { children } => {
            for child in children {
                gather(child, rng, out)?;
            }
        }
    }
    Ok(())
}
