//! The generate and check flows, from index file to written outputs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::ExamError;
use crate::assembler::{Assembly, Attempt, SearchExhausted, SearchParams, assemble};
use crate::config::DefaultsConfig;
use crate::exam::{
    ExamSpec, Overrides, Settings, first_free_edition, load_exam, output_paths, resolve_settings,
    write_outputs,
};
use crate::question::{Question, load_questions};
use crate::quota::{QuotaNode, build};
use crate::render::render_exam;
use crate::rng::seeded;

/// Everything loaded and resolved before sampling.
#[derive(Debug)]
pub struct Prepared {
    pub exam: ExamSpec,
    pub settings: Settings,
    pub questions: Vec<Arc<Question>>,
    pub tree: QuotaNode,
}

/// Load the index and the bank and build the quota tree.
pub fn prepare(
    index: &Path,
    overrides: &Overrides,
    defaults: &DefaultsConfig,
) -> Result<Prepared, ExamError> {
    let exam = load_exam(index)?;
    let settings = resolve_settings(&exam, overrides, defaults)?;
    let questions = load_questions(&settings.bank)?;
    let tree = build(&exam.parts, &questions)?;
    info!(min = tree.min, max = tree.max, "quota tree ready");
    Ok(Prepared { exam, settings, questions, tree })
}

/// Options of a generate run beyond the resolved settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Fixed edition; the first free one is used otherwise.
    pub edition: Option<usize>,
    /// Render the closest attempt when the search exhausts its tries.
    pub accept_best: bool,
}

/// A written exam.
#[derive(Debug, Clone)]
pub struct Generated {
    pub edition: usize,
    pub seed: u64,
    pub target: f64,
    pub attempt: Attempt,
    pub paths: Vec<PathBuf>,
    /// Set when the outputs come from the best attempt of a failed search.
    pub best_effort: Option<SearchExhausted>,
}

#[derive(Debug, Clone)]
pub enum GenerateOutcome {
    Written(Generated),
    Exhausted(SearchExhausted),
}

/// Assemble, render and write one edition.
pub fn generate(prepared: &Prepared, options: GenerateOptions) -> Result<GenerateOutcome, ExamError> {
    let exam = &prepared.exam;
    let (edition, paths) = match options.edition {
        Some(edition) => (edition, output_paths(&exam.index, &exam.files, edition)),
        None => first_free_edition(&exam.index, &exam.files),
    };

    let seed = prepared.settings.seed.wrapping_add(edition as u64);
    info!(edition, seed, "generating exam");
    let mut rng = seeded(seed);

    let params = SearchParams {
        target: exam.difficulty,
        tolerance: prepared.settings.tolerance,
        tries: prepared.settings.tries,
    };
    let (attempt, best_effort) = match assemble(&prepared.tree, &params, &mut rng)? {
        Assembly::Found(attempt) => (attempt, None),
        Assembly::NotFound(stats) if options.accept_best => {
            warn!(
                best = stats.best.difficulty,
                target = exam.difficulty,
                "no attempt within tolerance, using the closest one"
            );
            (stats.best.clone(), Some(stats))
        }
        Assembly::NotFound(stats) => return Ok(GenerateOutcome::Exhausted(stats)),
    };

    let contents = render_exam(exam, &attempt.questions, &mut rng)?;
    write_outputs(&paths, &contents)?;

    Ok(GenerateOutcome::Written(Generated {
        edition,
        seed,
        target: exam.difficulty,
        attempt,
        paths,
        best_effort,
    }))
}
