use randexam_core::config::types::ResolvedConfig;
use randexam_core::exam::Overrides;
use randexam_core::pipeline::{GenerateOptions, GenerateOutcome, generate, prepare};

use crate::GenerateArgs;

pub fn run(rc: &ResolvedConfig, args: &GenerateArgs) {
    let overrides = Overrides {
        bank: args.bank.clone(),
        seed: args.seed,
        tries: args.tries,
        tolerance: args.tolerance,
    };

    let prepared = match prepare(&args.index, &overrides, &rc.defaults) {
        Ok(p) => p,
        Err(e) => fail(&e.to_string()),
    };

    let options = GenerateOptions { edition: args.edition, accept_best: args.accept_best };

    match generate(&prepared, options) {
        Ok(GenerateOutcome::Written(out)) => {
            println!("OK   randexam generate");
            println!("edition:    {}", out.edition);
            println!("seed:       {}", out.seed);
            println!("target:     {}", out.target);
            println!("difficulty: {}", out.attempt.difficulty);
            println!("questions:  {}", out.attempt.questions.len());
            for path in &out.paths {
                println!("wrote: {}", path.display());
            }
            if let Some(stats) = out.best_effort {
                println!(
                    "warning: no attempt within {} of the target after {} tries (seen {} to {})",
                    prepared.settings.tolerance,
                    stats.attempts,
                    stats.min_difficulty,
                    stats.max_difficulty
                );
            }
        }
        Ok(GenerateOutcome::Exhausted(stats)) => {
            println!("FAIL randexam generate");
            println!(
                "no attempt within {} of target {} after {} tries",
                prepared.settings.tolerance, prepared.exam.difficulty, stats.attempts
            );
            println!("difficulty range seen: {} to {}", stats.min_difficulty, stats.max_difficulty);
            println!("closest attempt: {}", stats.best.difficulty);
            println!("hint: raise --tolerance, adjust the target, or pass --accept-best");
            std::process::exit(2);
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn fail(message: &str) -> ! {
    println!("FAIL randexam generate");
    println!("{message}");
    std::process::exit(1);
}
