use randexam_core::config::types::ResolvedConfig;
use randexam_core::exam::Overrides;
use randexam_core::pipeline::prepare;
use randexam_core::sampler::estimated_difficulty;
use tabled::{Table, Tabled, settings::Style};

use crate::CheckArgs;

#[derive(Tabled)]
struct LeafRow {
    #[tabled(rename = "Leaf")]
    lemma: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Bank")]
    bank: usize,
    #[tabled(rename = "Est. difficulty")]
    estimate: String,
}

pub fn run(rc: &ResolvedConfig, args: &CheckArgs) {
    let overrides = Overrides { bank: args.bank.clone(), ..Overrides::default() };

    let prepared = match prepare(&args.index, &overrides, &rc.defaults) {
        Ok(p) => p,
        Err(e) => {
            println!("FAIL randexam check");
            println!("{e}");
            std::process::exit(1);
        }
    };

    let tree = &prepared.tree;
    if let Some(bad) = tree.first_incorrect() {
        println!("FAIL randexam check");
        println!("{tree}");
        println!("node '{}' cannot satisfy [{}:{}]", bad.lemma, bad.min, bad.max);
        std::process::exit(1);
    }

    let rows: Vec<LeafRow> = tree
        .leaves()
        .into_iter()
        .map(|leaf| {
            let bank = leaf.bank().unwrap_or_default();
            LeafRow {
                lemma: leaf.lemma.clone(),
                range: format!("{}..{}", leaf.min, leaf.max),
                bank: bank.len(),
                estimate: estimated_difficulty(bank)
                    .map_or_else(|| "-".to_string(), |d| format!("{d:.2}")),
            }
        })
        .collect();

    println!("OK   randexam check");
    println!("bank:      {} ({} questions)", prepared.settings.bank.display(), prepared.questions.len());
    println!("questions: {} to {}", tree.min, tree.max);
    println!("target:    {}", prepared.exam.difficulty);
    println!();
    println!("{tree}");
    println!("{}", Table::new(&rows).with(Style::rounded()));
}
