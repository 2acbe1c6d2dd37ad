use randexam_core::config::loader::{ConfigLoader, default_config_path};
use randexam_core::exam::{DEFAULT_TOLERANCE, DEFAULT_TRIES};
use std::path::Path;

pub fn run(config: Option<&Path>) {
    match ConfigLoader::load(config) {
        Ok(rc) => {
            crate::logging::init(&rc);
            tracing::debug!("configuration resolved");
            println!("OK   randexam doctor");
            println!("core: v{}", randexam_core::version());
            match rc.source {
                Some(ref p) => println!("path: {}", p.display()),
                None => println!("path: (none, using defaults; looked for {})", default_config_path().display()),
            }
            println!("defaults.tries:     {}", rc.defaults.tries.unwrap_or(DEFAULT_TRIES));
            println!("defaults.tolerance: {}", rc.defaults.tolerance.unwrap_or(DEFAULT_TOLERANCE));
            println!(
                "defaults.bank:      {}",
                rc.defaults.bank.as_ref().map_or_else(|| "(from index)".to_string(), |b| b.display().to_string())
            );
            println!("logging.level:      {}", rc.logging.level);
            if let Some(ref file) = rc.logging.file {
                println!("logging.file:       {}", file.display());
            }
        }
        Err(e) => {
            println!("FAIL randexam doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
