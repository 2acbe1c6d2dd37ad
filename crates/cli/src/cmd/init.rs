use randexam_core::exam::write_starter;
use std::path::Path;

pub fn run(index: &Path) {
    match write_starter(index) {
        Ok(()) => {
            println!("OK   randexam init");
            println!("wrote: {}", index.display());
            println!("next: add question files under the bank directory, then run");
            println!("      randexam check {}", index.display());
        }
        Err(e) => {
            println!("FAIL randexam init");
            println!("{e}");
            std::process::exit(1);
        }
    }
}
