//! `simplifia levels` — list the explanation levels and their prompts.

use colored::Colorize;

use simplifia_core::utils::truncate_string;
use simplifia_core::PromptTable;

/// Print every level, marking the fallback one.
pub fn run(full: bool) {
    let table = PromptTable::builtin();
    let default_key = table.default_level().key;

    println!();
    for level in table.levels() {
        let marker = if level.key == default_key {
            " (default)".yellow().to_string()
        } else {
            String::new()
        };
        println!("  {:<10} {}{}", level.key.bold(), level.label, marker);
        let instruction = if full {
            level.instruction.to_string()
        } else {
            truncate_string(level.instruction, 90)
        };
        println!("             {}", instruction.dimmed());
    }
    println!();
}
