//! The `examdrill init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create examdrill.toml
    if std::path::Path::new("examdrill.toml").exists() {
        println!("examdrill.toml already exists, skipping.");
    } else {
        std::fs::write("examdrill.toml", SAMPLE_CONFIG)?;
        println!("Created examdrill.toml");
    }

    // Create example bank
    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: examdrill validate --bank banks/example.toml");
    println!("  2. Run: examdrill run --bank banks/example.toml");
    println!("  3. Run: examdrill grade --bank banks/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examdrill configuration

bank = "banks/example.toml"
store_path = "./examdrill-answers.json"
settle_delay_ms = 200
output_dir = "./examdrill-results"
"#;

const EXAMPLE_BANK: &str = r#"[bank]
id = "example"
name = "Example Bank"
description = "A small example bank to get started"
visible_through = 2

[[questions]]
id = 1
kind = "bigo"
title = "Loop runtime"
content = "What is the runtime of a single loop over an array of length n?"
options = ["O(1)", "O(N)", "O(N²)"]
correct_answer = "B"
explanation = "One pass over n elements is linear."

[[questions]]
id = 2
kind = "truefalse"
title = "Big-O facts"
content = "Mark each claim true or false."
options = ["T", "F"]
correct_answer = ["T", "F"]

[[questions.sub_questions]]
label = "Constants are dropped in Big-O notation."
correct_answer = "T"

[[questions.sub_questions]]
label = "O(N) is always faster than O(N²) in practice."
correct_answer = "F"
"#;
