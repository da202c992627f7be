//! The `examdrill grade` command.

use std::path::PathBuf;

use anyhow::Result;

use examdrill_core::parser;
use examdrill_core::report::SessionReport;
use examdrill_store::{load_config_from, JsonFileStore};

pub async fn execute(
    bank_path: Option<PathBuf>,
    store_path: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank_path = bank_path.unwrap_or(config.bank.clone());
    let store_path = store_path.unwrap_or(config.store_path.clone());

    let bank = parser::parse_bank(&bank_path)?;
    let store = JsonFileStore::new(store_path);
    let report = SessionReport::collect(&bank, &store).await?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        _ => {
            print_breakdown(&report);
            println!(
                "\nScore: {}/{} ({}%)",
                report.tally.correct, report.tally.attempted, report.percentage
            );
        }
    }

    if let Some(output_dir) = output {
        std::fs::create_dir_all(&output_dir)?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = output_dir.join(format!("report-{timestamp}.json"));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_breakdown(report: &SessionReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Title", "Attempted", "Correct"]);

    for q in &report.questions {
        table.add_row(vec![
            Cell::new(q.question_id),
            Cell::new(&q.title),
            Cell::new(q.tally.attempted),
            Cell::new(q.tally.correct),
        ]);
    }

    println!("{table}");
}
