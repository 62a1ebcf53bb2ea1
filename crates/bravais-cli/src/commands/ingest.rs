//! Ingest command - run the pipeline over the configured roots.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use colored::Colorize;

use bravais::{Ingestor, ItemOutcome, JsonStore};

use crate::settings::Settings;

pub fn run(
    config: PathBuf,
    store_override: Option<PathBuf>,
    error_log_override: Option<PathBuf>,
    report_path: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(&config)?;

    let store_path = store_override.unwrap_or_else(|| settings.store.clone());
    let mut ingest_config = settings.ingest_config();
    if error_log_override.is_some() {
        ingest_config.error_log = error_log_override;
    }

    println!(
        "{} {} root(s) into {}",
        "Ingesting".cyan().bold(),
        ingest_config.roots.len(),
        store_path.display().to_string().white()
    );

    let mut store = JsonStore::open(&store_path)?;
    let ingestor = Ingestor::with_config(ingest_config);
    let report = ingestor.run(&mut store)?;

    if verbose {
        println!();
        for item in &report.items {
            let line = match item.outcome {
                ItemOutcome::Inserted => format!(
                    "inserted  {}  {}",
                    item.entry_id.as_deref().unwrap_or("-"),
                    item.path.display()
                )
                .green(),
                ItemOutcome::Replaced => format!(
                    "replaced  {}  {}",
                    item.entry_id.as_deref().unwrap_or("-"),
                    item.path.display()
                )
                .yellow(),
                _ => format!(
                    "skipped   {}  ({})",
                    item.path.display(),
                    item.detail.as_deref().unwrap_or("unknown")
                )
                .red(),
            };
            println!("  {}", line);
        }
        for issue in &report.property_issues {
            println!(
                "  {}",
                format!("property row {} skipped: {}", issue.line, issue.message).red()
            );
        }
        for path in &report.missing_property_tables {
            println!(
                "  {}",
                format!("no property table at {}", path.display()).red()
            );
        }
        println!();
    }

    println!(
        "Processed {} item(s): {} inserted, {} replaced, {} skipped",
        report.summary.processed.to_string().white().bold(),
        report.summary.inserted.to_string().green(),
        report.summary.replaced.to_string().yellow(),
        report.summary.skipped.to_string().red()
    );

    if report.summary.archive_issues > 0 {
        println!(
            "{} archival step(s) could not be completed",
            report.summary.archive_issues.to_string().yellow()
        );
        if verbose {
            for issue in &report.archive_issues {
                println!("  {} - {}", issue.path.display(), issue.reason);
            }
        }
    }

    if let Some(path) = report_path {
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, &report)?;
        println!(
            "{} {}",
            "Report saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}
