use serde::Serialize;
use spinbox_core::scaffold::ScaffoldReport;
use spinbox_core::types::join_components;
use spinbox_core::writer::{FileAction, ManifestState};
use spinbox_core::Mode;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let render = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    println!("{}", render(headers.iter().map(|h| h.to_string()).collect()));
    println!(
        "{}",
        widths.iter().map(|&w| "-".repeat(w)).collect::<Vec<_>>().join("  ")
    );
    for row in rows {
        println!("{}", render(row));
    }
}

/// Human-readable or JSON summary of a `create`/`add` run.
pub fn print_report(report: &ScaffoldReport, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(report);
    }

    let verb = match report.mode {
        Mode::Create => "Created",
        Mode::Add => "Updated",
    };
    println!("{verb} project '{}' at {}", report.name, report.target.display());
    if !report.added_components.is_empty() {
        println!("  added: {}", join_components(&report.added_components));
    }
    println!("  components: {}", join_components(&report.components));

    if let Some(deps) = &report.dependencies {
        for m in &deps.manifests {
            let state = match m.state {
                ManifestState::Created => "created",
                ManifestState::Merged => "merged",
            };
            println!(
                "  {}: {state} ({} added, {} already present)",
                m.path,
                m.added.len(),
                m.preserved.len()
            );
            println!("  {}: {}", m.ecosystem.setup_script(), m.script);
        }
        for f in &deps.failures {
            eprintln!("error: {}: {}", f.artifact, f.error);
        }
    }

    if let Some(examples) = &report.examples {
        println!(
            "  examples: {} created, {} updated, {} unchanged, {} preserved",
            examples.count(FileAction::Created),
            examples.count(FileAction::Updated),
            examples.count(FileAction::Unchanged),
            examples.count(FileAction::Preserved),
        );
        for f in &examples.failures {
            eprintln!("error: {}: {}", f.artifact, f.error);
        }
    }

    for w in &report.warnings {
        eprintln!("warning: {} ({}): {}", w.source, w.owner, w.message);
    }
    Ok(())
}
