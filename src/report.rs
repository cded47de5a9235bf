use std::path::Path;

use comfy_table::{Cell, Table};

use crate::core::executor::{ExecutionReport, RenameOutcome};
use crate::models::{Event, RunMode, WarningSet};

fn base(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn print_mode_banners(mode: RunMode) {
    if mode.check_only {
        println!(">>> Running in Check-Only Mode <<<");
    }
    if mode.force_yes {
        println!(">>> Forcing 'Yes' to all flatten prompts <<<");
    }
    if mode.force_no {
        println!(">>> Forcing 'No' to all flatten prompts <<<");
    }
}

pub fn print_phase(number: u8, title: &str) {
    println!("\n--- Phase {}: {} ---", number, title);
}

/// One console line per event.
pub fn render_event(event: &Event) -> String {
    match event {
        Event::Analyzed { folder, album, year } => match year {
            Some(year) => format!("Analyzing: {}\n  -> Found album: '{}' ({})", folder, album, year),
            None => format!("Analyzing: {}\n  -> Found album: '{}'", folder, album),
        },
        Event::UnreadableFile { file, error } => {
            format!("  [Warning] Could not read metadata from {}: {}", file, error)
        }
        Event::Flattened { folder, moved } => {
            format!("  -> Flattened '{}' ({} items moved).", folder, moved)
        }
        Event::FlattenFailed { folder, child, error } => {
            format!("  [Error] Failed to flatten '{}' into '{}': {}", child, folder, error)
        }
        Event::DiscTagsRemoved { folder, removed } => format!(
            "  -> Removed redundant discnumber tag from {} files in '{}'.",
            removed, folder
        ),
        Event::DiscTagRemovalFailed { file, error } => {
            format!("    [Error] Could not update tags for {}: {}", file, error)
        }
        Event::FileRenamesSkipped { folder } => format!(
            "  -> Skipping file renames for '{}' due to track gap or duplicate tracks.",
            folder
        ),
        Event::PlannedFile(rename) => format!(
            "  Plan file: '{}' -> '{}'",
            base(&rename.old_path),
            base(&rename.new_path)
        ),
        Event::PlannedFolder(rename) => format!(
            "Plan folder: '{}' -> '{}'",
            base(&rename.old_path),
            base(&rename.new_path)
        ),
        Event::AlreadyCorrect { folder } => format!("OK:   '{}' is already correct.", folder),
        Event::Conflict { folder, target } => format!(
            "  [Conflict] Folder '{}' already exists. Skipping rename for '{}'.",
            target, folder
        ),
    }
}

pub fn print_event(event: &Event) {
    println!("{}", render_event(event));
}

pub fn print_events(events: &[Event]) {
    events.iter().for_each(print_event);
}

fn render_outcome(kind: &str, outcome: &RenameOutcome) -> String {
    let old = base(&outcome.rename.old_path);
    match &outcome.error {
        None => format!("  Renamed {}: '{}' -> '{}'", kind, old, base(&outcome.rename.new_path)),
        Some(error) => format!("  Error renaming {} '{}': {}", kind, old, error),
    }
}

fn print_step(title: &str, kind: &str, outcomes: &[RenameOutcome]) {
    if outcomes.is_empty() {
        return;
    }
    println!("\n{}", title);
    for outcome in outcomes {
        println!("{}", render_outcome(kind, outcome));
    }
    let ok = outcomes.iter().filter(|o| o.is_ok()).count();
    println!("  {} renamed, {} failed", ok, outcomes.len() - ok);
}

pub fn print_execution(report: &ExecutionReport) {
    print_step("Step 1: Renaming files...", "file", &report.files);
    print_step("Step 2: Renaming folders...", "folder", &report.folders);
    println!("\nOrganization complete!");
}

pub fn warnings_table(warnings: &WarningSet) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Folder", "Warnings"]);
    for (folder, tags) in &warnings.by_folder {
        let labels: Vec<&str> = tags.iter().map(|w| w.label()).collect();
        table.add_row(vec![Cell::new(folder), Cell::new(labels.join(", "))]);
    }
    table
}

pub fn print_warnings(warnings: &WarningSet) {
    if warnings.is_empty() {
        return;
    }
    print_phase(4, "Warnings Found");

    let mut general = warnings.general.clone();
    general.sort();
    for warning in &general {
        println!("{}", warning);
    }

    if !warnings.by_folder.is_empty() {
        println!("{}", warnings_table(warnings));
    }
}
