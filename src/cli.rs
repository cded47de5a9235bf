use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Confirm, Input};
use tracing::{info, warn};

use crate::config;
use crate::core::executor::execute_plan;
use crate::core::organizer::{Organizer, RunContext};
use crate::core::tagger::LoftyTags;
use crate::models::{Event, FlattenDecision, RunMode};
use crate::report;

#[derive(Parser)]
#[command(
    name = "music-organizer",
    about = "Rename, flatten and check album folders from their audio tags"
)]
pub struct Cli {
    /// Music library root (prompted for when omitted)
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Plan and report only; implies declining every flatten prompt
    #[arg(short = 'c', long = "check")]
    pub check: bool,

    /// Flatten every container folder without asking
    #[arg(short = 'y', long = "force-yes")]
    pub force_yes: bool,

    /// Never flatten container folders
    #[arg(short = 'n', long = "force-no")]
    pub force_no: bool,

    /// Config file (default: ~/.config/music-organizer/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn mode(&self) -> RunMode {
        RunMode {
            check_only: self.check,
            force_yes: self.force_yes,
            force_no: self.force_no,
        }
    }
}

/// Interactive flatten confirmation. Prompt errors count as "no".
fn confirm_flatten(folder_name: &str) -> FlattenDecision {
    let answer = Confirm::new()
        .with_prompt(format!("Container folder '{}' found. Flatten?", folder_name))
        .default(false)
        .interact();

    match answer {
        Ok(true) => FlattenDecision::Yes,
        Ok(false) => FlattenDecision::No,
        Err(e) => {
            warn!("flatten prompt failed: {}", e);
            println!("\nCancelled.");
            FlattenDecision::No
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => {
            let input: String = Input::new()
                .with_prompt("Enter path to music folder")
                .interact_text()
                .context("no music folder given")?;
            PathBuf::from(input.trim())
        }
    };

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path);
    let mode = cli.mode();

    report::print_mode_banners(mode);

    let tags = LoftyTags;
    let mut organizer = Organizer::new(&root, mode, &cfg, &tags, Box::new(confirm_flatten))?;
    info!("organizing {}", organizer.root().display());

    let mut ctx = RunContext::default();

    report::print_phase(1, "Analyzing Folders & Potential Names");
    organizer.scan(&mut ctx, &mut |event: Event| report::print_event(&event));

    report::print_phase(2, "Planning Renames & Final Checks");
    let planned = organizer.plan(&mut ctx);
    report::print_events(&planned.events);

    if planned.is_noop() {
        println!("\nScan complete. No changes needed.");
    } else if mode.check_only {
        println!("\nCheck-only mode is active. No files or folders will be changed.");
        println!("Scan complete.");
    } else {
        report::print_phase(3, "Executing Changes");
        let outcome = execute_plan(&planned.plan);
        report::print_execution(&outcome);
    }

    report::print_warnings(&planned.warnings);
    Ok(())
}
