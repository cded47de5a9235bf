use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::analyzer::analyze_album_folder;
use crate::core::renamer::{assign_final_names, plan_file_renames, plan_folder_rename, FolderPlan};
use crate::core::scanner::{decide_flatten, flatten_container, is_true_container, list_dir, DirWalker};
use crate::core::tagger::TagSource;
use crate::core::warnings::{blocks_file_renames, detect_warnings};
use crate::models::{Event, FlattenDecision, FolderInfo, RenamePlan, RunMode, Warning, WarningSet};

/// State of a single run. Dropped when the run ends.
#[derive(Debug, Default)]
pub struct RunContext {
    pub folders: Vec<FolderInfo>,
    pub numbering: HashMap<String, usize>,
    pub general_warnings: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PlanResult {
    pub plan: RenamePlan,
    pub warnings: WarningSet,
    pub events: Vec<Event>,
}

impl PlanResult {
    pub fn is_noop(&self) -> bool {
        self.plan.is_empty() && self.warnings.is_empty()
    }
}

pub type FlattenPrompt<'a> = Box<dyn FnMut(&str) -> FlattenDecision + 'a>;

pub struct Organizer<'a> {
    root: PathBuf,
    mode: RunMode,
    config: &'a Config,
    tags: &'a dyn TagSource,
    ask: FlattenPrompt<'a>,
}

impl<'a> Organizer<'a> {
    pub fn new(
        root: &Path,
        mode: RunMode,
        config: &'a Config,
        tags: &'a dyn TagSource,
        ask: FlattenPrompt<'a>,
    ) -> Result<Self> {
        if !root.is_dir() {
            bail!("The specified folder does not exist: {}", root.display());
        }
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };

        Ok(Self {
            root,
            mode,
            config,
            tags,
            ask,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Phase 1: classify folders, flatten accepted containers, analyze albums
    /// and run the cross-folder duplicate pass.
    ///
    /// Events reach `on_event` folder by folder, before the next flatten prompt.
    pub fn scan(&mut self, ctx: &mut RunContext, on_event: &mut dyn FnMut(Event)) {
        let mut events = Vec::new();
        let mut walker = DirWalker::new(&self.root);

        while let Some(listing) = walker.next() {
            events.drain(..).for_each(&mut *on_event);
            if listing.path == self.root {
                continue;
            }
            let name = folder_name(&listing.path);

            if !is_true_container(&listing, self.config) {
                self.analyze(&listing.path, &listing.files, ctx, &mut events);
                continue;
            }

            match decide_flatten(self.mode, &name, |n| (self.ask)(n)) {
                FlattenDecision::Yes => {
                    let result = flatten_container(&listing.path, &listing.dirs);
                    if !result.is_complete() {
                        for (child, error) in result.failures {
                            events.push(Event::FlattenFailed {
                                folder: name.clone(),
                                child,
                                error,
                            });
                        }
                        continue;
                    }

                    walker.prune();
                    events.push(Event::Flattened {
                        folder: name,
                        moved: result.moved,
                    });
                    match walker.rescan(&listing.path) {
                        Ok(fresh) => self.analyze(&fresh.path, &fresh.files, ctx, &mut events),
                        Err(e) => warn!("cannot re-list {}: {:#}", listing.path.display(), e),
                    }
                }
                FlattenDecision::No => {
                    debug!("container {} skipped", listing.path.display());
                    ctx.general_warnings
                        .push(format!("[Container Folder] '{}' was skipped.", name));
                    walker.prune();
                }
            }
        }

        events.drain(..).for_each(&mut *on_event);
        assign_final_names(&mut ctx.folders, &mut ctx.numbering);
    }

    fn analyze(&self, dir: &Path, files: &[String], ctx: &mut RunContext, events: &mut Vec<Event>) {
        if let Some(info) = analyze_album_folder(dir, files, self.config, self.tags, events) {
            ctx.folders.push(info);
        }
    }

    /// Phase 2: warnings and the frozen rename plan.
    ///
    /// Outside check-only mode redundant disc tags are stripped here, before
    /// the folder's file names are planned.
    pub fn plan(&self, ctx: &mut RunContext) -> PlanResult {
        let mut result = PlanResult::default();
        result.warnings.general = std::mem::take(&mut ctx.general_warnings);

        let mut claimed: HashSet<PathBuf> = HashSet::new();
        let mut parent_entries: HashMap<PathBuf, HashSet<String>> = HashMap::new();

        for info in ctx.folders.iter_mut() {
            let final_name = info.final_name.clone();

            let mut warnings = detect_warnings(info);
            if !self.mode.check_only && warnings.remove(&Warning::RedundantDisc) {
                self.strip_disc_tags(info, &mut result.events);
            }

            if blocks_file_renames(&warnings) {
                result.events.push(Event::FileRenamesSkipped {
                    folder: final_name.clone(),
                });
            } else {
                for rename in plan_file_renames(info, &final_name, self.config.path_limit_bytes) {
                    result.events.push(Event::PlannedFile(rename.clone()));
                    result.plan.files.push(rename);
                }
            }
            result.warnings.insert_folder(&final_name, warnings);

            let parent = info.path.parent().unwrap_or(self.root.as_path()).to_path_buf();
            let entries = parent_entries
                .entry(parent)
                .or_insert_with_key(|parent| snapshot_names(parent));

            match plan_folder_rename(info, entries, &claimed) {
                FolderPlan::Unchanged => result.events.push(Event::AlreadyCorrect {
                    folder: info.folder_name(),
                }),
                FolderPlan::Conflict(target) => {
                    warn!("folder {} already exists", target.display());
                    result.events.push(Event::Conflict {
                        folder: info.folder_name(),
                        target: final_name,
                    });
                }
                FolderPlan::Rename(rename) => {
                    claimed.insert(rename.new_path.clone());
                    result.events.push(Event::PlannedFolder(rename.clone()));
                    result.plan.folders.push(rename);
                }
            }
        }

        result
    }

    fn strip_disc_tags(&self, info: &mut FolderInfo, events: &mut Vec<Event>) {
        let mut removed = 0;
        for md in info.files_metadata.iter_mut() {
            let path = info.path.join(&md.filename);
            match self.tags.remove_disc_number(&path) {
                Ok(true) => {
                    md.disc = None;
                    removed += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("could not update tags for {}: {:#}", md.filename, e);
                    events.push(Event::DiscTagRemovalFailed {
                        file: md.filename.clone(),
                        error: format!("{:#}", e),
                    });
                }
            }
        }
        info!("removed {} disc tags in {}", removed, info.path.display());
        events.push(Event::DiscTagsRemoved {
            folder: info.final_name.clone(),
            removed,
        });
    }
}

fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Names present in `dir` before anything is renamed.
fn snapshot_names(dir: &Path) -> HashSet<String> {
    match list_dir(dir) {
        Ok(listing) => listing.dirs.into_iter().chain(listing.files).collect(),
        Err(e) => {
            warn!("cannot list {}: {:#}", dir.display(), e);
            HashSet::new()
        }
    }
}
