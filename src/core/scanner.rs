use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::models::{FlattenDecision, RunMode};

/// Immediate children of one directory, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub path: PathBuf,
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

/// 디렉토리의 직계 항목을 읽는다.
pub fn list_dir(path: &Path) -> Result<DirListing> {
    let mut listing = DirListing {
        path: path.to_path_buf(),
        ..Default::default()
    };

    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("cannot list {}", path.display()))?;
        let name = match entry.file_name().to_str() {
            Some(name) => name.to_string(),
            None => {
                warn!("skipping non UTF-8 name in {}", path.display());
                continue;
            }
        };
        if entry.file_type().is_dir() {
            listing.dirs.push(name);
        } else {
            listing.files.push(name);
        }
    }

    Ok(listing)
}

/// Lazy depth-first walk yielding one [`DirListing`] per directory.
///
/// The subdirectories of the listing just yielded are only queued when the
/// next listing is requested, so [`DirWalker::prune`] can drop them.
pub struct DirWalker {
    stack: Vec<PathBuf>,
    pending: Vec<PathBuf>,
}

impl DirWalker {
    pub fn new(root: &Path) -> Self {
        Self {
            stack: vec![root.to_path_buf()],
            pending: Vec::new(),
        }
    }

    /// Skip the subtree below the directory yielded last.
    pub fn prune(&mut self) {
        self.pending.clear();
    }

    /// Fresh listing of a directory that was reshaped during the walk.
    pub fn rescan(&self, path: &Path) -> Result<DirListing> {
        list_dir(path)
    }
}

impl Iterator for DirWalker {
    type Item = DirListing;

    fn next(&mut self) -> Option<DirListing> {
        // Reverse so the first child by name is visited first.
        self.stack.extend(self.pending.drain(..).rev());

        while let Some(path) = self.stack.pop() {
            match list_dir(&path) {
                Ok(listing) => {
                    self.pending = listing.dirs.iter().map(|d| path.join(d)).collect();
                    return Some(listing);
                }
                Err(e) => warn!("skipping {}: {:#}", path.display(), e),
            }
        }
        None
    }
}

/// A directory is a container when any direct child directory holds a
/// supported audio file. Only one level is inspected.
pub fn is_true_container(listing: &DirListing, config: &Config) -> bool {
    listing.dirs.iter().any(|dir| {
        match list_dir(&listing.path.join(dir)) {
            Ok(child) => child.files.iter().any(|f| config.is_audio(f)),
            Err(e) => {
                debug!("cannot inspect {}: {:#}", dir, e);
                false
            }
        }
    })
}

/// 평탄화 여부를 결정한다.
///
/// 검사 전용 모드와 force-no는 항상 거절하고, force-yes는 항상 수락한다.
/// 나머지 경우는 `ask`에게 묻는다.
pub fn decide_flatten(
    mode: RunMode,
    folder_name: &str,
    ask: impl FnOnce(&str) -> FlattenDecision,
) -> FlattenDecision {
    if mode.check_only || mode.force_no {
        FlattenDecision::No
    } else if mode.force_yes {
        FlattenDecision::Yes
    } else {
        ask(folder_name)
    }
}

#[derive(Debug, Default)]
pub struct FlattenResult {
    pub moved: usize,
    /// (child directory, error) for every child whose flatten stopped early.
    pub failures: Vec<(String, String)>,
}

impl FlattenResult {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Moves everything from each child directory into `dir` and removes the
/// emptied children. A failure stops that child only; nothing is rolled back.
pub fn flatten_container(dir: &Path, children: &[String]) -> FlattenResult {
    let mut result = FlattenResult::default();
    for child in children {
        match flatten_child(dir, child, &mut result.moved) {
            Ok(()) => debug!("flattened {} into {}", child, dir.display()),
            Err(e) => {
                warn!("failed to flatten {}: {:#}", child, e);
                result.failures.push((child.clone(), format!("{:#}", e)));
            }
        }
    }
    result
}

fn flatten_child(dir: &Path, child: &str, moved: &mut usize) -> Result<()> {
    let child_path = dir.join(child);
    let listing = list_dir(&child_path)?;

    for name in listing.dirs.iter().chain(listing.files.iter()) {
        let source = child_path.join(name);
        let dest = unique_destination(dir, name);
        std::fs::rename(&source, &dest)
            .with_context(|| format!("cannot move {}", source.display()))?;
        *moved += 1;
    }

    std::fs::remove_dir(&child_path)
        .with_context(|| format!("cannot remove {}", child_path.display()))?;
    Ok(())
}

/// `name`, or `stem (k).ext` with the first free `k` starting at 1.
fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let mut dest = dir.join(name);
    if !dest.exists() {
        return dest;
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    while dest.exists() {
        dest = dir.join(format!("{stem} ({counter}){ext}"));
        counter += 1;
    }
    dest
}
