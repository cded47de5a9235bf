use std::path::Path;

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::core::scanner::list_dir;
use crate::models::{Rename, RenamePlan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub rename: Rename,
    /// `None` on success, otherwise the reason it failed.
    pub error: Option<String>,
}

impl RenameOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub files: Vec<RenameOutcome>,
    pub folders: Vec<RenameOutcome>,
}

/// Applies the plan: every file rename first, then folder renames deepest
/// path first. Failures are collected and never stop the batch.
pub fn execute_plan(plan: &RenamePlan) -> ExecutionReport {
    let files = plan.files.iter().map(apply).collect();

    let mut folders: Vec<&Rename> = plan.folders.iter().collect();
    folders.sort_by(|a, b| {
        let a_len = a.old_path.as_os_str().len();
        let b_len = b.old_path.as_os_str().len();
        b_len.cmp(&a_len)
    });
    let folders = folders.into_iter().map(apply).collect();

    ExecutionReport { files, folders }
}

fn apply(rename: &Rename) -> RenameOutcome {
    let error = match rename_entry(&rename.old_path, &rename.new_path) {
        Ok(()) => {
            info!(
                "renamed {} -> {}",
                rename.old_path.display(),
                rename.new_path.display()
            );
            None
        }
        Err(e) => {
            warn!("rename of {} failed: {:#}", rename.old_path.display(), e);
            Some(format!("{:#}", e))
        }
    };
    RenameOutcome {
        rename: rename.clone(),
        error,
    }
}

/// 기존 항목을 덮어쓰지 않는다. 대소문자만 바뀌는 경우는 대상이 원본과 같은
/// 항목일 때만 허용한다.
fn rename_entry(old: &Path, new: &Path) -> Result<()> {
    if new.exists() {
        let case_only = same_ignoring_case(old, new) && !exact_name_exists(new)?;
        if !case_only {
            bail!("destination already exists: {}", new.display());
        }
    }
    std::fs::rename(old, new)?;
    Ok(())
}

/// 대소문자를 구분하지 않는 파일 시스템에서 `exists()`는 원본을 가리킬 수 있다.
/// 부모 목록에 정확히 같은 이름이 있으면 별개의 항목이다.
fn exact_name_exists(path: &Path) -> Result<bool> {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name().and_then(|n| n.to_str())) else {
        return Ok(true);
    };
    let listing = list_dir(parent)?;
    Ok(listing.dirs.iter().chain(listing.files.iter()).any(|n| n == name))
}

fn same_ignoring_case(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}
