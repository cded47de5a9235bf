use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::models::{FolderInfo, Rename};

/// 파일/폴더 이름에 사용할 수 없는 문자를 정리한다.
///
/// 경로 구분자는 파일 이름에서는 공백, 폴더 이름에서는 `" - "`로 바꾼다.
/// `<>:"|?*`는 지우고, 연속 공백은 하나로 줄이며, 앞뒤 공백과 점은 잘라낸다.
pub fn sanitize_filename(name: &str, is_path_component: bool) -> String {
    let separator = if is_path_component { " " } else { " - " };

    let mut replaced = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '/' | '\\' => replaced.push_str(separator),
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => {}
            c => replaced.push(c),
        }
    }

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_matches(|c| c == ' ' || c == '.').to_string()
}

/// Cross-folder duplicate pass.
///
/// Sorts `folders` by path, derives every `base_name` (year-suffixed when the
/// plain name is shared and a year is known) and then numbers every folder
/// whose base name is still shared, the first one included.
pub fn assign_final_names(folders: &mut [FolderInfo], numbering: &mut HashMap<String, usize>) {
    folders.sort_by(|a, b| a.path.cmp(&b.path));

    for info in folders.iter_mut() {
        info.base_name = sanitize_filename(&info.album, false);
        if info.base_name.is_empty() {
            info.base_name = sanitize_filename(&info.folder_name(), false);
        }
    }

    let shared = shared_names(folders);
    for info in folders.iter_mut() {
        if shared.contains(&info.base_name) {
            if let Some(year) = &info.year {
                info.base_name = format!("{} ({})", info.base_name, year);
            }
        }
    }

    let shared = shared_names(folders);
    for info in folders.iter_mut() {
        info.final_name = if shared.contains(&info.base_name) {
            let n = numbering.entry(info.base_name.clone()).or_insert(0);
            *n += 1;
            format!("{} ({})", info.base_name, n)
        } else {
            info.base_name.clone()
        };
    }
}

fn shared_names(folders: &[FolderInfo]) -> HashSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for info in folders {
        *counts.entry(info.base_name.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// `"3/12"` -> `"03"`
fn track_code(track: &str) -> String {
    format!("{:0>2}", number_head(track))
}

fn number_head(value: &str) -> &str {
    value.split('/').next().unwrap_or(value).trim()
}

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

fn fits(folder_name: &str, filename: &str, limit: usize) -> bool {
    folder_name.len() + 1 + filename.len() <= limit
}

/// 폴더 안의 파일 이름 변경 계획을 만든다.
///
/// 트랙 번호나 제목이 없는 파일, 그리고 디스크 태그가 일부 파일에만 있는 폴더는
/// 건드리지 않는다. `final_folder_name/name`이 `limit` 바이트를 넘으면 아티스트,
/// 그다음 제목 순서로 뺀다.
pub fn plan_file_renames(info: &FolderInfo, final_folder_name: &str, limit: usize) -> Vec<Rename> {
    let has_disc = info.uses_discs();
    if has_disc && info.lacks_discs() {
        return Vec::new();
    }

    let mut plan = Vec::new();
    let mut proposed: HashSet<String> = HashSet::new();

    for md in &info.files_metadata {
        let (track, title) = match (&md.track, &md.title) {
            (Some(track), Some(title)) => (track, title),
            _ => continue,
        };

        let code = match (has_disc, &md.disc) {
            (true, Some(disc)) => format!("{}-{}", number_head(disc), track_code(track)),
            _ => track_code(track),
        };
        let ext = extension_of(&md.filename);
        let title = sanitize_filename(title, true);
        let artist = md
            .artist
            .as_deref()
            .map(|a| sanitize_filename(a, true))
            .unwrap_or_default();

        let mut candidates = Vec::with_capacity(3);
        if !artist.is_empty() {
            candidates.push(format!("{} {} - {}", code, artist, title));
        }
        candidates.push(format!("{} - {}", code, title));
        candidates.push(code);

        let new_filename = pick_name(&candidates, &ext, &proposed, final_folder_name, limit);
        proposed.insert(new_filename.to_lowercase());

        if md.filename != new_filename {
            plan.push(Rename {
                old_path: info.path.join(&md.filename),
                new_path: info.path.join(&new_filename),
            });
        }
    }

    plan
}

/// 길이 제한에 맞는 첫 후보를 고르고, 이름이 겹치면 ` (k)`를 붙인다.
/// 접미사 때문에 길이를 넘으면 더 짧은 후보로 내려간다. 마지막 후보는 항상 사용한다.
fn pick_name(
    candidates: &[String],
    ext: &str,
    proposed: &HashSet<String>,
    folder_name: &str,
    limit: usize,
) -> String {
    let (shortest, longer) = match candidates.split_last() {
        Some(split) => split,
        None => return String::new(),
    };
    for base in longer {
        if !fits(folder_name, &format!("{base}{ext}"), limit) {
            continue;
        }
        let name = unique_name(base, ext, proposed);
        if fits(folder_name, &name, limit) {
            return name;
        }
    }
    unique_name(shortest, ext, proposed)
}

fn unique_name(base: &str, ext: &str, proposed: &HashSet<String>) -> String {
    let mut name = format!("{base}{ext}");
    let mut counter = 1;
    while proposed.contains(&name.to_lowercase()) {
        name = format!("{base} ({counter}){ext}");
        counter += 1;
    }
    name
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderPlan {
    Unchanged,
    Rename(Rename),
    /// Target name already exists in the parent or was claimed earlier.
    Conflict(PathBuf),
}

/// `parent_entries` is the parent's listing taken before any rename runs.
pub fn plan_folder_rename(
    info: &FolderInfo,
    parent_entries: &HashSet<String>,
    claimed: &HashSet<PathBuf>,
) -> FolderPlan {
    let parent = info.path.parent().unwrap_or_else(|| Path::new("."));
    let final_path = parent.join(&info.final_name);

    if final_path == info.path {
        return FolderPlan::Unchanged;
    }
    if parent_entries.contains(&info.final_name) || claimed.contains(&final_path) {
        return FolderPlan::Conflict(final_path);
    }
    FolderPlan::Rename(Rename {
        old_path: info.path.clone(),
        new_path: final_path,
    })
}
