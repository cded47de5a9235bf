use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use crate::core::tagger::FileTags;

/// Per-file tag snapshot taken during the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioFileMetadata {
    pub filename: String,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub title: Option<String>,
    pub track: Option<String>,
    pub disc: Option<String>,
    /// Four-digit year taken from the date tag.
    pub year: Option<String>,
    /// Raw date tag when it is not a four-digit year.
    pub invalid_year_tag: Option<String>,
    pub cover_art_count: usize,
    pub cover_art_hash: Option<String>,
}

impl AudioFileMetadata {
    pub fn from_tags(filename: &str, tags: FileTags) -> Self {
        let (year, invalid_year_tag) = match tags.date.as_deref().map(str::trim) {
            Some(date) if is_four_digit_year(date) => (Some(date.to_string()), None),
            Some(date) => (None, Some(date.to_string())),
            None => (None, None),
        };

        Self {
            filename: filename.to_string(),
            album: tags.album,
            artist: tags.artist,
            album_artist: tags.album_artist,
            title: tags.title,
            track: tags.track_number,
            disc: tags.disc_number,
            year,
            invalid_year_tag,
            cover_art_count: tags.cover_count,
            cover_art_hash: tags.cover_hash,
        }
    }
}

fn is_four_digit_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

/// One album folder, as recorded by the scan and enriched by the duplicate pass.
#[derive(Debug, Clone)]
pub struct FolderInfo {
    pub path: PathBuf,
    pub files_metadata: Vec<AudioFileMetadata>,
    pub album: String,
    pub year: Option<String>,
    pub has_images: bool,
    pub base_name: String,
    pub final_name: String,
}

impl FolderInfo {
    pub fn folder_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn uses_discs(&self) -> bool {
        self.files_metadata.iter().any(|md| md.disc.is_some())
    }

    pub fn lacks_discs(&self) -> bool {
        self.files_metadata.iter().any(|md| md.disc.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub old_path: PathBuf,
    pub new_path: PathBuf,
}

/// Frozen rename plan. Built completely before anything is renamed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamePlan {
    pub files: Vec<Rename>,
    pub folders: Vec<Rename>,
}

impl RenamePlan {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Warning {
    NoImage,
    ZeroMetadata,
    InvalidYear,
    TrackNumberingStart,
    TrackGap,
    MultipleCovers,
    InconsistentCovers,
    MissingCover,
    MissingTitle,
    MissingArtist,
    MissingAlbum,
    MissingAlbumArtist,
    InconsistentAlbum,
    InconsistentDisc,
    RedundantDisc,
    DuplicateTrack,
}

impl Warning {
    pub fn label(&self) -> &'static str {
        match self {
            Warning::NoImage => "[No Image]",
            Warning::ZeroMetadata => "[Zero Metadata]",
            Warning::InvalidYear => "[Invalid Year]",
            Warning::TrackNumberingStart => "[Track Numbering Start]",
            Warning::TrackGap => "[Track Gap]",
            Warning::MultipleCovers => "[Multiple Covers]",
            Warning::InconsistentCovers => "[Inconsistent Covers]",
            Warning::MissingCover => "[Missing Cover]",
            Warning::MissingTitle => "[Missing Title]",
            Warning::MissingArtist => "[Missing Artist]",
            Warning::MissingAlbum => "[Missing Album]",
            Warning::MissingAlbumArtist => "[Missing Album Artist]",
            Warning::InconsistentAlbum => "[Inconsistent Album]",
            Warning::InconsistentDisc => "[Inconsistent Disc #]",
            Warning::RedundantDisc => "[Redundant Disc #]",
            Warning::DuplicateTrack => "[Duplicate Track]",
        }
    }
}

// Warnings sort by their printed label.
impl Ord for Warning {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.label().cmp(other.label())
    }
}

impl PartialOrd for Warning {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningSet {
    pub by_folder: BTreeMap<String, BTreeSet<Warning>>,
    pub general: Vec<String>,
}

impl WarningSet {
    pub fn insert_folder(&mut self, final_name: &str, warnings: BTreeSet<Warning>) {
        if warnings.is_empty() {
            return;
        }
        self.by_folder
            .entry(final_name.to_string())
            .or_default()
            .extend(warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.by_folder.is_empty() && self.general.is_empty()
    }
}

/// Progress item recorded by the engine and rendered by the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Analyzed {
        folder: String,
        album: String,
        year: Option<String>,
    },
    UnreadableFile {
        file: String,
        error: String,
    },
    Flattened {
        folder: String,
        moved: usize,
    },
    FlattenFailed {
        folder: String,
        child: String,
        error: String,
    },
    DiscTagsRemoved {
        folder: String,
        removed: usize,
    },
    DiscTagRemovalFailed {
        file: String,
        error: String,
    },
    FileRenamesSkipped {
        folder: String,
    },
    PlannedFile(Rename),
    PlannedFolder(Rename),
    AlreadyCorrect {
        folder: String,
    },
    Conflict {
        folder: String,
        target: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlattenDecision {
    Yes,
    No,
}

/// Run mode flags from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    pub check_only: bool,
    pub force_yes: bool,
    pub force_no: bool,
}
