//! Fake tag backend for tests. Each fake audio file holds its tags as TOML,
//! so tags travel with the file across renames.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::tagger::{FileTags, TagSource};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FakeTrack {
    pub album: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub track: Option<String>,
    pub disc: Option<String>,
    #[serde(default)]
    pub covers: Vec<String>,
}

impl FakeTrack {
    /// Fully tagged track with one cover.
    pub fn new(album: &str, artist: &str, title: &str, track: &str) -> Self {
        Self {
            album: Some(album.to_string()),
            artist: Some(artist.to_string()),
            album_artist: Some(artist.to_string()),
            title: Some(title.to_string()),
            track: Some(track.to_string()),
            covers: vec!["cover".to_string()],
            ..Default::default()
        }
    }

    pub fn year(mut self, year: &str) -> Self {
        self.date = Some(year.to_string());
        self
    }

    pub fn disc(mut self, disc: &str) -> Self {
        self.disc = Some(disc.to_string());
        self
    }
}

pub fn write_track(dir: &Path, name: &str, track: &FakeTrack) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), toml::to_string(track).unwrap()).unwrap();
}

pub struct FakeTags;

impl TagSource for FakeTags {
    fn read_tags(&self, path: &Path) -> Result<FileTags> {
        let content = std::fs::read_to_string(path)?;
        let track: FakeTrack =
            toml::from_str(&content).with_context(|| format!("bad tags in {}", path.display()))?;
        Ok(FileTags {
            album: track.album,
            artist: track.artist,
            album_artist: track.album_artist,
            title: track.title,
            date: track.date,
            track_number: track.track,
            disc_number: track.disc,
            cover_count: track.covers.len(),
            cover_hash: track.covers.first().cloned(),
        })
    }

    fn remove_disc_number(&self, path: &Path) -> Result<bool> {
        let content = std::fs::read_to_string(path)?;
        let mut track: FakeTrack = toml::from_str(&content)?;
        if track.disc.take().is_none() {
            return Ok(false);
        }
        std::fs::write(path, toml::to_string(&track)?)?;
        Ok(true)
    }
}

/// Same as [`FakeTags`], but saving tags fails for the listed file names.
pub struct LockedTags(pub Vec<String>);

impl TagSource for LockedTags {
    fn read_tags(&self, path: &Path) -> Result<FileTags> {
        FakeTags.read_tags(path)
    }

    fn remove_disc_number(&self, path: &Path) -> Result<bool> {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        if name.map_or(false, |n| self.0.contains(&n)) {
            bail!("{} is read-only", path.display());
        }
        FakeTags.remove_disc_number(path)
    }
}
