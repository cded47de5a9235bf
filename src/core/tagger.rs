use std::path::Path;

use anyhow::{Context, Result};
use lofty::config::WriteOptions;
use lofty::picture::Picture;
use lofty::prelude::{AudioFile, ItemKey, TaggedFileExt};
use lofty::tag::Tag;

/// Raw tag values of one audio file. Absent tags are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTags {
    pub album: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub track_number: Option<String>,
    pub disc_number: Option<String>,
    pub cover_count: usize,
    /// blake3 hex digest of the first embedded picture.
    pub cover_hash: Option<String>,
}

/// 오디오 태그 읽기/쓰기 백엔드.
///
/// 태그가 없는 파일은 빈 필드로 `Ok`를 돌려주고, 파일 자체를 해석할 수 없을
/// 때만 `Err`를 돌려준다. 호출자는 그 파일만 제외하면 된다.
pub trait TagSource {
    fn read_tags(&self, path: &Path) -> Result<FileTags>;

    /// Removes the disc number tag and saves the file.
    /// Returns `false` when the file had no disc tag.
    fn remove_disc_number(&self, path: &Path) -> Result<bool>;
}

/// lofty 기반 TagSource.
pub struct LoftyTags;

impl TagSource for LoftyTags {
    fn read_tags(&self, path: &Path) -> Result<FileTags> {
        let tagged_file = lofty::read_from_path(path)
            .with_context(|| format!("cannot read tags from {}", path.display()))?;

        let tag = match tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
        {
            Some(tag) => tag,
            None => return Ok(FileTags::default()),
        };

        let pictures = tag.pictures();

        Ok(FileTags {
            album: text(tag, &ItemKey::AlbumTitle),
            artist: text(tag, &ItemKey::TrackArtist),
            album_artist: text(tag, &ItemKey::AlbumArtist),
            title: text(tag, &ItemKey::TrackTitle),
            date: text(tag, &ItemKey::RecordingDate).or_else(|| text(tag, &ItemKey::Year)),
            track_number: text(tag, &ItemKey::TrackNumber),
            disc_number: text(tag, &ItemKey::DiscNumber),
            cover_count: pictures.len(),
            cover_hash: pictures.first().map(picture_hash),
        })
    }

    fn remove_disc_number(&self, path: &Path) -> Result<bool> {
        let mut tagged_file = lofty::read_from_path(path)
            .with_context(|| format!("cannot read tags from {}", path.display()))?;

        let tag_type = match tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
        {
            Some(tag) => tag.tag_type(),
            None => return Ok(false),
        };

        let removed = match tagged_file.tag_mut(tag_type) {
            Some(tag) if tag.get_string(&ItemKey::DiscNumber).is_some() => {
                tag.remove_key(&ItemKey::DiscNumber);
                true
            }
            _ => false,
        };

        if removed {
            tagged_file
                .save_to_path(path, WriteOptions::default())
                .with_context(|| format!("cannot save tags to {}", path.display()))?;
        }
        Ok(removed)
    }
}

/// Non-empty text value of a tag item.
fn text(tag: &Tag, key: &ItemKey) -> Option<String> {
    tag.get_string(key)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn picture_hash(picture: &Picture) -> String {
    blake3::hash(picture.data()).to_hex().to_string()
}
