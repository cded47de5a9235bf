use std::path::Path;

use tracing::{debug, warn};

use crate::config::Config;
use crate::core::tagger::TagSource;
use crate::models::{AudioFileMetadata, Event, FolderInfo};

/// Most frequent value. Ties go to the value seen first.
pub fn most_common<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((value, n));
        }
    }
    best.map(|(v, _)| v.to_string())
}

/// 앨범 폴더 하나를 분석한다.
///
/// 지원되는 오디오 파일을 모두 읽고, 읽을 수 없는 파일은 보고한 뒤 투표에서
/// 뺀다. 읽을 수 있는 오디오 파일이 하나도 없으면 `None`을 돌려준다.
pub fn analyze_album_folder(
    dir: &Path,
    filenames: &[String],
    config: &Config,
    tags: &dyn TagSource,
    events: &mut Vec<Event>,
) -> Option<FolderInfo> {
    let audio_files: Vec<&String> = filenames.iter().filter(|f| config.is_audio(f)).collect();
    if audio_files.is_empty() {
        return None;
    }

    let folder = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!("analyzing {}", dir.display());

    let mut files_metadata = Vec::new();
    for filename in audio_files {
        match tags.read_tags(&dir.join(filename)) {
            Ok(file_tags) => files_metadata.push(AudioFileMetadata::from_tags(filename, file_tags)),
            Err(e) => {
                warn!("could not read metadata from {}: {:#}", filename, e);
                events.push(Event::UnreadableFile {
                    file: filename.clone(),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    if files_metadata.is_empty() {
        return None;
    }

    let (album, year) = match most_common(files_metadata.iter().filter_map(|md| md.album.as_deref())) {
        Some(album) => {
            let year = most_common(
                files_metadata
                    .iter()
                    .filter(|md| md.album.as_deref() == Some(album.as_str()))
                    .filter_map(|md| md.year.as_deref()),
            );
            (album, year)
        }
        None => (folder.clone(), None),
    };

    events.push(Event::Analyzed {
        folder,
        album: album.clone(),
        year: year.clone(),
    });

    Some(FolderInfo {
        path: dir.to_path_buf(),
        files_metadata,
        album,
        year,
        has_images: filenames.iter().any(|f| config.is_image(f)),
        base_name: String::new(),
        final_name: String::new(),
    })
}
