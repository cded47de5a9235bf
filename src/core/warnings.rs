use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::models::{AudioFileMetadata, FolderInfo, Warning};

/// Runs every folder check and returns the union of their findings.
///
/// `[Redundant Disc #]` is reported whenever every file carries the same disc
/// tag; outside check-only mode the caller strips those tags instead of
/// keeping the warning.
pub fn detect_warnings(info: &FolderInfo) -> BTreeSet<Warning> {
    let files = &info.files_metadata;
    let mut warnings = BTreeSet::new();

    if !info.has_images {
        warnings.insert(Warning::NoImage);
    }
    if files
        .iter()
        .any(|md| md.track.as_deref() == Some("0") || md.disc.as_deref() == Some("0"))
    {
        warnings.insert(Warning::ZeroMetadata);
    }
    if files.iter().any(|md| md.invalid_year_tag.is_some()) {
        warnings.insert(Warning::InvalidYear);
    }

    warnings.extend(check_track_numbers(files));
    warnings.extend(check_cover_art(files));
    warnings.extend(check_missing_tags(files));

    let albums: HashSet<&str> = files.iter().filter_map(|md| md.album.as_deref()).collect();
    if albums.len() > 1 {
        warnings.insert(Warning::InconsistentAlbum);
    }

    if info.uses_discs() && info.lacks_discs() {
        warnings.insert(Warning::InconsistentDisc);
    } else if has_redundant_disc_tags(files) {
        warnings.insert(Warning::RedundantDisc);
    }

    if has_duplicate_tracks(files) {
        warnings.insert(Warning::DuplicateTrack);
    }

    warnings
}

/// True when every file has a disc tag and all of them are the same value.
pub fn has_redundant_disc_tags(files: &[AudioFileMetadata]) -> bool {
    let mut discs = files.iter().map(|md| md.disc.as_deref());
    match discs.next() {
        Some(Some(first)) => discs.all(|d| d == Some(first)),
        _ => false,
    }
}

/// File renames are skipped for folders with these findings.
pub fn blocks_file_renames(warnings: &BTreeSet<Warning>) -> bool {
    warnings.contains(&Warning::TrackGap) || warnings.contains(&Warning::DuplicateTrack)
}

fn parse_track(track: &str) -> Option<i64> {
    track.split('/').next().unwrap_or(track).trim().parse().ok()
}

/// Per disc (missing disc counts as "1"): start must be 1, no holes between
/// the lowest and highest track.
fn check_track_numbers(files: &[AudioFileMetadata]) -> BTreeSet<Warning> {
    let mut by_disc: BTreeMap<&str, BTreeSet<i64>> = BTreeMap::new();
    for md in files {
        let Some(track) = md.track.as_deref().and_then(parse_track) else {
            continue;
        };
        by_disc
            .entry(md.disc.as_deref().unwrap_or("1"))
            .or_default()
            .insert(track);
    }

    let mut warnings = BTreeSet::new();
    for tracks in by_disc.values() {
        let (Some(&min), Some(&max)) = (tracks.first(), tracks.last()) else {
            continue;
        };
        if min != 1 {
            warnings.insert(Warning::TrackNumberingStart);
        }
        if max.abs_diff(min) != tracks.len() as u64 - 1 {
            warnings.insert(Warning::TrackGap);
        }
    }
    warnings
}

fn check_cover_art(files: &[AudioFileMetadata]) -> BTreeSet<Warning> {
    let mut warnings = BTreeSet::new();
    if files.iter().any(|md| md.cover_art_count > 1) {
        warnings.insert(Warning::MultipleCovers);
    }

    let hashes: HashSet<&str> = files
        .iter()
        .filter_map(|md| md.cover_art_hash.as_deref())
        .collect();
    if hashes.len() > 1 {
        warnings.insert(Warning::InconsistentCovers);
    }

    let with_art = files.iter().filter(|md| md.cover_art_hash.is_some()).count();
    if with_art < files.len() {
        warnings.insert(Warning::MissingCover);
    }
    warnings
}

fn check_missing_tags(files: &[AudioFileMetadata]) -> BTreeSet<Warning> {
    let mut warnings = BTreeSet::new();
    for md in files {
        if md.title.is_none() {
            warnings.insert(Warning::MissingTitle);
        }
        if md.artist.is_none() {
            warnings.insert(Warning::MissingArtist);
        }
        if md.album.is_none() {
            warnings.insert(Warning::MissingAlbum);
        }
        if md.album_artist.is_none() {
            warnings.insert(Warning::MissingAlbumArtist);
        }
    }
    warnings
}

fn has_duplicate_tracks(files: &[AudioFileMetadata]) -> bool {
    let mut seen: HashMap<(&str, Option<&str>), usize> = HashMap::new();
    for md in files {
        if let Some(track) = md.track.as_deref() {
            *seen.entry((track, md.disc.as_deref())).or_insert(0) += 1;
        }
    }
    seen.values().any(|n| *n > 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn md(track: &str) -> AudioFileMetadata {
        AudioFileMetadata {
            filename: format!("{track}.mp3"),
            album: Some("Foo".to_string()),
            artist: Some("Bar".to_string()),
            album_artist: Some("Bar".to_string()),
            title: Some(format!("T{track}")),
            track: Some(track.to_string()),
            cover_art_count: 1,
            cover_art_hash: Some("abc".to_string()),
            ..Default::default()
        }
    }

    fn with_disc(mut md: AudioFileMetadata, disc: &str) -> AudioFileMetadata {
        md.disc = Some(disc.to_string());
        md
    }

    fn folder(files: Vec<AudioFileMetadata>) -> FolderInfo {
        FolderInfo {
            path: PathBuf::from("/music/Foo"),
            files_metadata: files,
            album: "Foo".to_string(),
            year: None,
            has_images: true,
            base_name: "Foo".to_string(),
            final_name: "Foo".to_string(),
        }
    }

    fn tracks_warnings(tracks: &[&str]) -> BTreeSet<Warning> {
        detect_warnings(&folder(tracks.iter().map(|t| md(t)).collect()))
    }

    #[test]
    fn test_clean_folder_has_no_warnings() {
        assert!(tracks_warnings(&["1", "2", "3"]).is_empty());
    }

    #[test]
    fn test_track_gap() {
        let w = tracks_warnings(&["1", "2", "4"]);
        assert!(w.contains(&Warning::TrackGap));
        assert!(!w.contains(&Warning::TrackNumberingStart));
        assert!(blocks_file_renames(&w));
    }

    #[test]
    fn test_track_numbering_start() {
        let w = tracks_warnings(&["2", "3", "4"]);
        assert!(w.contains(&Warning::TrackNumberingStart));
        assert!(!w.contains(&Warning::TrackGap));
        assert!(!blocks_file_renames(&w));
    }

    #[test]
    fn test_track_with_total_and_non_numeric() {
        let w = tracks_warnings(&["1/3", "2/3", "3/3", "B-side"]);
        assert!(!w.contains(&Warning::TrackGap));
        assert!(!w.contains(&Warning::TrackNumberingStart));
    }

    #[test]
    fn test_track_gap_with_extreme_numbers() {
        let w = tracks_warnings(&["-9223372036854775808", "1"]);
        assert!(w.contains(&Warning::TrackGap));
        assert!(w.contains(&Warning::TrackNumberingStart));

        let w = tracks_warnings(&["-9223372036854775808", "9223372036854775807"]);
        assert!(w.contains(&Warning::TrackGap));
    }

    #[test]
    fn test_gap_checked_per_disc() {
        let files = vec![
            with_disc(md("1"), "1"),
            with_disc(md("2"), "1"),
            with_disc(md("1"), "2"),
            with_disc(md("3"), "2"),
        ];
        let w = detect_warnings(&folder(files));
        assert!(w.contains(&Warning::TrackGap));
        assert!(!w.contains(&Warning::DuplicateTrack));
    }

    #[test]
    fn test_zero_metadata() {
        let w = detect_warnings(&folder(vec![with_disc(md("1"), "0")]));
        assert!(w.contains(&Warning::ZeroMetadata));
        assert!(tracks_warnings(&["0", "1"]).contains(&Warning::ZeroMetadata));
    }

    #[test]
    fn test_invalid_year_and_no_image() {
        let mut file = md("1");
        file.invalid_year_tag = Some("19xx".to_string());
        let mut info = folder(vec![file]);
        info.has_images = false;
        let w = detect_warnings(&info);
        assert!(w.contains(&Warning::InvalidYear));
        assert!(w.contains(&Warning::NoImage));
    }

    #[test]
    fn test_cover_checks() {
        let mut a = md("1");
        a.cover_art_count = 2;
        let mut b = md("2");
        b.cover_art_hash = Some("def".to_string());
        let mut c = md("3");
        c.cover_art_count = 0;
        c.cover_art_hash = None;
        let w = detect_warnings(&folder(vec![a, b, c]));
        assert!(w.contains(&Warning::MultipleCovers));
        assert!(w.contains(&Warning::InconsistentCovers));
        assert!(w.contains(&Warning::MissingCover));
    }

    #[test]
    fn test_missing_tags_each_field() {
        let mut a = md("1");
        a.title = None;
        let mut b = md("2");
        b.album_artist = None;
        let w = detect_warnings(&folder(vec![a, b]));
        assert!(w.contains(&Warning::MissingTitle));
        assert!(w.contains(&Warning::MissingAlbumArtist));
        assert!(!w.contains(&Warning::MissingArtist));
        assert!(!w.contains(&Warning::MissingAlbum));
    }

    #[test]
    fn test_inconsistent_album() {
        let mut b = md("2");
        b.album = Some("Foo (Deluxe)".to_string());
        let w = detect_warnings(&folder(vec![md("1"), b]));
        assert!(w.contains(&Warning::InconsistentAlbum));
    }

    #[test]
    fn test_disc_consistency() {
        let mixed = detect_warnings(&folder(vec![with_disc(md("1"), "1"), md("2")]));
        assert!(mixed.contains(&Warning::InconsistentDisc));
        assert!(!mixed.contains(&Warning::RedundantDisc));

        let same = detect_warnings(&folder(vec![with_disc(md("1"), "1"), with_disc(md("2"), "1")]));
        assert!(same.contains(&Warning::RedundantDisc));
        assert!(!same.contains(&Warning::InconsistentDisc));

        let two_discs = vec![with_disc(md("1"), "1"), with_disc(md("1"), "2")];
        assert!(!has_redundant_disc_tags(&two_discs));
    }

    #[test]
    fn test_duplicate_track() {
        let w = tracks_warnings(&["1", "2", "2"]);
        assert!(w.contains(&Warning::DuplicateTrack));
        assert!(blocks_file_renames(&w));
    }
}
