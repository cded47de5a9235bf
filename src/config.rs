use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

pub const PATH_LENGTH_LIMIT_BYTES: usize = 230;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
    /// Byte budget for `folder_name/file_name`.
    pub path_limit_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio_extensions: [".mp3", ".flac", ".m4a", ".ogg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            image_extensions: [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tif", ".tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            path_limit_bytes: PATH_LENGTH_LIMIT_BYTES,
        }
    }
}

impl Config {
    /// 파일명이 지원되는 오디오 확장자로 끝나는지 확인한다 (대소문자 무시).
    pub fn is_audio(&self, filename: &str) -> bool {
        has_extension(filename, &self.audio_extensions)
    }

    pub fn is_image(&self, filename: &str) -> bool {
        has_extension(filename, &self.image_extensions)
    }
}

fn has_extension(filename: &str, extensions: &[String]) -> bool {
    let lower = filename.to_lowercase();
    extensions
        .iter()
        .any(|ext| lower.ends_with(&ext.to_lowercase()))
}

pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("music-organizer")
        .join("config.toml")
}

/// 설정 파일을 읽는다. 파일이 없거나 읽을 수 없으면 기본값을 사용한다.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            warn!("ignoring invalid config {}: {}", path.display(), e);
            Config::default()
        }),
        Err(e) => {
            warn!("cannot read config {}: {}", path.display(), e);
            Config::default()
        }
    }
}
