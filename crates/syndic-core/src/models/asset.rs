use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// Type tag adapters use to decide whether they can handle an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Video,
    Image,
    Audio,
    Document,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Video,
        AssetKind::Image,
        AssetKind::Audio,
        AssetKind::Document,
    ];

    /// Guess the kind from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "mp4" | "mov" | "m4v" | "mkv" | "webm" | "avi" | "mpeg" | "mpg" => {
                Some(AssetKind::Video)
            }
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "tiff" | "bmp" => Some(AssetKind::Image),
            "mp3" | "wav" | "flac" | "ogg" | "m4a" | "aac" => Some(AssetKind::Audio),
            "pdf" | "doc" | "docx" | "odt" | "txt" => Some(AssetKind::Document),
            _ => None,
        }
    }
}

impl FromStr for AssetKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(AssetKind::Video),
            "image" => Ok(AssetKind::Image),
            "audio" => Ok(AssetKind::Audio),
            "document" => Ok(AssetKind::Document),
            _ => Err(CoreError::InvalidInput(format!("Invalid asset kind: {}", s))),
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AssetKind::Video => write!(f, "video"),
            AssetKind::Image => write!(f, "image"),
            AssetKind::Audio => write!(f, "audio"),
            AssetKind::Document => write!(f, "document"),
        }
    }
}

/// A distributable media unit.
///
/// The identity is the cache key for the identifier map and must stay stable
/// across runs; the path only locates the content for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    id: String,
    kind: AssetKind,
    path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Asset {
    pub fn new(id: impl Into<String>, kind: AssetKind, path: impl Into<PathBuf>) -> CoreResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "Asset identity cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id,
            kind,
            path: path.into(),
            title: None,
            description: None,
        })
    }

    pub fn video(id: impl Into<String>, path: impl Into<PathBuf>) -> CoreResult<Self> {
        Self::new(id, AssetKind::Video, path)
    }

    pub fn image(id: impl Into<String>, path: impl Into<PathBuf>) -> CoreResult<Self> {
        Self::new(id, AssetKind::Image, path)
    }

    pub fn audio(id: impl Into<String>, path: impl Into<PathBuf>) -> CoreResult<Self> {
        Self::new(id, AssetKind::Audio, path)
    }

    /// Build an asset from a file, guessing the kind from its extension.
    pub fn from_file(id: impl Into<String>, path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let kind = AssetKind::from_path(&path).ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "Cannot infer asset kind from {}",
                path.display()
            ))
        })?;
        Self::new(id, kind, path)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_video(&self) -> bool {
        self.kind == AssetKind::Video
    }

    /// File name of the content locator, used as the upload part name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .unwrap_or_else(|| self.id.clone())
    }

    pub fn content_type(&self) -> &'static str {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "mp4" | "m4v" => "video/mp4",
            "mov" => "video/quicktime",
            "webm" => "video/webm",
            "mkv" => "video/x-matroska",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "flac" => "audio/flac",
            "ogg" => "audio/ogg",
            "pdf" => "application/pdf",
            _ => "application/octet-stream",
        }
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.id)
    }
}
