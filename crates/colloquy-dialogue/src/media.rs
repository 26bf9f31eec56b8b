// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk storage for downloaded media.
//!
//! Files land in `<root>/<folder>/<uuid>.<ext>`, where the folder comes from
//! the media kind and the extension from the MIME type when it names one.
//! Files that have served their purpose are removed unless the deployment
//! opts into keeping them.

use std::path::{Path, PathBuf};

use colloquy_config::model::MediaConfig;
use colloquy_core::ColloquyError;
use colloquy_core::types::MediaKind;
use tracing::{debug, warn};

/// Maps a MIME type to a file extension, when it is one we recognise.
pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let ext = match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "video/mp4" => "mp4",
        "video/3gpp" => "3gp",
        "video/quicktime" => "mov",
        "audio/ogg" => "ogg",
        "audio/mpeg" => "mp3",
        "audio/mp4" => "m4a",
        "audio/aac" => "aac",
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        "text/csv" => "csv",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "application/vnd.ms-excel" => "xls",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => "xlsx",
        "application/zip" => "zip",
        _ => return None,
    };
    Some(ext)
}

/// MIME type for a stored file, inferred from its extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "3gp" => "video/3gpp",
        "mov" => "video/quicktime",
        "ogg" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Directory tree holding downloaded media.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    retain_consumed: bool,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, retain_consumed: bool) -> Self {
        Self {
            root: root.into(),
            retain_consumed,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(&config.directory, config.retain_consumed_files)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Target path for a new file of `kind`. Audio is always `.ogg`.
    pub fn path_for(&self, kind: MediaKind, mime_type: Option<&str>) -> PathBuf {
        let ext = match kind {
            MediaKind::Audio => "ogg",
            _ => mime_type
                .and_then(extension_for_mime)
                .unwrap_or_else(|| kind.default_extension()),
        };
        self.root
            .join(kind.folder())
            .join(format!("{}.{ext}", uuid::Uuid::new_v4().simple()))
    }

    /// Writes `data` under a fresh name. Empty payloads are rejected.
    pub async fn save(
        &self,
        kind: MediaKind,
        mime_type: Option<&str>,
        data: &[u8],
    ) -> Result<PathBuf, ColloquyError> {
        if data.is_empty() {
            return Err(ColloquyError::Transport {
                message: "downloaded media is empty".into(),
                source: None,
            });
        }

        let path = self.path_for(kind, mime_type);
        self.write(&path, data).await?;
        Ok(path)
    }

    /// Writes `data` at a path previously chosen with [`MediaStore::path_for`].
    pub async fn write(&self, path: &Path, data: &[u8]) -> Result<(), ColloquyError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ColloquyError::storage)?;
        }
        tokio::fs::write(path, data)
            .await
            .map_err(ColloquyError::storage)?;
        debug!(path = %path.display(), bytes = data.len(), "media saved");
        Ok(())
    }

    /// Removes a file that is no longer needed, unless retention is on.
    pub async fn discard(&self, path: &Path) {
        if self.retain_consumed {
            return;
        }
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "media file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove media file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_extension_table() {
        assert_eq!(extension_for_mime("image/png"), Some("png"));
        assert_eq!(extension_for_mime("application/pdf"), Some("pdf"));
        assert_eq!(extension_for_mime("audio/ogg; codecs=opus"), Some("ogg"));
        assert_eq!(extension_for_mime("application/x-unknown"), None);
    }

    #[test]
    fn mime_from_stored_extension() {
        assert_eq!(mime_for_path(Path::new("/m/imagens/a.jpg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("/m/documentos/a.PDF")), "application/pdf");
        assert_eq!(
            mime_for_path(Path::new("/m/documentos/a.bin")),
            "application/octet-stream"
        );
    }

    #[test]
    fn path_uses_kind_folder_and_fallback_extension() {
        let store = MediaStore::new("/media", false);
        let image = store.path_for(MediaKind::Image, Some("image/png"));
        assert!(image.starts_with("/media/imagens"));
        assert_eq!(image.extension().unwrap(), "png");

        let doc = store.path_for(MediaKind::Document, Some("application/x-weird"));
        assert!(doc.starts_with("/media/documentos"));
        assert_eq!(doc.extension().unwrap(), "bin");

        let audio = store.path_for(MediaKind::Audio, Some("audio/mpeg"));
        assert!(audio.starts_with("/media/audios"));
        assert_eq!(audio.extension().unwrap(), "ogg");

        let video = store.path_for(MediaKind::Video, None);
        assert_eq!(video.extension().unwrap(), "mp4");
    }

    #[tokio::test]
    async fn save_and_discard() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path(), false);
        let path = store
            .save(MediaKind::Image, Some("image/jpeg"), b"jpeg")
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg");

        store.discard(&path).await;
        assert!(!path.exists());
        // Discarding twice is harmless.
        store.discard(&path).await;
    }

    #[tokio::test]
    async fn retention_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path(), true);
        let path = store.save(MediaKind::Document, None, b"%PDF").await.unwrap();
        store.discard(&path).await;
        assert!(path.exists());
    }

    #[tokio::test]
    async fn empty_download_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path(), false);
        assert!(store.save(MediaKind::Image, None, b"").await.is_err());
    }
}
