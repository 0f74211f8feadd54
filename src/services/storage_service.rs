use crate::error::{Error, Result};

/// On-disk file storage for avatars, achievement photos and lesson
/// presentations. Files land under the configured uploads directory and are
/// served back via the `/uploads` static route; callers persist the returned
/// URL string.
#[derive(Clone)]
pub struct StorageService {
    uploads_dir: String,
}

#[derive(Debug, Clone, Copy)]
pub enum FileKind {
    Avatar,
    AchievementPhoto,
    Presentation,
}

impl FileKind {
    fn subdir(&self) -> &'static str {
        match self {
            FileKind::Avatar => "avatars",
            FileKind::AchievementPhoto => "achievements",
            FileKind::Presentation => "presentations",
        }
    }

    fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            FileKind::Avatar | FileKind::AchievementPhoto => &["png", "jpg", "jpeg", "webp"],
            FileKind::Presentation => &["pdf", "ppt", "pptx", "key"],
        }
    }

    fn max_bytes(&self) -> usize {
        let config = crate::config::get_config();
        match self {
            FileKind::Avatar | FileKind::AchievementPhoto => config.avatar_max_bytes,
            FileKind::Presentation => config.presentation_max_bytes,
        }
    }
}

impl StorageService {
    pub fn new(uploads_dir: String) -> Self {
        Self { uploads_dir }
    }

    pub async fn save(&self, kind: FileKind, filename: &str, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".to_string()));
        }
        if data.len() > kind.max_bytes() {
            return Err(Error::BadRequest(format!(
                "File exceeds the maximum size of {} bytes",
                kind.max_bytes()
            )));
        }

        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        if !kind.allowed_extensions().contains(&extension.as_str()) {
            return Err(Error::BadRequest(format!(
                "File type not allowed. Allowed: {}",
                kind.allowed_extensions().join(", ")
            )));
        }

        let dir = format!("{}/{}", self.uploads_dir, kind.subdir());
        tokio::fs::create_dir_all(&dir).await.map_err(Error::Io)?;
        let stem = crate::utils::token::generate_file_stem(24);
        let saved_filename = format!("{}.{}", stem, extension);
        let path = format!("{}/{}", dir, saved_filename);
        tokio::fs::write(&path, data).await.map_err(Error::Io)?;

        tracing::info!(path = %path, "File stored");
        Ok(format!("/uploads/{}/{}", kind.subdir(), saved_filename))
    }
}
