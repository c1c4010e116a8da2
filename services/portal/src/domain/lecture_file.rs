use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::PortalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Lecture,
    Summary,
    Exam,
    Assignment,
    Reference,
    Other,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lecture => "lecture",
            Self::Summary => "summary",
            Self::Exam => "exam",
            Self::Assignment => "assignment",
            Self::Reference => "reference",
            Self::Other => "other",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "lecture" => Some(Self::Lecture),
            "summary" => Some(Self::Summary),
            "exam" => Some(Self::Exam),
            "assignment" => Some(Self::Assignment),
            "reference" => Some(Self::Reference),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Either an uploaded file or a link to elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Local {
        storage_path: String,
        file_name: String,
        file_size: i64,
        extension: String,
        mime_type: String,
    },
    External {
        url: String,
    },
}

impl FileContent {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Local { .. } => CONTENT_LOCAL_FILE,
            Self::External { .. } => CONTENT_EXTERNAL_LINK,
        }
    }

    /// Where the client fetches the material from.
    pub fn location(&self) -> &str {
        match self {
            Self::Local { storage_path, .. } => storage_path,
            Self::External { url } => url,
        }
    }
}

pub const CONTENT_LOCAL_FILE: &str = "local_file";
pub const CONTENT_EXTERNAL_LINK: &str = "external_link";

#[derive(Debug, Clone)]
pub struct LectureFile {
    pub id: Uuid,
    pub course_id: Uuid,
    pub uploader_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub file_type: FileType,
    pub content: FileContent,
    pub is_visible: bool,
    pub download_count: i32,
    pub view_count: i32,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LectureFile {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Upload size limit in bytes (50 MiB).
pub const MAX_FILE_SIZE: i64 = 50 * 1024 * 1024;

const ALLOWED: &[(&str, &str)] = &[
    (".pdf", "application/pdf"),
    (".doc", "application/msword"),
    (
        ".docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (".txt", "text/plain"),
    (".md", "text/markdown"),
    (".ppt", "application/vnd.ms-powerpoint"),
    (
        ".pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    (".mp4", "video/mp4"),
    (".webm", "video/webm"),
    (".avi", "video/x-msvideo"),
    (".mov", "video/quicktime"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".png", "image/png"),
    (".gif", "image/gif"),
    (".zip", "application/zip"),
    (".rar", "application/vnd.rar"),
];

/// Lowercased extension including the dot, e.g. `".pdf"`.
pub fn extension_of(file_name: &str) -> Option<String> {
    let idx = file_name.rfind('.')?;
    let ext = &file_name[idx..];
    (ext.len() > 1).then(|| ext.to_lowercase())
}

/// Mime type for an allowed extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    ALLOWED
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Validate an uploaded file and derive its extension and mime type.
pub fn local_content(
    storage_path: String,
    file_name: String,
    file_size: i64,
) -> Result<FileContent, PortalError> {
    if file_size <= 0 {
        return Err(PortalError::Validation("file is empty".into()));
    }
    if file_size > MAX_FILE_SIZE {
        return Err(PortalError::Validation(
            "file exceeds the 50 MiB limit".into(),
        ));
    }
    if storage_path.trim().is_empty() {
        return Err(PortalError::Validation("storage path is required".into()));
    }
    let extension = extension_of(&file_name)
        .ok_or_else(|| PortalError::Validation("file has no extension".into()))?;
    let mime_type = mime_for_extension(&extension).ok_or_else(|| {
        PortalError::Validation(format!("file type {extension} is not allowed"))
    })?;
    Ok(FileContent::Local {
        storage_path,
        file_name,
        file_size,
        extension,
        mime_type: mime_type.to_owned(),
    })
}

/// Validate an external link: absolute http(s) URL with a host.
pub fn external_content(url: String) -> Result<FileContent, PortalError> {
    let url = url.trim().to_owned();
    let parsed =
        Url::parse(&url).map_err(|e| PortalError::Validation(format!("link is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PortalError::Validation(
            "link must start with http:// or https://".into(),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(PortalError::Validation("link has no host".into()));
    }
    Ok(FileContent::External { url })
}
