use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{AnalysisError, Result};

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Extension → declared media type. Stands in for the type a browser
/// attaches to a picked file.
const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("csv", "text/csv"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("heic", "image/heic"),
];

pub fn media_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    ext.and_then(|ext| {
        EXTENSION_TYPES
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, mime)| *mime)
    })
    .unwrap_or(FALLBACK_MEDIA_TYPE)
}

/// A file picked for submission: its name, declared media type and bytes.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub name: String,
    pub media_type: &'static str,
    pub bytes: Arc<[u8]>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let media_type = media_type_for(&name);
        Self {
            name,
            media_type,
            bytes: bytes.into(),
        }
    }

    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Synchronous accept rule checked before a request is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptRule {
    Image,
    Csv,
}

impl AcceptRule {
    pub fn check(self, file: &FileHandle) -> Result<()> {
        let ok = match self {
            AcceptRule::Image => file.media_type.starts_with("image/"),
            AcceptRule::Csv => file.media_type == "text/csv",
        };
        if ok {
            Ok(())
        } else {
            Err(AnalysisError::Validation(self.message().to_string()))
        }
    }

    fn message(self) -> &'static str {
        match self {
            AcceptRule::Image => "Only image files are allowed",
            AcceptRule::Csv => "Only CSV files are allowed",
        }
    }
}

// ── Previews ──

#[derive(Default)]
struct PreviewSlots {
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, Arc<[u8]>>>,
}

/// Holds the binary data behind preview URLs. Cloning shares the store.
#[derive(Clone, Default)]
pub struct PreviewStore {
    slots: Arc<PreviewSlots>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, file: &FileHandle) -> PreviewHandle {
        let id = self.slots.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.lock().insert(id, Arc::clone(&file.bytes));
        PreviewHandle {
            id,
            url: format!("preview://{}/{}", id, file.name),
            store: self.clone(),
        }
    }

    /// Bytes behind a live preview URL, or `None` once it has been revoked.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        let id = url
            .strip_prefix("preview://")?
            .split('/')
            .next()?
            .parse::<u64>()
            .ok()?;
        self.lock().get(&id).cloned()
    }

    /// Number of previews not yet released.
    pub fn live(&self) -> usize {
        self.lock().len()
    }

    fn revoke(&self, id: u64) {
        if self.lock().remove(&id).is_some() {
            debug!("Released preview {}", id);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Arc<[u8]>>> {
        self.slots.live.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Revocable handle to a preview; dropping it releases the data.
pub struct PreviewHandle {
    id: u64,
    url: String,
    store: PreviewStore,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.revoke(self.id);
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle").field("url", &self.url).finish()
    }
}

/// The file currently selected plus the preview it owns.
#[derive(Debug)]
pub struct UploadSession {
    pub file: FileHandle,
    preview: PreviewHandle,
}

impl UploadSession {
    pub fn open(file: FileHandle, previews: &PreviewStore) -> Self {
        let preview = previews.create(&file);
        Self { file, preview }
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }
}
