use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    codec::binary::{decode, encode},
    edit::engine::Editor,
    foundation::error::{LedAnimError, LedAnimResult},
    model::animation::Animation,
};

/// File extension of encoded animations.
pub const FILE_EXTENSION: &str = "cla";

const UNTITLED: &str = "Untitled.cla";

/// Document shared between the editor, the preview clock and upload workers.
pub type SharedDocument = Arc<Mutex<AnimationDocument>>;

/// Lock a shared document, recovering from poisoning.
///
/// Commits are a single in-place sort, so a panicking holder cannot leave a half-written channel.
pub fn lock_document(doc: &SharedDocument) -> MutexGuard<'_, AnimationDocument> {
    doc.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The open animation together with its file and saved state.
#[derive(Clone, Debug)]
pub struct AnimationDocument {
    animation: Animation,
    path: Option<PathBuf>,
    saved: bool,
}

impl Default for AnimationDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDocument {
    /// Empty, never-saved document with the default channel count.
    pub fn new() -> Self {
        Self {
            animation: Animation::default(),
            path: None,
            saved: true,
        }
    }

    /// Wrap an in-memory animation that has no file yet.
    pub fn with_animation(animation: Animation) -> Self {
        Self {
            animation,
            path: None,
            saved: false,
        }
    }

    /// Read and decode the `.cla` file at `path`.
    pub fn open(path: &Path) -> LedAnimResult<Self> {
        let mut doc = Self::new();
        doc.load(path)?;
        Ok(doc)
    }

    /// Current animation.
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// File the document was last loaded from or saved to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the animation matches what is on disk.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Start editing; the document is marked unsaved.
    pub fn edit(&mut self) -> Editor<'_> {
        self.saved = false;
        Editor::new(&mut self.animation)
    }

    /// Window title: the file name with a leading `*` while unsaved.
    ///
    /// A document that has never been saved is always shown as `*Untitled.cla`.
    pub fn title(&self, app: &str) -> String {
        match self.path.as_deref().and_then(Path::file_name) {
            Some(name) => format!(
                "{}{} - {app}",
                if self.saved { "" } else { "*" },
                name.to_string_lossy()
            ),
            None => format!("*{UNTITLED} - {app}"),
        }
    }

    /// Clear the animation and forget the file.
    pub fn new_document(&mut self) {
        *self = Self::new();
        tracing::debug!("new document");
    }

    /// Replace the animation with the contents of `path`.
    ///
    /// On error the document is left untouched. Callers driving a preview should reset it
    /// afterwards.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load(&mut self, path: &Path) -> LedAnimResult<()> {
        let bytes =
            std::fs::read(path).map_err(|e| LedAnimError::io_at("read animation", path, e))?;
        self.animation = decode(&bytes)?;
        self.path = Some(path.to_path_buf());
        self.saved = true;
        tracing::info!(channels = self.animation.channel_count(), "loaded animation");
        Ok(())
    }

    /// Encode the current animation.
    pub fn encode(&self) -> LedAnimResult<Vec<u8>> {
        encode(&self.animation)
    }

    /// Write to `path`, appending the `.cla` extension when it is missing, and make it the open
    /// file. Returns the path actually written.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn save_as(&mut self, path: &Path) -> LedAnimResult<PathBuf> {
        let path = with_cla_extension(path);
        self.write_to(&path)?;
        self.path = Some(path.clone());
        Ok(path)
    }

    /// Write back to the open file.
    pub fn save(&mut self) -> LedAnimResult<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| LedAnimError::validation("document has no file; use save_as"))?;
        self.write_to(&path)
    }

    /// Move the document behind a lock for sharing with workers.
    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    fn write_to(&mut self, path: &Path) -> LedAnimResult<()> {
        let bytes = self.encode()?;
        std::fs::write(path, &bytes)
            .map_err(|e| LedAnimError::io_at("write animation", path, e))?;
        self.saved = true;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved animation");
        Ok(())
    }
}

fn with_cla_extension(path: &Path) -> PathBuf {
    if path.extension() == Some(OsStr::new(FILE_EXTENSION)) {
        return path.to_path_buf();
    }
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(FILE_EXTENSION);
    PathBuf::from(s)
}

#[cfg(test)]
#[path = "../tests/unit/document.rs"]
mod tests;
