//! Media dispatch: cached transcript, marking service, or plain copy.
//!
//! For every message the dispatcher:
//! 1. detects the media key (none is not an error),
//! 2. short-circuits export placeholders ("file not included", ...),
//! 3. resolves the path inside the export directory,
//! 4. returns a cached transcript for voice/video media when one exists,
//! 5. otherwise marks the file (if enabled) or copies it into the media directory.
//!
//! Marking failures always fall back to a copy. An unavailable marking engine
//! also switches marking off for the rest of the run.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, warn};

use super::path::{ResolvedPath, resolve, resolve_silent};
use super::transcription::TranscriptionCache;
use super::MediaType;
use crate::error::{MarkingError, SkipReason};
use crate::message::MediaDescriptor;
use crate::parsing::SourceMessage;

/// Placeholder values Telegram writes instead of a path.
pub const BLOCKED_PLACEHOLDERS: [&str; 3] = [
    "(File not included. Change data exporting settings to download.)",
    "(File exceeds maximum size. Change data exporting settings to download.)",
    "(File unavailable, please try again later)",
];

/// Returns `true` if `value` is one of the export's placeholder strings.
pub fn is_blocked_placeholder(value: &str) -> bool {
    BLOCKED_PLACEHOLDERS.contains(&value)
}

/// Kind of marking requested from a [`MarkingService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Audio,
    Video,
    Image,
}

/// External capability that writes a marked copy of a media file.
pub trait MarkingService: Send + Sync {
    /// Writes a marked version of `source` to `dest`.
    fn mark(&self, kind: MarkKind, source: &Path, dest: &Path) -> Result<(), MarkingError>;
}

/// Run-scoped switch for marking.
///
/// Starts in the configured state and can only be turned off.
#[derive(Debug)]
pub struct MarkingSwitch(AtomicBool);

impl MarkingSwitch {
    pub fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Turns marking off for the rest of the run.
    pub fn disable(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// What the dispatcher did with a message's media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message has no media key.
    NoMedia,
    /// The export contains a placeholder instead of the file.
    Blocked,
    /// The reference could not be resolved.
    Skipped(SkipReason),
    /// A cached transcript was attached; nothing was written.
    Transcribed,
    /// The marking service wrote the output file.
    Marked,
    /// The file was copied unchanged.
    Copied,
    /// The file vanished or could not be copied; nothing was written.
    CopySkipped,
}

/// Routes message media to the marking service or a plain copy.
pub struct MediaDispatcher<'a> {
    base_dir: &'a Path,
    media_dir: &'a Path,
    marking: &'a MarkingSwitch,
    marker: Option<&'a dyn MarkingService>,
    transcription_enabled: bool,
}

impl<'a> MediaDispatcher<'a> {
    /// Creates a copy-only dispatcher.
    pub fn new(base_dir: &'a Path, media_dir: &'a Path, marking: &'a MarkingSwitch) -> Self {
        Self {
            base_dir,
            media_dir,
            marking,
            marker: None,
            transcription_enabled: false,
        }
    }

    /// Sets the marking service.
    #[must_use]
    pub fn with_marker(mut self, marker: &'a dyn MarkingService) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Enables the transcript short-circuit.
    #[must_use]
    pub fn with_transcription(mut self, enabled: bool) -> Self {
        self.transcription_enabled = enabled;
        self
    }

    /// Resolves a message's media reference, if any, to a transcribable file.
    ///
    /// Used by the transcription dry scan. Logs nothing: skipped media is
    /// reported once, by [`MediaDispatcher::process`].
    pub fn transcribable_path(&self, message: &SourceMessage) -> Option<PathBuf> {
        let (_, raw) = message.media_reference()?;
        if is_blocked_placeholder(raw) {
            return None;
        }
        let resolved = resolve_silent(self.base_dir, raw).ok()?;
        resolved
            .media_type()
            .is_transcribable()
            .then_some(resolved.path)
    }

    /// Processes the media of one message.
    pub fn process(
        &self,
        message: &SourceMessage,
        cache: &TranscriptionCache,
    ) -> (DispatchOutcome, Option<MediaDescriptor>) {
        let Some((key, raw)) = message.media_reference() else {
            return (DispatchOutcome::NoMedia, None);
        };

        if is_blocked_placeholder(raw) {
            debug!(message_id = message.id, %key, "media not included in export");
            return (DispatchOutcome::Blocked, None);
        }

        let resolved = match resolve(self.base_dir, raw) {
            Ok(resolved) => resolved,
            Err(reason) => return (DispatchOutcome::Skipped(reason), None),
        };

        let descriptor = MediaDescriptor::new(key, raw);
        let media_type = resolved.media_type();

        if self.transcription_enabled && media_type.is_transcribable() {
            if let Some(text) = cache.get(&resolved.path).filter(|t| !t.is_empty()) {
                return (
                    DispatchOutcome::Transcribed,
                    Some(descriptor.with_transcript(text)),
                );
            }
        }

        let Some(file_name) = resolved.file_name() else {
            return (DispatchOutcome::CopySkipped, Some(descriptor));
        };
        let dest = self.media_dir.join(file_name);

        if let Some(outcome) = self.try_mark(&resolved, media_type, &dest) {
            return (outcome, Some(descriptor));
        }

        (copy_media_file(&resolved.path, &dest), Some(descriptor))
    }

    /// Returns `None` when the file still needs a plain copy.
    fn try_mark(
        &self,
        resolved: &ResolvedPath,
        media_type: MediaType,
        dest: &Path,
    ) -> Option<DispatchOutcome> {
        if !self.marking.is_enabled() {
            return None;
        }
        let marker = self.marker?;

        let (kind, dest) = match media_type {
            MediaType::Voice => (MarkKind::Audio, dest.with_extension("mp4")),
            MediaType::RoundVideo | MediaType::Video => (MarkKind::Video, dest.to_path_buf()),
            MediaType::Photo => (MarkKind::Image, dest.to_path_buf()),
            MediaType::Other => return None,
        };

        let marked =
            panic::catch_unwind(AssertUnwindSafe(|| marker.mark(kind, &resolved.path, &dest)))
                .unwrap_or_else(|_| {
                    Err(MarkingError::MarkingFailed("marking service panicked".into()))
                });

        match marked {
            Ok(()) => Some(DispatchOutcome::Marked),
            Err(err) if err.disables_marking() => {
                error!(
                    path = %resolved.path.display(),
                    error = %err,
                    "marking engine unavailable, marking disabled for the rest of the run"
                );
                self.marking.disable();
                None
            }
            Err(err) => {
                warn!(
                    path = %resolved.path.display(),
                    error = %err,
                    "marking failed, copying instead"
                );
                None
            }
        }
    }
}

/// Copies a file if it still exists. Never fails.
pub fn copy_media_file(source: &Path, dest: &Path) -> DispatchOutcome {
    if !source.exists() {
        warn!(path = %source.display(), "media skipped (not found)");
        return DispatchOutcome::CopySkipped;
    }

    match fs::copy(source, dest) {
        Ok(_) => DispatchOutcome::Copied,
        Err(err) => {
            warn!(
                path = %source.display(),
                dest = %dest.display(),
                error = %err,
                "media copy failed"
            );
            DispatchOutcome::CopySkipped
        }
    }
}
