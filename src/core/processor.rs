//! Full consolidation pipeline.
//!
//! author map -> transcription pre-pass -> stitch -> reply rewrite

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::authors::AuthorMap;
use super::replies::rewrite_replies_with_progress;
use super::stitcher::{IdAliasMap, StitchOutput, Stitcher};
use crate::config::ProcessingConfig;
use crate::error::Result;
use crate::media::{
    EngineFactory, MarkingService, MarkingSwitch, MediaDispatcher, TranscriptionCache,
    TranscriptionPool,
};
use crate::message::ParsedMessage;
use crate::parsing::{ChatExport, SourceMessage};
use crate::progress::{ProgressCallback, no_progress};

/// Statistics about the processing result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingStats {
    /// Records in the export, of any type.
    pub source_count: usize,
    /// Non-message records.
    pub skipped_count: usize,
    /// Messages emitted.
    pub stitched_count: usize,
    /// Records folded into another message.
    pub absorbed_count: usize,
    pub replies_rewritten: usize,
    /// Files with a successful transcript.
    pub transcribed_count: usize,
    pub first_message: Option<DateTime<Utc>>,
    pub last_message: Option<DateTime<Utc>>,
}

impl ProcessingStats {
    /// Percentage of message records saved by stitching.
    pub fn compression_ratio(&self) -> f64 {
        let messages = self.source_count - self.skipped_count;
        if messages == 0 {
            return 0.0;
        }
        (1.0 - (self.stitched_count as f64 / messages as f64)) * 100.0
    }
}

/// Everything a run produces.
#[derive(Debug)]
pub struct ArchiveOutput {
    pub author_map: AuthorMap,
    pub messages: Vec<ParsedMessage>,
    pub aliases: IdAliasMap,
    pub stats: ProcessingStats,
}

/// Runs the consolidation passes over one export.
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> chatstitch::Result<()> {
/// use chatstitch::prelude::*;
///
/// let export = load_export("export/result.json")?;
/// let output = ArchiveProcessor::new(ProcessingConfig::default())
///     .process_export(&export, "export".as_ref(), "out/media".as_ref())?;
/// println!("{} messages", output.messages.len());
/// # Ok(())
/// # }
/// ```
pub struct ArchiveProcessor {
    config: ProcessingConfig,
    marker: Option<Arc<dyn MarkingService>>,
    engine_factory: Option<Arc<dyn EngineFactory>>,
    progress: ProgressCallback,
}

impl ArchiveProcessor {
    pub fn new(config: ProcessingConfig) -> Self {
        Self {
            config,
            marker: None,
            engine_factory: None,
            progress: no_progress(),
        }
    }

    /// Sets the marking service used when `mark_media` is on.
    #[must_use]
    pub fn with_marker(mut self, marker: Arc<dyn MarkingService>) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Sets the engine factory used when `transcribe_media` is on.
    #[must_use]
    pub fn with_engine_factory(mut self, factory: Arc<dyn EngineFactory>) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Processes a loaded export.
    pub fn process_export(
        &self,
        export: &ChatExport,
        base_dir: &Path,
        media_dir: &Path,
    ) -> Result<ArchiveOutput> {
        self.process(&export.messages, base_dir, media_dir)
    }

    /// Processes `source` records; media paths resolve against `base_dir` and
    /// copies land in `media_dir`, which is created if needed.
    ///
    /// Only creating `media_dir` can fail. Per-message problems are logged and
    /// skipped.
    pub fn process(
        &self,
        source: &[SourceMessage],
        base_dir: &Path,
        media_dir: &Path,
    ) -> Result<ArchiveOutput> {
        fs::create_dir_all(media_dir)?;

        let author_map = AuthorMap::build(source);

        let marker = self.marker.as_deref().filter(|_| self.config.mark_media);
        if self.config.mark_media && marker.is_none() {
            warn!("media marking requested but no marking service is available");
        }
        let factory = self
            .engine_factory
            .as_deref()
            .filter(|_| self.config.transcribe_media);
        if self.config.transcribe_media && factory.is_none() {
            warn!("transcription requested but no transcription engine is available");
        }

        let switch = MarkingSwitch::new(marker.is_some());
        let mut dispatcher = MediaDispatcher::new(base_dir, media_dir, &switch)
            .with_transcription(factory.is_some());
        if let Some(marker) = marker {
            dispatcher = dispatcher.with_marker(marker);
        }

        let mut cache = TranscriptionCache::new();
        if let Some(factory) = factory {
            let paths = collect_transcribable(&dispatcher, source);
            let results = TranscriptionPool::new(factory, &self.config.transcription)
                .with_progress(Arc::clone(&self.progress))
                .batch_transcribe(&paths);
            cache.extend_from_batch(results);
        }

        let StitchOutput {
            mut messages,
            aliases,
            skipped,
        } = Stitcher::new(&author_map, &dispatcher, &cache)
            .with_progress(Arc::clone(&self.progress))
            .stitch(source);

        let replies_rewritten =
            rewrite_replies_with_progress(&mut messages, &aliases, &self.progress);

        let stats = ProcessingStats {
            source_count: source.len(),
            skipped_count: skipped,
            stitched_count: messages.len(),
            absorbed_count: aliases.len(),
            replies_rewritten,
            transcribed_count: cache.len(),
            first_message: source
                .iter()
                .filter(|m| m.is_message())
                .find_map(SourceMessage::sent_at),
            last_message: source
                .iter()
                .rev()
                .filter(|m| m.is_message())
                .find_map(SourceMessage::sent_at),
        };

        info!(
            source = stats.source_count,
            messages = stats.stitched_count,
            absorbed = stats.absorbed_count,
            replies = stats.replies_rewritten,
            authors = author_map.len(),
            "archive processed"
        );

        Ok(ArchiveOutput {
            author_map,
            messages,
            aliases,
            stats,
        })
    }
}

/// Dry scan: the distinct voice/video files referenced by message records.
pub fn collect_transcribable(
    dispatcher: &MediaDispatcher<'_>,
    source: &[SourceMessage],
) -> BTreeSet<PathBuf> {
    source
        .iter()
        .filter(|m| m.is_message())
        .filter_map(|m| dispatcher.transcribable_path(m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranscriptionConfig;
    use crate::error::TranscriptionError;
    use crate::media::TranscriptionEngine;
    use std::io;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    struct NoEngine;

    impl EngineFactory for NoEngine {
        fn create(
            &self,
            _config: &TranscriptionConfig,
        ) -> std::result::Result<Box<dyn TranscriptionEngine>, TranscriptionError> {
            Err(TranscriptionError::EngineInit("not needed".into()))
        }
    }

    #[test]
    fn test_missing_media_logged_once_with_transcription() {
        let export = tempfile::tempdir().unwrap();
        let media = tempfile::tempdir().unwrap();
        let source = vec![SourceMessage {
            id: 1,
            msg_type: "message".to_string(),
            from_id: Some("user1".to_string()),
            voice_message: Some("voice_messages/gone.ogg".to_string()),
            ..SourceMessage::default()
        }];

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let output = tracing::subscriber::with_default(subscriber, || {
            ArchiveProcessor::new(ProcessingConfig::new().with_transcribe_media(true))
                .with_engine_factory(Arc::new(NoEngine))
                .process(&source, export.path(), media.path())
                .unwrap()
        });

        assert!(output.messages[0].content.media.is_none());
        assert_eq!(logs.contents().matches("media skipped (not found)").count(), 1);
    }

    #[test]
    fn test_compression_ratio() {
        let stats = ProcessingStats {
            source_count: 12,
            skipped_count: 2,
            stitched_count: 4,
            ..ProcessingStats::default()
        };
        assert!((stats.compression_ratio() - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_compression_ratio_empty() {
        assert_eq!(ProcessingStats::default().compression_ratio(), 0.0);
    }
}
