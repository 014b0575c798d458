//! Transcript cache and the parallel transcription pool.
//!
//! Transcription runs once per archive, before stitching, over the distinct set
//! of voice/video files the export references. Each pool worker builds its own
//! engine on the first file it picks up and reuses it for every later file, so
//! an expensive model load happens at most once per worker.
//!
//! A failed file yields `None` and never stops the batch. There is no retry.

use std::collections::{BTreeSet, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, mpsc};

use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use crate::config::TranscriptionConfig;
use crate::error::TranscriptionError;
use crate::progress::{Progress, ProgressCallback, Stage, no_progress};

/// A loaded speech-to-text model.
///
/// Instances live on a single worker thread and are never shared.
pub trait TranscriptionEngine {
    /// Transcribes one file. An empty string means no speech was detected.
    fn transcribe(&mut self, path: &Path) -> Result<String, TranscriptionError>;
}

/// Builds engine instances for pool workers.
pub trait EngineFactory: Send + Sync {
    fn create(
        &self,
        config: &TranscriptionConfig,
    ) -> Result<Box<dyn TranscriptionEngine>, TranscriptionError>;
}

/// Transcripts keyed by canonical source path.
///
/// A missing entry means the file was never transcribed (or failed); an empty
/// string means it was transcribed and contained no speech.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionCache {
    entries: HashMap<PathBuf, String>,
}

impl TranscriptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.entries.insert(path.into(), text.into());
    }

    /// Stores every successful result of a batch.
    pub fn extend_from_batch(&mut self, results: HashMap<PathBuf, Option<String>>) {
        self.entries.extend(
            results
                .into_iter()
                .filter_map(|(path, text)| text.map(|t| (path, t))),
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fixed-size pool of transcription workers.
pub struct TranscriptionPool<'a> {
    factory: &'a dyn EngineFactory,
    config: &'a TranscriptionConfig,
    progress: ProgressCallback,
}

impl<'a> TranscriptionPool<'a> {
    pub fn new(factory: &'a dyn EngineFactory, config: &'a TranscriptionConfig) -> Self {
        Self {
            factory,
            config,
            progress: no_progress(),
        }
    }

    /// Sets the callback invoked once per completed file.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// Transcribes every path once.
    ///
    /// The result has an entry for every requested path: `Some(text)` on
    /// success, `None` if that file failed.
    pub fn batch_transcribe(
        &self,
        paths: &BTreeSet<PathBuf>,
    ) -> HashMap<PathBuf, Option<String>> {
        if paths.is_empty() {
            return HashMap::new();
        }

        let total = paths.len();
        let workers = self.config.worker_count().min(total);
        info!(
            files = total,
            workers,
            model = %self.config.model,
            device = %self.config.device,
            "transcribing media"
        );

        let queue = Mutex::new(paths.iter());
        let completed = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();

        let run_worker = |worker: usize| {
            let mut engine: Option<Box<dyn TranscriptionEngine>> = None;
            loop {
                let Some(path) = queue.lock().ok().and_then(|mut q| q.next()) else {
                    break;
                };
                let text = self.transcribe_one(&mut engine, worker, path);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                (self.progress)(Progress::new(Stage::Transcribing, done).with_total(total));
                if tx.send((path.clone(), text)).is_err() {
                    break;
                }
            }
        };

        match ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("transcribe-{i}"))
            .build()
        {
            Ok(pool) => {
                pool.broadcast(|ctx| run_worker(ctx.index()));
            }
            Err(err) => {
                warn!(
                    error = %err,
                    "could not start transcription pool, running on the current thread"
                );
                run_worker(0);
            }
        }
        drop(tx);

        let results: HashMap<PathBuf, Option<String>> = rx.into_iter().collect();
        let failed = results.values().filter(|text| text.is_none()).count();
        info!(files = results.len(), failed, "transcription finished");
        results
    }

    fn transcribe_one(
        &self,
        engine: &mut Option<Box<dyn TranscriptionEngine>>,
        worker: usize,
        path: &Path,
    ) -> Option<String> {
        if engine.is_none() {
            debug!(worker, model = %self.config.model, "loading transcription engine");
            match self.factory.create(self.config) {
                Ok(created) => *engine = Some(created),
                Err(err) => {
                    warn!(worker, path = %path.display(), error = %err, "transcription skipped");
                    return None;
                }
            }
        }

        let loaded = engine.as_mut()?;
        match panic::catch_unwind(AssertUnwindSafe(|| loaded.transcribe(path))) {
            Ok(Ok(text)) => Some(text.trim().to_string()),
            Ok(Err(err)) => {
                warn!(worker, path = %path.display(), error = %err, "transcription failed");
                None
            }
            Err(_) => {
                // the engine may be left in a broken state; rebuild it on the next file
                warn!(worker, path = %path.display(), "transcription engine panicked");
                *engine = None;
                None
            }
        }
    }
}
