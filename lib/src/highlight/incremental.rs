use super::{HighlightError, Resolve, Span, StaleResultDiscarded};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Settings for an [`IncrementalHighlighter`]
#[derive(Debug, Clone)]
pub struct HighlighterSettings {
    /// Quiet period after the last text change before resolution starts
    pub debounce: Duration,

    /// Number of threads resolving spans
    ///
    /// With more than one worker, a newer snapshot may finish before an older one. The older
    /// result then gets discarded.
    pub worker_threads: usize,

    /// Prefix for the names of the spawned threads
    pub thread_name: String,
}

impl Default for HighlighterSettings {
    fn default() -> Self {
        HighlighterSettings {
            debounce: Duration::from_millis(20),
            worker_threads: 1,
            thread_name: String::from("highlight"),
        }
    }
}

/// Snapshot of text queued for resolution
#[derive(Debug, Clone)]
pub struct HighlightRequest {
    /// Strictly increasing per highlighter, assigned when the request is dispatched
    pub sequence: u64,

    /// Edit generation the snapshot was taken at
    pub generation: u64,

    pub text: Arc<str>,
}

/// Spans computed for a [`HighlightRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResult {
    pub sequence: u64,
    pub spans: Vec<Span>,
}

/// Where the results of an [`IncrementalHighlighter`] go
///
/// Calls are serialized: the sink is never called from two threads at once.
pub trait HighlightSink: Send + 'static {
    /// Replace the visible highlighting
    fn apply(&mut self, result: HighlightResult);

    /// Resolving the latest text failed (the visible highlighting should be left alone)
    fn report(&mut self, sequence: u64, error: HighlightError);
}

/// Decides whether a finished computation is still worth showing
///
/// A result passes if its sequence number is newer than anything applied so far and no edit
/// happened since its snapshot was taken.
#[derive(Debug, Default, Clone)]
pub struct SequenceGate {
    last_applied: Option<u64>,
}

impl SequenceGate {
    pub fn new() -> SequenceGate {
        SequenceGate::default()
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }

    /// Check a result without recording it
    pub fn check(
        &self,
        sequence: u64,
        generation: u64,
        current_generation: u64,
    ) -> Result<(), StaleResultDiscarded> {
        let superseded = matches!(self.last_applied, Some(last) if last >= sequence);
        let text_changed = generation != current_generation;
        if superseded || text_changed {
            Err(StaleResultDiscarded {
                sequence,
                last_applied: self.last_applied,
                text_changed,
            })
        } else {
            Ok(())
        }
    }

    /// Check a result and, if it passes, record it as applied
    pub fn admit(
        &mut self,
        sequence: u64,
        generation: u64,
        current_generation: u64,
    ) -> Result<(), StaleResultDiscarded> {
        self.check(sequence, generation, current_generation)?;
        self.last_applied = Some(sequence);
        Ok(())
    }
}

/// Gate and sink are behind one lock, so checking and applying happen atomically
struct Completion<S> {
    gate: SequenceGate,
    sink: S,
}

struct Shared<S> {
    generation: AtomicU64,
    completion: Mutex<Completion<S>>,
}

/// Keeps highlighting of one editable text current while it is being edited
///
/// Every text change is snapshotted and handed to a dispatcher thread, which waits for the text
/// to stay unchanged for [`HighlighterSettings::debounce`] before queueing the latest snapshot
/// for a pool of worker threads. Finished results go through a [`SequenceGate`] before reaching
/// the [`HighlightSink`], so the sink never sees a result that is older than one it already
/// has, or older than the latest text.
///
/// ### Simple example
///
/// ```
/// use patch_editor::highlight::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct Print;
/// impl HighlightSink for Print {
///     fn apply(&mut self, result: HighlightResult) {
///         println!("{} spans", result.spans.len());
///     }
///     fn report(&mut self, _sequence: u64, error: HighlightError) {
///         eprintln!("{}", error);
///     }
/// }
///
/// let highlighter = IncrementalHighlighter::new(
///     Arc::new(builtins::java()),
///     Print,
///     HighlighterSettings::default(),
/// );
/// highlighter.text_changed("public class Foo {}");
/// std::thread::sleep(Duration::from_millis(100));
/// ```
pub struct IncrementalHighlighter<S: HighlightSink> {
    shared: Arc<Shared<S>>,
    changes: Option<Sender<(u64, Arc<str>)>>,
    dispatcher: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl<S: HighlightSink> IncrementalHighlighter<S> {
    pub fn new(
        resolver: Arc<dyn Resolve>,
        sink: S,
        settings: HighlighterSettings,
    ) -> IncrementalHighlighter<S> {
        let shared = Arc::new(Shared {
            generation: AtomicU64::new(0),
            completion: Mutex::new(Completion {
                gate: SequenceGate::new(),
                sink,
            }),
        });

        let (changes_tx, changes_rx) = crossbeam_channel::unbounded();
        let (work_tx, work_rx) = crossbeam_channel::unbounded();

        let workers = (0..settings.worker_threads.max(1))
            .filter_map(|idx| {
                let resolver = resolver.clone();
                let shared = shared.clone();
                let work_rx: Receiver<HighlightRequest> = work_rx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("{}-worker-{}", settings.thread_name, idx))
                    .spawn(move || run_worker(&*resolver, &shared, work_rx));
                match spawned {
                    Ok(handle) => Some(handle),
                    Err(err) => {
                        log::error!("Failed to spawn highlight worker: {}", err);
                        None
                    }
                }
            })
            .collect();

        let debounce = settings.debounce;
        let dispatcher = thread::Builder::new()
            .name(format!("{}-dispatch", settings.thread_name))
            .spawn(move || run_dispatcher(debounce, changes_rx, work_tx));
        let dispatcher = match dispatcher {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("Failed to spawn highlight dispatcher: {}", err);
                None
            }
        };

        IncrementalHighlighter {
            shared,
            changes: Some(changes_tx),
            dispatcher,
            workers,
        }
    }

    /// Record a new version of the text
    ///
    /// This copies the text and returns right away. Any result computed for earlier text that
    /// hasn't been applied yet will not be applied anymore.
    pub fn text_changed(&self, text: &str) {
        let snapshot: Arc<str> = Arc::from(text);
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(changes) = &self.changes {
            if changes.send((generation, snapshot)).is_err() {
                log::warn!("Highlight dispatcher is gone, dropping text change");
            }
        }
    }

    /// Run a closure against the sink (eg. to read what it has collected)
    pub fn with_sink<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        let mut completion = lock(&self.shared.completion);
        f(&mut completion.sink)
    }

    /// Sequence number of the latest applied result
    pub fn last_applied(&self) -> Option<u64> {
        lock(&self.shared.completion).gate.last_applied()
    }
}

impl<S: HighlightSink> Drop for IncrementalHighlighter<S> {
    fn drop(&mut self) {
        // Disconnecting the change channel stops the dispatcher, which in turn disconnects the
        // work channel and lets the workers drain and stop
        self.changes.take();
        if let Some(dispatcher) = self.dispatcher.take() {
            if dispatcher.join().is_err() {
                log::error!("Highlight dispatcher panicked");
            }
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("Highlight worker panicked");
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // A panicking sink must not take the whole highlighter down with it
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Debounce text changes and queue the latest snapshot once the text has been quiet long enough
fn run_dispatcher(
    debounce: Duration,
    changes: Receiver<(u64, Arc<str>)>,
    work: Sender<HighlightRequest>,
) {
    let mut pending: Option<(u64, Arc<str>, Instant)> = None;
    let mut next_sequence: u64 = 1;

    loop {
        let received = match &pending {
            None => changes.recv().map_err(|_| RecvTimeoutError::Disconnected),
            Some((_, _, deadline)) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                changes.recv_timeout(timeout)
            }
        };

        match received {
            Ok((generation, text)) => {
                pending = Some((generation, text, Instant::now() + debounce));
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Some((generation, text, _)) = pending.take() {
                    let request = HighlightRequest {
                        sequence: next_sequence,
                        generation,
                        text,
                    };
                    next_sequence += 1;
                    log::debug!(
                        "Dispatching highlight request #{} ({} bytes)",
                        request.sequence,
                        request.text.len()
                    );
                    if work.send(request).is_err() {
                        break;
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if pending.is_some() {
                    log::debug!("Dropping undispatched text snapshot on shutdown");
                }
                break;
            }
        }
    }
}

fn run_worker<S: HighlightSink>(
    resolver: &dyn Resolve,
    shared: &Shared<S>,
    work: Receiver<HighlightRequest>,
) {
    for request in work.iter() {
        let text = request.text.clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve(&text)))
            .unwrap_or_else(|payload| Err(HighlightError::Panicked(panic_message(&*payload))));

        let mut completion = lock(&shared.completion);
        let current_generation = shared.generation.load(Ordering::SeqCst);
        match outcome {
            Ok(spans) => {
                match completion
                    .gate
                    .admit(request.sequence, request.generation, current_generation)
                {
                    Ok(()) => completion.sink.apply(HighlightResult {
                        sequence: request.sequence,
                        spans,
                    }),
                    Err(stale) => log::debug!("{}", stale),
                }
            }
            Err(error) => {
                match completion
                    .gate
                    .check(request.sequence, request.generation, current_generation)
                {
                    Ok(()) => {
                        log::warn!("Highlight request #{} failed: {}", request.sequence, error);
                        completion.sink.report(request.sequence, error);
                    }
                    Err(stale) => log::debug!("{} ({})", stale, error),
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        String::from(*message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}
