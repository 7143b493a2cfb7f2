use patch_editor::highlight::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Sink that remembers everything it was handed
#[derive(Default)]
struct Recorder {
    applied: Vec<HighlightResult>,
    reported: Vec<(u64, HighlightError)>,
}

impl HighlightSink for Recorder {
    fn apply(&mut self, result: HighlightResult) {
        self.applied.push(result);
    }

    fn report(&mut self, sequence: u64, error: HighlightError) {
        self.reported.push((sequence, error));
    }
}

/// Resolver that counts its invocations, and remembers the texts it saw
struct Counting {
    patterns: PatternSet,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl Counting {
    fn new() -> Counting {
        Counting {
            patterns: PatternSet::compile([("class ", "keyword")]).unwrap(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(vec![]),
        }
    }
}

impl Resolve for Counting {
    fn resolve(&self, text: &str) -> Result<Vec<Span>, HighlightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(text.to_owned());
        Ok(resolve(&self.patterns, text))
    }
}

/// Resolver that takes a long time on texts that start with `slow`
struct SlowOnPrefix;

impl Resolve for SlowOnPrefix {
    fn resolve(&self, text: &str) -> Result<Vec<Span>, HighlightError> {
        if text.starts_with("slow") {
            thread::sleep(Duration::from_millis(300));
        }
        if text.starts_with("fail") {
            return Err(HighlightError::Failed(String::from("refusing")));
        }
        if text.starts_with("panic") {
            panic!("resolver blew up");
        }
        Ok(vec![Span {
            start: 0,
            end: text.len(),
            labels: Default::default(),
        }])
    }
}

fn settings(debounce_ms: u64, worker_threads: usize) -> HighlighterSettings {
    HighlighterSettings {
        debounce: Duration::from_millis(debounce_ms),
        worker_threads,
        ..HighlighterSettings::default()
    }
}

/// Poll until `done` holds for the sink, or give up after a few seconds
fn wait_for<S: HighlightSink>(
    highlighter: &IncrementalHighlighter<S>,
    done: impl Fn(&mut S) -> bool,
) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if highlighter.with_sink(|sink| done(sink)) {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn burst_of_changes_is_resolved_once() {
    let resolver = Arc::new(Counting::new());
    let highlighter =
        IncrementalHighlighter::new(resolver.clone(), Recorder::default(), settings(100, 1));

    highlighter.text_changed("c");
    highlighter.text_changed("cla");
    highlighter.text_changed("class X");

    assert!(wait_for(&highlighter, |sink| !sink.applied.is_empty()));
    // Give a stray second pass the chance to show up
    thread::sleep(Duration::from_millis(250));

    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*resolver.seen.lock().unwrap(), vec![String::from("class X")]);
    highlighter.with_sink(|sink| {
        assert_eq!(sink.applied.len(), 1);
        let spans = &sink.applied[0].spans;
        assert_eq!((spans[0].start, spans[0].end), (0, 6));
        assert!(spans[0].has_label("keyword"));
    });
}

#[test]
fn separate_changes_are_resolved_separately() {
    let resolver = Arc::new(Counting::new());
    let highlighter =
        IncrementalHighlighter::new(resolver.clone(), Recorder::default(), settings(10, 1));

    highlighter.text_changed("a");
    assert!(wait_for(&highlighter, |sink| sink.applied.len() == 1));
    highlighter.text_changed("class b");
    assert!(wait_for(&highlighter, |sink| sink.applied.len() == 2));

    highlighter.with_sink(|sink| {
        assert!(sink.applied[0].sequence < sink.applied[1].sequence);
    });
    assert_eq!(highlighter.last_applied(), Some(2));
}

#[test]
fn older_result_finishing_late_is_discarded() {
    let highlighter =
        IncrementalHighlighter::new(Arc::new(SlowOnPrefix), Recorder::default(), settings(5, 2));

    // The first snapshot gets dispatched, then takes long to resolve. The second one is
    // dispatched to the other worker and finishes first.
    highlighter.text_changed("slow text");
    thread::sleep(Duration::from_millis(60));
    highlighter.text_changed("fast");

    assert!(wait_for(&highlighter, |sink| !sink.applied.is_empty()));
    thread::sleep(Duration::from_millis(500));

    highlighter.with_sink(|sink| {
        assert_eq!(sink.applied.len(), 1);
        assert_eq!(sink.applied[0].sequence, 2);
        assert_eq!(sink.applied[0].spans[0].end, "fast".len());
    });
}

#[test]
fn failures_are_reported_and_leave_results_alone() {
    let highlighter =
        IncrementalHighlighter::new(Arc::new(SlowOnPrefix), Recorder::default(), settings(5, 1));

    highlighter.text_changed("good");
    assert!(wait_for(&highlighter, |sink| sink.applied.len() == 1));

    highlighter.text_changed("fail now");
    assert!(wait_for(&highlighter, |sink| sink.reported.len() == 1));

    highlighter.text_changed("panic now");
    assert!(wait_for(&highlighter, |sink| sink.reported.len() == 2));

    highlighter.with_sink(|sink| {
        assert_eq!(sink.applied.len(), 1);
        assert_eq!(
            sink.reported[0].1,
            HighlightError::Failed(String::from("refusing"))
        );
        assert_eq!(
            sink.reported[1].1,
            HighlightError::Panicked(String::from("resolver blew up"))
        );
    });

    // Workers survive panics
    highlighter.text_changed("good again");
    assert!(wait_for(&highlighter, |sink| sink.applied.len() == 2));
}

#[test]
fn dropping_stops_pending_work() {
    let resolver = Arc::new(Counting::new());
    let highlighter =
        IncrementalHighlighter::new(resolver.clone(), Recorder::default(), settings(10_000, 1));
    highlighter.text_changed("class Never");

    let started = Instant::now();
    drop(highlighter);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn builtin_sets_work_with_the_highlighter() {
    let highlighter = IncrementalHighlighter::new(
        Arc::new(builtins::patch()),
        Recorder::default(),
        settings(5, 1),
    );
    let text = "// comment\n.aload 0\n";
    highlighter.text_changed(text);
    assert!(wait_for(&highlighter, |sink| sink.applied.len() == 1));

    highlighter.with_sink(|sink| {
        let spans = &sink.applied[0].spans;
        assert_eq!(spans.last().map(|s| s.end), Some(text.len()));
        assert!(spans
            .iter()
            .any(|s| s.has_label("comment") && &text[s.start..s.end] == "// comment"));
        assert!(spans
            .iter()
            .any(|s| s.has_label("find") && &text[s.start..s.end] == ".aload"));
    });
}
