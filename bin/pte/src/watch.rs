//! Waiting for the patch file to change and then settle

use crate::error::CliError;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Watches one file through its parent directory
///
/// Editors often save by writing a new file and renaming it over the old one, which a watch on
/// the file itself would not survive.
pub struct PatchWatcher {
    _watcher: RecommendedWatcher,
    changes: Receiver<()>,
    quiet_period: Duration,
}

impl PatchWatcher {
    pub fn new(path: &Path, quiet_period: Duration) -> Result<PatchWatcher, CliError> {
        let file_name: OsString = path
            .file_name()
            .map(OsStr::to_owned)
            .ok_or_else(|| CliError::BadArgument(format!("{} is not a file", path.display())))?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
            _ => PathBuf::from("."),
        };

        let (sender, changes) = crossbeam_channel::unbounded();
        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if touches(&event, &file_name) {
                        let _ = sender.send(());
                    }
                }
                Err(err) => log::warn!("File watching failed: {}", err),
            },
            Config::default(),
        )?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        log::debug!("Watching {} for changes", path.display());

        Ok(PatchWatcher {
            _watcher: watcher,
            changes,
            quiet_period,
        })
    }

    /// Block until the file has changed and then stayed untouched for the quiet period
    ///
    /// Returns `false` once no more changes can arrive.
    pub fn next_change(&self) -> bool {
        settle(&self.changes, self.quiet_period)
    }
}

/// Whether an event might have changed the contents at `file_name`
fn touches(event: &Event, file_name: &OsStr) -> bool {
    !matches!(event.kind, EventKind::Access(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name))
}

/// Wait for a first change, then keep waiting until `quiet_period` passes with no further one
fn settle(changes: &Receiver<()>, quiet_period: Duration) -> bool {
    if changes.recv().is_err() {
        return false;
    }
    loop {
        match changes.recv_timeout(quiet_period) {
            Ok(()) => continue,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use std::thread;
    use std::time::Instant;

    #[test]
    fn burst_of_changes_settles_once() {
        let (sender, changes) = crossbeam_channel::unbounded();
        let writer = thread::spawn(move || {
            for _ in 0..3 {
                sender.send(()).unwrap();
                thread::sleep(Duration::from_millis(20));
            }
            // Keep the channel open past the quiet period
            thread::sleep(Duration::from_millis(300));
        });

        let started = Instant::now();
        assert!(settle(&changes, Duration::from_millis(100)));
        assert!(started.elapsed() >= Duration::from_millis(140));
        assert!(changes.try_recv().is_err());
        writer.join().unwrap();
    }

    #[test]
    fn closed_channel_stops_waiting() {
        let (sender, changes) = crossbeam_channel::unbounded::<()>();
        drop(sender);
        assert!(!settle(&changes, Duration::from_millis(10)));
    }

    #[test]
    fn relevant_events() {
        let name = OsStr::new("fix.patch");
        let event = |kind, path: &str| Event::new(kind).add_path(PathBuf::from(path));

        assert!(touches(
            &event(EventKind::Modify(ModifyKind::Any), "/work/fix.patch"),
            name
        ));
        // Saving through a rename shows up as the new file being created
        assert!(touches(
            &event(EventKind::Create(CreateKind::File), "/work/fix.patch"),
            name
        ));
        assert!(!touches(
            &event(EventKind::Access(AccessKind::Any), "/work/fix.patch"),
            name
        ));
        assert!(!touches(
            &event(EventKind::Modify(ModifyKind::Any), "/work/other.patch"),
            name
        ));
    }
}
