//! Watch mode.
//!
//! Redeploys scripts as they are saved. Editors often emit several events
//! per save, so events are collected until the directory has been quiet for
//! a short moment and each path is then handled once.

use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::deploy::Deployer;
use crate::discovery::is_script_file;

/// Quiet period before a burst of events is processed.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Script files touched by a create or modify event.
fn changed_scripts(event: &Event) -> impl Iterator<Item = &PathBuf> {
    let relevant = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
    event
        .paths
        .iter()
        .filter(move |path| relevant && is_script_file(path))
}

/// Deploy one changed script, logging failures without stopping.
fn deploy_changed(deployer: &mut Deployer, path: &Path) {
    if let Err(e) = deployer.handle(path) {
        tracing::error!("{}", e);
    }
}

/// Hand each pending path to `on_change` once.
fn flush<F: FnMut(&Path)>(pending: &mut BTreeSet<PathBuf>, on_change: &mut F) {
    for path in std::mem::take(pending) {
        // removed again before we got to it
        if !path.is_file() {
            continue;
        }
        on_change(&path);
    }
}

/// Collect events from `rx` and call `on_change` once per changed script
/// after each burst has been quiet for `debounce`. Returns when the sender
/// side is dropped.
fn run<F: FnMut(&Path)>(
    rx: &mpsc::Receiver<notify::Result<Event>>,
    debounce: Duration,
    mut on_change: F,
) {
    let mut pending = BTreeSet::new();
    loop {
        let received = if pending.is_empty() {
            rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected)
        } else {
            rx.recv_timeout(debounce)
        };

        match received {
            Ok(Ok(event)) => {
                pending.extend(changed_scripts(&event).cloned());
            }
            Ok(Err(e)) => tracing::warn!("Watch error: {}", e),
            Err(mpsc::RecvTimeoutError::Timeout) => flush(&mut pending, &mut on_change),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                flush(&mut pending, &mut on_change);
                return;
            }
        }
    }
}

/// Watch the scripts directory and deploy changes until the watcher fails.
pub fn watch(deployer: &mut Deployer) -> Result<(), notify::Error> {
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx)?;
    let scripts_dir = deployer.config().scripts_dir.clone();
    watcher.watch(&scripts_dir, RecursiveMode::Recursive)?;

    tracing::info!("Watching for changes in {}", scripts_dir.display());

    run(&rx, DEBOUNCE, |path| deploy_changed(deployer, path));
    Ok(())
}
