use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetChange {
    Created(PathBuf),
    Removed(PathBuf),
    /// Both halves of a rename or move.
    Moved { from: PathBuf, to: PathBuf },
    /// One side of a rename whose counterpart never arrived.
    Renamed(PathBuf),
}

#[derive(Debug)]
struct PendingRename {
    tracker: Option<usize>,
    path: PathBuf,
    carried: bool,
}

/// Joins the `From`/`To` halves of rename events. A `From` half waits one
/// drain for its partner before it is reported on its own.
#[derive(Debug, Default)]
struct RenamePairing {
    pending: Vec<PendingRename>,
}

impl RenamePairing {
    fn push(&mut self, event: Event, out: &mut Vec<AssetChange>) {
        let EventKind::Modify(ModifyKind::Name(mode)) = &event.kind else {
            out.extend(event.paths.into_iter().filter_map(|path| classify(&event.kind, path)));
            return;
        };
        let mode = *mode;
        let tracker = event.tracker();
        let mut paths = event.paths.into_iter();
        match mode {
            RenameMode::Both => match (paths.next(), paths.next()) {
                (Some(from), Some(to)) => {
                    self.pending.retain(|pending| pending.path != from);
                    out.push(AssetChange::Moved { from, to });
                }
                (Some(path), None) => out.push(AssetChange::Renamed(path)),
                _ => {}
            },
            RenameMode::From => {
                self.pending.extend(paths.map(|path| PendingRename { tracker, path, carried: false }));
            }
            RenameMode::To => {
                for to in paths {
                    let partner = match tracker {
                        Some(id) => self.pending.iter().position(|pending| pending.tracker == Some(id)),
                        None => self.pending.iter().rposition(|pending| pending.tracker.is_none()),
                    };
                    match partner {
                        Some(index) => {
                            let from = self.pending.remove(index).path;
                            out.push(AssetChange::Moved { from, to });
                        }
                        None => out.push(AssetChange::Renamed(to)),
                    }
                }
            }
            _ => out.extend(paths.map(AssetChange::Renamed)),
        }
    }

    /// Reports `From` halves that already waited a full drain.
    fn flush_stale(&mut self, out: &mut Vec<AssetChange>) {
        let (stale, fresh): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|pending| pending.carried);
        out.extend(stale.into_iter().map(|pending| AssetChange::Renamed(pending.path)));
        self.pending = fresh.into_iter().map(|pending| PendingRename { carried: true, ..pending }).collect();
    }
}

/// Filesystem watcher over the assets root. Events arrive on the watcher
/// thread and are drained on the UI thread.
pub struct AssetWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    root: PathBuf,
    renames: RenamePairing,
}

impl AssetWatcher {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.exists() {
            anyhow::bail!("path '{}' does not exist", root.display());
        }
        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher
            .configure(
                NotifyConfig::default()
                    .with_compare_contents(false)
                    .with_poll_interval(Duration::from_millis(300)),
            )
            .context("configure asset watcher")?;
        let normalized = normalize_watch_path(root);
        watcher
            .watch(&normalized, RecursiveMode::Recursive)
            .with_context(|| format!("watch {}", normalized.display()))?;
        Ok(Self { _watcher: watcher, rx, root: normalized, renames: RenamePairing::default() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn drain_changes(&mut self) -> Vec<AssetChange> {
        let mut changes = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(event) => self.renames.push(event, &mut changes),
                Err(err) => log::warn!(target: "assets", "asset watcher error: {err}"),
            }
        }
        self.renames.flush_stale(&mut changes);
        changes
    }
}

fn classify(kind: &EventKind, path: PathBuf) -> Option<AssetChange> {
    match kind {
        EventKind::Create(_) => Some(AssetChange::Created(path)),
        EventKind::Remove(_) => Some(AssetChange::Removed(path)),
        _ => None,
    }
}

fn normalize_watch_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else if let Ok(cwd) = env::current_dir() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    };
    fs::canonicalize(&absolute).unwrap_or(absolute)
}
