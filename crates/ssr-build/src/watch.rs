//! Build-finished notifications.

use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use ssr_core::{CLIENT_MANIFEST_FILE, TEMPLATE_FILE};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::debug;

use crate::error::{BuildError, BuildResult};

/// A client build wrote new output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFinished {
    /// Output files that changed.
    pub paths: Vec<PathBuf>,
}

/// Watches a build output directory for the template and client manifest.
pub struct OutputWatcher {
    _watcher: RecommendedWatcher,
    dir: PathBuf,
}

impl OutputWatcher {
    /// Start watching `dir`. Notifications arrive on the returned receiver
    /// until the watcher is dropped.
    pub fn new(dir: &Path) -> BuildResult<(Self, UnboundedReceiver<BuildFinished>)> {
        let (tx, rx) = unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let Ok(event) = res else { return };
                if let Some(finished) = build_finished(&event) {
                    let _ = tx.send(finished);
                }
            },
            Config::default(),
        )
        .map_err(|e| watch_error(dir, e))?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| watch_error(dir, e))?;
        debug!(dir = %dir.display(), "Watching build output");

        Ok((
            Self {
                _watcher: watcher,
                dir: dir.to_path_buf(),
            },
            rx,
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl std::fmt::Debug for OutputWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputWatcher").field("dir", &self.dir).finish()
    }
}

/// Whether a changed file is one the renderer reloads.
pub fn is_build_output(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        Some(TEMPLATE_FILE) | Some(CLIENT_MANIFEST_FILE)
    )
}

fn build_finished(event: &Event) -> Option<BuildFinished> {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return None;
    }
    let paths: Vec<PathBuf> = event
        .paths
        .iter()
        .filter(|p| is_build_output(p))
        .cloned()
        .collect();
    (!paths.is_empty()).then_some(BuildFinished { paths })
}

fn watch_error(dir: &Path, e: notify::Error) -> BuildError {
    BuildError::Watch {
        path: dir.display().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn test_is_build_output() {
        assert!(is_build_output(Path::new("/dist/index.html")));
        assert!(is_build_output(Path::new("/dist/vue-ssr-client-manifest.json")));
        assert!(!is_build_output(Path::new("/dist/vue-ssr-server-bundle.json")));
        assert!(!is_build_output(Path::new("/dist/app.js")));
    }

    #[test]
    fn test_relevant_events() {
        let created = Event::new(EventKind::Create(CreateKind::File))
            .add_path("/dist/app.js".into())
            .add_path("/dist/index.html".into());
        let removed =
            Event::new(EventKind::Remove(RemoveKind::File)).add_path("/dist/index.html".into());
        let unrelated = Event::new(EventKind::Modify(ModifyKind::Any)).add_path("/dist/app.js".into());

        assert_eq!(
            build_finished(&created),
            Some(BuildFinished {
                paths: vec![PathBuf::from("/dist/index.html")]
            })
        );
        assert_eq!(build_finished(&removed), None);
        assert_eq!(build_finished(&unrelated), None);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let result = OutputWatcher::new(Path::new("/nonexistent/ssr-output"));

        assert!(matches!(result, Err(BuildError::Watch { .. })));
    }
}
