//! The workspace watcher.
//!
//! Wraps a recursive `notify` watcher. Filtering and classification run on
//! the notify callback thread; accepted changes arrive on a bounded tokio
//! channel as fully classified [`ChangeRecord`]s. Dropping the watcher
//! stops observation.

use std::path::Path;
use std::time::Instant;

use muse_core::{ChangeKind, ChangeRecord};
use notify::event::{CreateKind, EventKind, ModifyKind, RemoveKind};
use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::classifier::Classifier;
use crate::errors::Result;
use crate::filter::ChangeFilter;

/// Channel capacity for classified changes. Bursts beyond this apply
/// backpressure on the notify thread.
const CHANNEL_CAPACITY: usize = 256;

/// A running recursive watch over one workspace.
pub struct WorkspaceWatcher {
    // Held for its Drop; the watch stops when this goes away
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<ChangeRecord>,
}

impl WorkspaceWatcher {
    /// Start watching a workspace root.
    pub fn start(root: &Path, filter: ChangeFilter, mut classifier: Classifier) -> Result<Self> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
            let event = match result {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "watch error, event dropped");
                    return;
                }
            };
            let Some(kind) = map_event_kind(&event.kind) else {
                return;
            };
            for path in event.paths {
                if !filter.accepts(&path) {
                    continue;
                }
                let Some(record) = classifier.classify(&path, kind, Instant::now()) else {
                    continue;
                };
                debug!(path = %record.path.display(), kind = %record.kind, "classified change");
                if tx.blocking_send(record).is_err() {
                    // Session ended; nothing left to deliver to
                    return;
                }
            }
        })?;

        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Receive the next classified change, or `None` once the watch stops.
    pub async fn next(&mut self) -> Option<ChangeRecord> {
        self.rx.recv().await
    }
}

/// Map a notify event kind onto a change kind. `None` means the event is
/// uninteresting (access notifications, metadata-only changes).
fn map_event_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(CreateKind::File | CreateKind::Any) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Name(_)) => {
            Some(ChangeKind::Modified)
        }
        EventKind::Remove(RemoveKind::File | RemoveKind::Any) => Some(ChangeKind::Deleted),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{DataChange, MetadataKind, RenameMode};

    #[test]
    fn create_and_remove_map() {
        assert_eq!(
            map_event_kind(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            map_event_kind(&EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Deleted)
        );
    }

    #[test]
    fn data_modifications_map_to_modified() {
        assert_eq!(
            map_event_kind(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(ChangeKind::Modified)
        );
        assert_eq!(
            map_event_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::To))),
            Some(ChangeKind::Modified)
        );
    }

    #[test]
    fn metadata_and_access_events_ignored() {
        assert_eq!(
            map_event_kind(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))),
            None
        );
        assert_eq!(map_event_kind(&EventKind::Access(notify::event::AccessKind::Any)), None);
    }
}
