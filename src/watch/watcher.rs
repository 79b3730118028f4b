// src/watch/watcher.rs

use std::path::PathBuf;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::engine::{ChangeKind, WatchEvent};
use crate::errors::Result;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching and, once queued events are drained, makes the
/// forwarding task send [`WatchEvent::NotificationsClosed`].
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and forward one [`WatchEvent::FileChanged`] per
/// path per notification, in delivery order.
///
/// Fails if the OS subscription cannot be established.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    events_tx: mpsc::Sender<WatchEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();

    // Channel from the blocking notify callback into the async world.
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if notify_tx.send(event).is_err() {
                    trace!("notify event dropped; forwarder gone");
                }
            }
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("watching {:?}", root);

    tokio::spawn(async move {
        while let Some(event) = notify_rx.recv().await {
            let kind = ChangeKind::from_notify(&event.kind);
            trace!(?event, ?kind, "received notify event");

            for path in event.paths {
                if events_tx
                    .send(WatchEvent::FileChanged { path, kind })
                    .await
                    .is_err()
                {
                    debug!("watch loop gone; stopping notify forwarder");
                    return;
                }
            }
        }
        debug!("notify stream ended");
        let _ = events_tx.send(WatchEvent::NotificationsClosed).await;
    });

    Ok(WatcherHandle { _inner: watcher })
}
