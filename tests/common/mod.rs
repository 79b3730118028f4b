#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use devloop::engine::{ChangeKind, WatchEvent};

pub use devloop_test_utils::init_tracing;

pub fn written(path: &str) -> WatchEvent {
    WatchEvent::FileChanged {
        path: PathBuf::from(path),
        kind: ChangeKind::Written,
    }
}

pub fn created(path: &str) -> WatchEvent {
    WatchEvent::FileChanged {
        path: PathBuf::from(path),
        kind: ChangeKind::Created,
    }
}

/// Poll `cond` every few milliseconds until it holds, panicking after 5s.
pub async fn eventually(what: &str, mut cond: impl FnMut() -> bool) {
    let res = tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(res.is_ok(), "timed out waiting for: {what}");
}

/// True once `pid` no longer exists or is a zombie waiting for its parent.
#[cfg(target_os = "linux")]
pub fn process_gone(pid: i32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Err(_) => true,
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .is_some_and(|rest| rest.trim_start().starts_with('Z')),
    }
}
