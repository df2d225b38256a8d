use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::cache_gate::{should_fetch, today_key};
use crate::config::GeminiConfig;
use crate::persist::SnapshotStore;
use crate::picks_fetch::fetch_daily_picks;
use crate::state::{Delta, ProviderCommand};

/// Runs the acquisition flow off the render thread: one pass on startup,
/// then one pass per `FetchPicks` command. The UI's refresh key is the only
/// command source and it is disabled while a fetch is in flight, so at most
/// one request is ever outstanding.
pub fn spawn_picks_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    cfg: GeminiConfig,
    store: Option<SnapshotStore>,
) {
    thread::spawn(move || {
        if !serve_or_fetch(&tx, &cfg, store.as_ref(), false) {
            return;
        }
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::FetchPicks { force } => {
                    if !serve_or_fetch(&tx, &cfg, store.as_ref(), force) {
                        return;
                    }
                }
            }
        }
        // Command channel closed: the UI is gone.
    });
}

/// One cache-gate pass. Returns false once the UI side has hung up; the
/// disconnected channel doubles as the cancellation signal, so no update can
/// land after teardown.
fn serve_or_fetch(
    tx: &Sender<Delta>,
    cfg: &GeminiConfig,
    store: Option<&SnapshotStore>,
    force: bool,
) -> bool {
    let today = today_key();
    let persisted = store.and_then(|s| s.read());

    if !should_fetch(persisted.as_ref(), &today, force) {
        if let Some(snapshot) = persisted {
            let count = snapshot.games.len();
            if tx.send(Delta::SetSnapshot(snapshot)).is_err() {
                return false;
            }
            return tx
                .send(Delta::Log(format!(
                    "[INFO] Served {count} picks from today's cache"
                )))
                .is_ok();
        }
    }

    if tx.send(Delta::FetchStarted).is_err() {
        return false;
    }
    if tx
        .send(Delta::Log(
            "[INFO] Fetching fresh recommendations from Gemini...".to_string(),
        ))
        .is_err()
    {
        return false;
    }

    match fetch_daily_picks(cfg) {
        Ok((snapshot, dropped)) => {
            if dropped > 0 {
                let _ = tx.send(Delta::Log(format!(
                    "[WARN] Dropped {dropped} malformed entries from model payload"
                )));
            }
            if let Some(store) = store {
                store.write(&snapshot);
            }
            let count = snapshot.games.len();
            if tx.send(Delta::SetSnapshot(snapshot)).is_err() {
                return false;
            }
            tx.send(Delta::Log(format!("[INFO] Synced {count} picks")))
                .is_ok()
        }
        Err(err) => {
            // Full detail stays in the log; the banner only ever shows one
            // of the two user messages.
            if tx
                .send(Delta::Log(format!("[WARN] Fetch failed: {err}")))
                .is_err()
            {
                return false;
            }
            tx.send(Delta::FetchFailed {
                message: err.user_message().to_string(),
            })
            .is_ok()
        }
    }
}
