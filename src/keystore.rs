//! Wallet-side collaborators: keystores and their optional background
//! workers.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bitcoin::Address;
use tokio::task::JoinHandle;

use crate::handler::Handler;

/// How long a stopped worker gets to wind down before it is aborted.
const STOP_GRACE: Duration = Duration::from_secs(2);

/// Wallet-side object holding the key-derivation metadata for one paired
/// device.
pub trait HardwareKeystore: Send + Sync {
    /// Extended public key this keystore derives addresses from.
    fn xpub(&self) -> &str;

    /// Tag of the vendor integration that owns this keystore. Lifecycle
    /// operations only apply when it matches the plugin's own tag.
    fn plugin_kind(&self) -> &'static str;

    /// UI prompt surface for this keystore.
    fn handler(&self) -> Arc<dyn Handler>;

    /// Long-lived background task owned by this keystore, when one is
    /// running. A keystore without a worker returns `None`; that is not an
    /// error.
    fn worker(&self) -> Option<&WorkerHandle> {
        None
    }
}

/// The wallet owning a set of keystores.
pub trait WalletBackend: Send + Sync {
    fn get_keystores(&self) -> Vec<Arc<dyn HardwareKeystore>>;

    fn is_mine(&self, address: &Address) -> bool;
}

/// Cooperative stop flag handed to a spawned worker. The worker is expected
/// to poll it between units of work and return once it reads true.
#[derive(Clone)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Handle to a keystore's background task (e.g. a polling or prompt-relay
/// loop).
///
/// `stop()` is idempotent and fire-and-forget: it flips the stop flag and
/// gives the task a bounded grace period to wind down before aborting it;
/// it never blocks the caller on a join.
pub struct WorkerHandle {
    stopped: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerHandle {
    /// Spawn a worker onto the current tokio runtime.
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(StopSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let stopped = Arc::new(AtomicBool::new(false));
        let signal = StopSignal {
            stopped: stopped.clone(),
        };
        let task = tokio::spawn(f(signal));
        Self {
            stopped,
            task: Mutex::new(Some(task)),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Request the worker to stop. The first call flips the flag and arms
    /// the grace timer; later calls return immediately.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(mut task) = self.task.lock().ok().and_then(|mut guard| guard.take()) else {
            return;
        };
        log::debug!("stopping keystore worker");
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn(async move {
                    if tokio::time::timeout(STOP_GRACE, &mut task).await.is_err() {
                        log::warn!(
                            "keystore worker did not stop within {:?}, aborting",
                            STOP_GRACE
                        );
                        task.abort();
                    }
                });
            }
            // No runtime to supervise the grace period from, so cut the
            // task loose directly.
            Err(_) => task.abort(),
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_worker_observes_stop_signal() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_in_worker = ticks.clone();
        let worker = WorkerHandle::spawn(move |signal| async move {
            while !signal.is_stopped() {
                ticks_in_worker.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!worker.is_stopped());
        worker.stop();
        assert!(worker.is_stopped());

        tokio::time::sleep(Duration::from_millis(20)).await;
        let after_stop = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let worker = WorkerHandle::spawn(|signal| async move {
            while !signal.is_stopped() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });
        worker.stop();
        worker.stop();
        worker.stop();
        assert!(worker.is_stopped());
    }
}
