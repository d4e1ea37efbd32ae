use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use parking_lot::{Condvar, Mutex};

use super::Speech;

/// How often the worker checks the stop flag while idle.
const POLL: Duration = Duration::from_millis(100);
/// How long [`SpeechRunner::shutdown`] waits for the worker.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

struct Shared {
    queue: Mutex<VecDeque<String>>,
    ready: Condvar,
    stop: AtomicBool,
}

struct Worker {
    shared: Arc<Shared>,
    handle: JoinHandle<()>,
    // Disconnected when the worker thread returns.
    exited: mpsc::Receiver<()>,
}

/// Non-blocking front end of a [`Speech`] backend: texts are queued
/// and spoken one after the other by a single background thread.
///
/// The queue is bounded; when it is full the oldest pending text is
/// dropped in favor of the new one.  A text being spoken is never
/// interrupted.
pub struct SpeechRunner {
    backend: Arc<dyn Speech>,
    capacity: usize,
    worker: Mutex<Option<Worker>>,
}

impl SpeechRunner {
    /// Runner for `backend` keeping at most `capacity` (≥ 1) pending
    /// texts.  The worker is started lazily.
    pub fn new(backend: Arc<dyn Speech>, capacity: usize) -> Self {
        SpeechRunner { backend, capacity: capacity.max(1),
                       worker: Mutex::new(None) }
    }

    /// Start the worker if it is not running.  It warms the backend
    /// up before consuming the queue.
    pub fn ensure_started(&self) {
        let mut worker = self.worker.lock();
        if worker.is_none() {
            match self.spawn() {
                Ok(w) => *worker = Some(w),
                Err(e) => warn!("cannot start speech worker: {e}"),
            }
        }
    }

    fn spawn(&self) -> std::io::Result<Worker> {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::with_capacity(self.capacity)),
            ready: Condvar::new(),
            stop: AtomicBool::new(false),
        });
        let (tx, exited) = mpsc::channel::<()>();
        let backend = Arc::clone(&self.backend);
        let sh = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("speech-runner".to_string())
            .spawn(move || {
                let _tx = tx;
                run(&*backend, &sh)
            })?;
        Ok(Worker { shared, handle, exited })
    }

    /// Queue `text` without blocking, starting the worker if needed.
    pub fn enqueue(&self, text: impl Into<String>) {
        self.ensure_started();
        let worker = self.worker.lock();
        let Some(w) = worker.as_ref() else { return };
        let mut queue = w.shared.queue.lock();
        if queue.len() >= self.capacity {
            if let Some(old) = queue.pop_front() {
                debug!("speech queue full, dropping “{old}”");
            }
        }
        queue.push_back(text.into());
        w.shared.ready.notify_one();
    }

    /// Number of texts waiting to be spoken.
    pub fn pending(&self) -> usize {
        self.worker.lock().as_ref().map_or(0, |w| w.shared.queue.lock().len())
    }

    /// Ask the worker to stop and wait briefly for it.  A worker still
    /// busy speaking after the grace period is left to finish on its
    /// own.  Pending texts are discarded.  The runner may be started
    /// again afterwards.
    pub fn shutdown(&self) {
        let Some(w) = self.worker.lock().take() else { return };
        w.shared.stop.store(true, Ordering::SeqCst);
        w.shared.ready.notify_all();
        match w.exited.recv_timeout(SHUTDOWN_GRACE) {
            Err(mpsc::RecvTimeoutError::Timeout) => {
                debug!("speech worker still busy, detaching it");
            }
            _ => {
                if w.handle.join().is_err() {
                    warn!("speech worker panicked");
                }
            }
        }
    }
}

impl Drop for SpeechRunner {
    fn drop(&mut self) { self.shutdown() }
}

fn run(backend: &dyn Speech, shared: &Shared) {
    if let Err(e) = backend.warmup() {
        warn!("speech warmup failed: {e}");
    }
    while !shared.stop.load(Ordering::SeqCst) {
        let text = {
            let mut queue = shared.queue.lock();
            if queue.is_empty() {
                shared.ready.wait_for(&mut queue, POLL);
            }
            if shared.stop.load(Ordering::SeqCst) { break }
            queue.pop_front()
        };
        if let Some(text) = text {
            if let Err(e) = backend.speak(&text) {
                warn!("speech failed: {e}");
            }
        }
    }
}
