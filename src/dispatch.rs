// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The UI-affinity execution context.
//!
//! Backend callbacks arrive on whatever thread the audio subsystem owns.
//! Everything that touches the registry collection or an item's fields is
//! marshaled here first: cloneable [`Dispatcher`] handles queue closures,
//! the single owning thread drains them through its [`DispatchQueue`].
//! Queued work runs strictly FIFO, which is what keeps initialize and
//! teardown bodies from interleaving.

use std::sync::mpsc;
use tracing::trace;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Sender half. Cheap to clone, safe to use from backend threads.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<Task>,
}

impl Dispatcher {
    /// Queue `task` for execution on the owning thread. Fire-and-forget:
    /// if the queue is gone (shutdown), the task is dropped silently.
    pub fn invoke(&self, task: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(Box::new(task));
    }
}

/// Receiver half, held by the thread that owns all UI-bound state.
pub struct DispatchQueue {
    rx: mpsc::Receiver<Task>,
}

impl DispatchQueue {
    pub fn new() -> (Dispatcher, DispatchQueue) {
        let (tx, rx) = mpsc::channel();
        (Dispatcher { tx }, DispatchQueue { rx })
    }

    /// Run every task queued so far, then return. Returns the number of
    /// tasks executed. Tasks queued by running tasks are executed too, so
    /// after `drain` the queue is quiescent.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        if ran > 0 {
            trace!("dispatch queue drained {} task(s)", ran);
        }
        ran
    }

    /// Block for the next task and run it. `false` once all dispatchers
    /// are dropped. This is the loop a dedicated UI thread runs.
    pub fn pump(&self) -> bool {
        match self.rx.recv() {
            Ok(task) => {
                task();
                true
            }
            Err(_) => false,
        }
    }
}
