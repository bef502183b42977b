// task_slot.rs - Single-worker executor with room for one in-flight computation
//
// The slot is empty at startup, filled by `TaskSlot::dispatch` and emptied
// again by `TaskSlot::reclaim`. Dispatching into a filled slot is a logic
// error and panics, so two computations can never be outstanding at once.

use std::future::Future;
use std::panic;

use log::trace;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

pub struct TaskSlot<T> {
    runtime: Runtime,
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> TaskSlot<T> {
    /// Start the worker thread.
    pub fn new() -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("conway-worker")
            .enable_time()
            .build()?;
        Ok(Self { runtime, handle: None })
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_none()
    }

    /// Computations dispatched but not yet reclaimed: 0 or 1.
    pub fn outstanding(&self) -> usize {
        usize::from(self.handle.is_some())
    }

    /// True once the in-flight computation has run to completion.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_some_and(JoinHandle::is_finished)
    }

    /// Hand `task` to the worker.
    ///
    /// # Panics
    ///
    /// If a previous computation has not been reclaimed.
    pub fn dispatch<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        assert!(self.handle.is_none(), "dispatch while a computation is still outstanding");
        trace!("dispatching computation");
        self.handle = Some(self.runtime.spawn(task));
    }

    /// Wait for the in-flight computation and take its result. Returns `None`
    /// when the slot is empty.
    ///
    /// A panic on the worker is re-raised here: a half computed generation
    /// cannot be resumed.
    pub fn reclaim(&mut self) -> Option<T> {
        if self.handle.is_some() && !self.is_finished() {
            trace!("waiting on the worker");
        }
        let handle = self.handle.take()?;
        match self.runtime.block_on(handle) {
            Ok(value) => {
                trace!("computation reclaimed");
                Some(value)
            }
            Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            Err(err) => panic!("worker computation cancelled: {err}"),
        }
    }
}

impl<T> Drop for TaskSlot<T> {
    fn drop(&mut self) {
        // Join the outstanding computation before the runtime (and with it the
        // worker thread) goes away. Skip while unwinding to avoid a double panic.
        if let Some(handle) = self.handle.take() {
            if !std::thread::panicking() {
                let _ = self.runtime.block_on(handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[test]
    fn dispatch_then_reclaim() {
        let mut slot = TaskSlot::new().expect("runtime");
        assert!(slot.is_empty());
        assert_eq!(slot.reclaim(), None);

        slot.dispatch(async { 41 + 1 });
        assert_eq!(slot.outstanding(), 1);
        assert_eq!(slot.reclaim(), Some(42));
        assert_eq!(slot.outstanding(), 0);

        slot.dispatch(async { 7 });
        assert_eq!(slot.reclaim(), Some(7));
    }

    #[test]
    fn runs_on_the_named_worker_thread() {
        let mut slot = TaskSlot::new().expect("runtime");
        slot.dispatch(async { std::thread::current().name().map(str::to_owned) });
        assert_eq!(slot.reclaim().flatten().as_deref(), Some("conway-worker"));
    }

    #[test]
    fn reclaim_blocks_until_done() {
        let mut slot = TaskSlot::new().expect("runtime");
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        slot.dispatch(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            flag.store(true, Ordering::SeqCst);
        });
        assert!(!slot.is_finished());
        slot.reclaim();
        assert!(done.load(Ordering::SeqCst));
        assert!(!slot.is_finished());
    }

    #[test]
    fn finished_work_waits_in_the_slot() {
        let mut slot = TaskSlot::new().expect("runtime");
        assert!(!slot.is_finished());
        slot.dispatch(async { "done" });
        while !slot.is_finished() {
            std::thread::sleep(Duration::from_millis(1));
        }
        // still outstanding until reclaimed
        assert_eq!(slot.outstanding(), 1);
        assert_eq!(slot.reclaim(), Some("done"));
        assert!(slot.is_empty());
    }

    #[test]
    #[should_panic(expected = "still outstanding")]
    fn double_dispatch_panics() {
        let mut slot = TaskSlot::new().expect("runtime");
        slot.dispatch(async {});
        slot.dispatch(async {});
    }

    #[test]
    #[should_panic(expected = "worker exploded")]
    fn worker_panic_is_raised_on_reclaim() {
        let mut slot = TaskSlot::<()>::new().expect("runtime");
        slot.dispatch(async { panic!("worker exploded") });
        slot.reclaim();
    }

    #[test]
    fn drop_joins_outstanding_work() {
        let done = Arc::new(AtomicBool::new(false));
        {
            let mut slot = TaskSlot::new().expect("runtime");
            let flag = done.clone();
            slot.dispatch(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                flag.store(true, Ordering::SeqCst);
            });
        }
        assert!(done.load(Ordering::SeqCst));
    }
}
