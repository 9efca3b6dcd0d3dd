//! Scatter/gather execution of independent filesystem tasks
//!
//! A [`TaskQueue`] is created per reconciliation pass. The walk schedules
//! tasks through `&mut self`, so only one thread of control can ever be
//! scheduling on a queue. Each task runs on its own blocking worker; failures
//! are collected as values and returned together by [`TaskQueue::wait`],
//! which consumes the queue so it can only be drained once.

use std::any::Any;

use tokio::runtime::{Builder, Runtime};
use tokio::task::{JoinError, JoinSet};

use crate::{Error, Result};

/// Unbounded fan-out of error-producing tasks with a completion barrier.
pub struct TaskQueue {
    runtime: Runtime,
    tasks: JoinSet<Result<()>>,
    scheduled: usize,
}

impl TaskQueue {
    /// Create an empty queue with its own task runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] if the runtime cannot be started.
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .thread_name("tdm-task")
            .build()
            .map_err(|source| Error::Runtime { source })?;

        Ok(Self {
            runtime,
            tasks: JoinSet::new(),
            scheduled: 0,
        })
    }

    /// Dispatch `task` for concurrent execution.
    pub fn schedule<F, E>(&mut self, task: F)
    where
        F: FnOnce() -> std::result::Result<(), E> + Send + 'static,
        E: Into<Error>,
    {
        self.scheduled += 1;
        self.tasks
            .spawn_blocking_on(move || task().map_err(Into::into), self.runtime.handle());
    }

    /// Fold an error found while scheduling into the collected results.
    pub fn schedule_error(&mut self, error: impl Into<Error>) {
        let error = error.into();
        self.schedule(move || Err::<(), Error>(error));
    }

    /// Number of tasks scheduled so far.
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    /// Block until every scheduled task has finished and return all failures.
    ///
    /// A failing or panicking task never prevents the others from running.
    pub fn wait(self) -> Vec<Error> {
        let Self {
            runtime,
            mut tasks,
            scheduled,
        } = self;

        let (received, errors) = runtime.block_on(async move {
            let mut received = 0usize;
            let mut errors = Vec::new();
            while let Some(joined) = tasks.join_next().await {
                received += 1;
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => errors.push(error),
                    Err(join_error) => errors.push(panicked(join_error)),
                }
            }
            (received, errors)
        });

        debug_assert_eq!(received, scheduled);
        tracing::debug!(scheduled, failed = errors.len(), "task queue drained");
        errors
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("scheduled", &self.scheduled)
            .field("in_flight", &self.tasks.len())
            .finish()
    }
}

fn panicked(error: JoinError) -> Error {
    let message = if error.is_panic() {
        panic_message(error.into_panic())
    } else {
        error.to_string()
    };
    Error::TaskPanicked { message }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};

    fn missing(name: &str) -> tdm_fs::Error {
        tdm_fs::Error::io(
            PathBuf::from(name),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        )
    }

    #[test]
    fn empty_queue_drains_immediately() {
        let queue = TaskQueue::new().unwrap();
        assert!(queue.wait().is_empty());
    }

    #[test]
    fn every_task_runs_exactly_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut queue = TaskQueue::new().unwrap();

        for _ in 0..200 {
            let counter = Arc::clone(&counter);
            queue.schedule(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), Error>(())
            });
        }

        assert_eq!(queue.scheduled(), 200);
        assert!(queue.wait().is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn failures_are_collected_without_cancelling_siblings() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut queue = TaskQueue::new().unwrap();

        for i in 0..10 {
            let counter = Arc::clone(&counter);
            queue.schedule(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                if i % 3 == 0 {
                    Err(missing(&format!("file-{i}")))
                } else {
                    Ok(())
                }
            });
        }

        let errors = queue.wait();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(Error::is_not_found));
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn scheduled_errors_are_reported() {
        let mut queue = TaskQueue::new().unwrap();
        queue.schedule_error(missing("a"));
        queue.schedule(|| Ok::<(), Error>(()));
        queue.schedule_error(Error::HomeDirUnavailable);

        let errors = queue.wait();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn panicking_task_becomes_an_error() {
        let mut queue = TaskQueue::new().unwrap();
        queue.schedule(|| -> Result<()> { panic!("boom") });
        queue.schedule(|| Ok::<(), Error>(()));

        let errors = queue.wait();
        assert_eq!(errors.len(), 1);
        assert!(
            matches!(&errors[0], Error::TaskPanicked { message } if message == "boom"),
            "got {:?}",
            errors[0]
        );
    }

    #[test]
    fn tasks_run_concurrently() {
        // Each task waits for all the others; this only completes if they
        // are in flight at the same time.
        let workers = 8;
        let barrier = Arc::new(Barrier::new(workers));
        let mut queue = TaskQueue::new().unwrap();

        for _ in 0..workers {
            let barrier = Arc::clone(&barrier);
            queue.schedule(move || {
                barrier.wait();
                Ok::<(), Error>(())
            });
        }

        assert!(queue.wait().is_empty());
    }
}
