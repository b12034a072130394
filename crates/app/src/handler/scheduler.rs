//! Background scheduler for handler work that must not block the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Runs handler tasks on a tokio runtime.
///
/// One scheduler is shared by every handler of a binding; it is cheap to
/// clone.
#[derive(Clone)]
pub struct Scheduler {
    name: Arc<str>,
    handle: Handle,
}

impl Scheduler {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    /// Scheduler on the runtime the caller is running in, if any.
    #[must_use]
    pub fn current(name: impl Into<Arc<str>>) -> Option<Self> {
        Handle::try_current().ok().map(|handle| Self::new(name, handle))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `task` once in the background.
    pub fn spawn<F>(&self, task: F) -> ScheduledTask
    where
        F: Future<Output = ()> + Send + 'static,
    {
        ScheduledTask(self.handle.spawn(task))
    }

    /// Run `task` after `initial_delay`, then again `delay` after each run
    /// completes, until cancelled.
    pub fn schedule_with_fixed_delay<F, Fut>(
        &self,
        initial_delay: Duration,
        delay: Duration,
        mut task: F,
    ) -> ScheduledTask
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = Arc::clone(&self.name);
        ScheduledTask(self.handle.spawn(async move {
            tokio::time::sleep(initial_delay).await;
            loop {
                task().await;
                tracing::trace!(scheduler = %name, "periodic task ran");
                tokio::time::sleep(delay).await;
            }
        }))
    }
}

/// Handle to a background task; aborts the task when cancelled or dropped.
#[derive(Debug)]
pub struct ScheduledTask(JoinHandle<()>);

impl ScheduledTask {
    pub fn cancel(self) {
        self.0.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}
