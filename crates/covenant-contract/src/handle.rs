//! Handles to invocations running on the worker pool

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::{InvocationState, Progress};
use crate::ContractError;

enum Inner<T> {
    Task(JoinHandle<Result<T, ContractError>>),
    Failed(Option<ContractError>),
}

/// A spawned invocation.
///
/// Await it for the result; query [`state`](Self::state) meanwhile. Dropping
/// the handle (or calling [`detach`](Self::detach)) leaves the task running,
/// so a broadcast transaction is still polled to completion.
pub struct InvocationHandle<T> {
    inner: Inner<T>,
    state: watch::Receiver<InvocationState>,
}

impl<T: Send + 'static> InvocationHandle<T> {
    /// Spawn on `runtime`, or on the ambient runtime when `None`
    pub(crate) fn spawn<F>(runtime: Option<&Handle>, make: impl FnOnce(Progress) -> F) -> Self
    where
        F: Future<Output = Result<T, ContractError>> + Send + 'static,
    {
        let runtime = match runtime {
            Some(runtime) => runtime.clone(),
            None => match Handle::try_current() {
                Ok(runtime) => runtime,
                Err(e) => return Self::failed(ContractError::Worker(e.to_string())),
            },
        };

        let (progress, state) = Progress::channel();
        let task = runtime.spawn(make(progress));
        Self {
            inner: Inner::Task(task),
            state,
        }
    }

    fn failed(err: ContractError) -> Self {
        let (progress, state) = Progress::channel();
        progress.set(InvocationState::Failed);
        Self {
            inner: Inner::Failed(Some(err)),
            state,
        }
    }
}

impl<T> InvocationHandle<T> {
    /// Latest published state
    pub fn state(&self) -> InvocationState {
        *self.state.borrow()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<InvocationState> {
        self.state.clone()
    }

    /// True once the result is ready
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            Inner::Task(task) => task.is_finished(),
            Inner::Failed(_) => true,
        }
    }

    /// Stop waiting for the result. The invocation itself keeps running.
    pub fn detach(self) {}
}

impl<T> Future for InvocationHandle<T> {
    type Output = Result<T, ContractError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            Inner::Task(task) => Pin::new(task).poll(cx).map(|joined| match joined {
                Ok(result) => result,
                Err(e) => Err(ContractError::Worker(e.to_string())),
            }),
            Inner::Failed(err) => Poll::Ready(Err(err
                .take()
                .unwrap_or_else(|| ContractError::Worker("result already taken".to_string())))),
        }
    }
}

impl<T> std::fmt::Debug for InvocationHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationHandle")
            .field("state", &self.state())
            .field("finished", &self.is_finished())
            .finish()
    }
}
