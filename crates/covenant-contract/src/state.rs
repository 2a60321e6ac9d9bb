//! Invocation lifecycle states

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Where an invocation is in its lifecycle.
///
/// Reads go `Drafted -> Encoded -> Called`. Transactions and deployments go
/// `Drafted -> Encoded -> Signed -> Submitted -> Pending -> Mined`, or end in
/// `TimedOut`. Any state may move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationState {
    /// Created, nothing done yet
    Drafted,
    /// Arguments encoded
    Encoded,
    /// `eth_call` answered and decoded
    Called,
    /// Transaction signed
    Signed,
    /// Broadcast accepted by the node
    Submitted,
    /// Polling for the receipt
    Pending,
    /// Receipt obtained
    Mined,
    /// Deadline passed without a receipt
    TimedOut,
    /// Ended with an error
    Failed,
}

impl InvocationState {
    /// True for states with no successor
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InvocationState::Called
                | InvocationState::Mined
                | InvocationState::TimedOut
                | InvocationState::Failed
        )
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InvocationState::Drafted => "drafted",
            InvocationState::Encoded => "encoded",
            InvocationState::Called => "called",
            InvocationState::Signed => "signed",
            InvocationState::Submitted => "submitted",
            InvocationState::Pending => "pending",
            InvocationState::Mined => "mined",
            InvocationState::TimedOut => "timed out",
            InvocationState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Publishes state transitions of one invocation.
///
/// Direct (non-spawned) invocations carry no channel and only log.
#[derive(Clone, Default)]
pub(crate) struct Progress {
    sender: Option<Arc<watch::Sender<InvocationState>>>,
}

impl Progress {
    pub(crate) fn none() -> Self {
        Self::default()
    }

    pub(crate) fn channel() -> (Self, watch::Receiver<InvocationState>) {
        let (sender, receiver) = watch::channel(InvocationState::Drafted);
        (
            Self {
                sender: Some(Arc::new(sender)),
            },
            receiver,
        )
    }

    pub(crate) fn set(&self, state: InvocationState) {
        debug!(%state, "Invocation state");
        if let Some(sender) = &self.sender {
            sender.send_replace(state);
        }
    }
}
