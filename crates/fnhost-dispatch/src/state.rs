//! Dispatcher readiness state.
//!
//! One authoritative value per host, held in a `watch` channel. The
//! worker-lifecycle manager owns the only [`DispatcherStateWriter`];
//! admission gates hold cloned [`DispatcherStateReader`]s and suspend on
//! change notifications instead of polling.

use std::fmt;

use tokio::sync::watch;
use tracing::debug;

use crate::error::{DispatchError, DispatchResult};

/// Lifecycle stage of the worker dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DispatcherState {
    /// Nothing has started yet.
    #[default]
    Default,
    /// Worker startup has begun.
    Initializing,
    /// At least one worker accepts invocations.
    Initialized,
    /// A worker crashed or is being replaced.
    WorkerProcessRestarting,
    /// The host is shutting down.
    Disposing,
    /// The host is gone.
    Disposed,
}

impl DispatcherState {
    /// Only `Initialized` admits work.
    pub fn is_ready(self) -> bool {
        self == Self::Initialized
    }

    /// `Disposing` and `Disposed` never lead back to `Initialized`.
    pub fn is_stopping(self) -> bool {
        matches!(self, Self::Disposing | Self::Disposed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::WorkerProcessRestarting => "worker_process_restarting",
            Self::Disposing => "disposing",
            Self::Disposed => "disposed",
        }
    }
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create a state cell starting at [`DispatcherState::Default`].
pub fn state_cell() -> (DispatcherStateWriter, DispatcherStateReader) {
    let (tx, rx) = watch::channel(DispatcherState::Default);
    (DispatcherStateWriter { tx }, DispatcherStateReader { rx })
}

/// The single writer of the dispatcher state. Not `Clone`.
#[derive(Debug)]
pub struct DispatcherStateWriter {
    tx: watch::Sender<DispatcherState>,
}

impl DispatcherStateWriter {
    pub fn current(&self) -> DispatcherState {
        *self.tx.borrow()
    }

    /// Move to `next`, returning the previous state.
    ///
    /// Readers are only woken when the value actually changes. Leaving
    /// `Disposed` is rejected.
    pub fn transition(&self, next: DispatcherState) -> DispatchResult<DispatcherState> {
        let prev = self.current();
        if prev == next {
            return Ok(prev);
        }
        if prev == DispatcherState::Disposed {
            return Err(DispatchError::InvalidTransition {
                from: prev,
                to: next,
            });
        }

        self.tx.send_replace(next);
        debug!(from = %prev, to = %next, "dispatcher state changed");
        Ok(prev)
    }

    /// A new reader observing this cell.
    pub fn reader(&self) -> DispatcherStateReader {
        DispatcherStateReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only handle to the dispatcher state.
#[derive(Debug, Clone)]
pub struct DispatcherStateReader {
    rx: watch::Receiver<DispatcherState>,
}

impl DispatcherStateReader {
    pub fn current(&self) -> DispatcherState {
        *self.rx.borrow()
    }

    /// Suspend until the state moves past the last value this reader saw,
    /// and return the new state.
    pub async fn changed(&mut self) -> DispatchResult<DispatcherState> {
        self.rx
            .changed()
            .await
            .map_err(|_| DispatchError::StateChannelClosed)?;
        Ok(*self.rx.borrow_and_update())
    }

    /// Suspend until the dispatcher is ready or stopping.
    ///
    /// Resolves immediately if it already is. Fails only if the writer
    /// has been dropped while the state was still unsettled.
    pub async fn settled(&self) -> DispatchResult<DispatcherState> {
        let mut rx = self.rx.clone();
        let state = *rx
            .wait_for(|s| s.is_ready() || s.is_stopping())
            .await
            .map_err(|_| DispatchError::StateChannelClosed)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_at_default() {
        let (writer, reader) = state_cell();
        assert_eq!(writer.current(), DispatcherState::Default);
        assert_eq!(reader.current(), DispatcherState::Default);
        assert!(!reader.current().is_ready());
    }

    #[test]
    fn only_initialized_is_ready() {
        use DispatcherState::*;
        for state in [Default, Initializing, WorkerProcessRestarting, Disposing, Disposed] {
            assert!(!state.is_ready(), "{state} must not admit");
        }
        assert!(Initialized.is_ready());
        assert!(Disposing.is_stopping());
        assert!(Disposed.is_stopping());
        assert!(!WorkerProcessRestarting.is_stopping());
    }

    #[test]
    fn transitions_are_visible_to_every_reader() {
        let (writer, reader) = state_cell();
        let second = writer.reader();

        let prev = writer.transition(DispatcherState::Initializing).unwrap();
        assert_eq!(prev, DispatcherState::Default);
        writer.transition(DispatcherState::Initialized).unwrap();

        assert_eq!(reader.current(), DispatcherState::Initialized);
        assert_eq!(second.clone().current(), DispatcherState::Initialized);
    }

    #[test]
    fn disposed_is_terminal() {
        let (writer, _reader) = state_cell();
        writer.transition(DispatcherState::Disposing).unwrap();
        writer.transition(DispatcherState::Disposed).unwrap();

        let err = writer.transition(DispatcherState::Initialized).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InvalidTransition {
                from: DispatcherState::Disposed,
                to: DispatcherState::Initialized,
            }
        ));
        assert_eq!(writer.current(), DispatcherState::Disposed);
        assert!(writer.transition(DispatcherState::Disposed).is_ok());
    }

    #[test]
    fn display_uses_snake_case() {
        assert_eq!(
            DispatcherState::WorkerProcessRestarting.to_string(),
            "worker_process_restarting"
        );
    }

    #[tokio::test]
    async fn settled_wakes_on_initialized() {
        let (writer, reader) = state_cell();
        writer.transition(DispatcherState::Initializing).unwrap();

        let waiter = tokio::spawn(async move { reader.settled().await });
        tokio::task::yield_now().await;
        writer.transition(DispatcherState::WorkerProcessRestarting).unwrap();
        writer.transition(DispatcherState::Initialized).unwrap();

        let state = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(state, DispatcherState::Initialized);
    }

    #[tokio::test]
    async fn changed_reports_each_transition() {
        let (writer, mut reader) = state_cell();

        writer.transition(DispatcherState::Initializing).unwrap();
        assert_eq!(reader.changed().await.unwrap(), DispatcherState::Initializing);

        let waiter = tokio::spawn(async move { reader.changed().await });
        tokio::task::yield_now().await;
        writer.transition(DispatcherState::Initialized).unwrap();

        let state = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(state, DispatcherState::Initialized);
    }

    #[tokio::test]
    async fn changed_fails_when_writer_dropped() {
        let (writer, mut reader) = state_cell();
        drop(writer);
        assert!(matches!(
            reader.changed().await,
            Err(DispatchError::StateChannelClosed)
        ));
    }

    #[tokio::test]
    async fn settled_fails_when_writer_dropped() {
        let (writer, reader) = state_cell();
        drop(writer);
        assert!(matches!(
            reader.settled().await,
            Err(DispatchError::StateChannelClosed)
        ));
    }

    #[tokio::test]
    async fn settled_returns_current_terminal_state_after_writer_dropped() {
        let (writer, reader) = state_cell();
        writer.transition(DispatcherState::Disposed).unwrap();
        drop(writer);
        assert_eq!(reader.settled().await.unwrap(), DispatcherState::Disposed);
    }
}
