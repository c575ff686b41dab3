//! Cancellation linking for a single invocation.
//!
//! An invocation can be cancelled from two independent places: the
//! invoking framework (host shutdown, function timeout) and the
//! transport request that triggered it (client disconnect). [`compose`]
//! merges whichever of the two are present into one
//! [`InvocationCancellation`].

use tokio_util::sync::CancellationToken;

/// The cancellation surface handed to the invocation pipeline.
#[derive(Debug)]
pub enum InvocationCancellation {
    /// No source was supplied. Never cancelled.
    None,
    /// Exactly one source was supplied; it is passed through unchanged.
    Source(CancellationToken),
    /// Both sources were supplied and are linked.
    Linked(LinkedCancellation),
}

/// Cancelled as soon as either of two sources is, or when cancelled
/// directly.
///
/// Linking registers nothing on the sources up front. They are only
/// watched while a [`cancelled`](Self::cancelled) future is being polled,
/// so long-lived sources never accumulate links to finished invocations
/// and composing needs no runtime.
#[derive(Debug)]
pub struct LinkedCancellation {
    token: CancellationToken,
    sources: [CancellationToken; 2],
}

impl LinkedCancellation {
    fn new(a: CancellationToken, b: CancellationToken) -> Self {
        let token = CancellationToken::new();
        if a.is_cancelled() || b.is_cancelled() {
            token.cancel();
        }
        Self {
            token,
            sources: [a, b],
        }
    }

    /// Cancel this invocation only. Neither source is touched.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether either source has fired or the link was cancelled directly.
    pub fn is_cancelled(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        if self.sources.iter().any(CancellationToken::is_cancelled) {
            self.token.cancel();
            return true;
        }
        false
    }

    pub async fn cancelled(&self) {
        let [first, second] = &self.sources;
        tokio::select! {
            _ = first.cancelled() => self.token.cancel(),
            _ = second.cancelled() => self.token.cancel(),
            _ = self.token.cancelled() => {}
        }
    }
}

/// Merge up to two cancellation sources.
///
/// - neither present: [`InvocationCancellation::None`]
/// - one present: that token, unchanged
/// - both present: a link cancelled when either source is
///
/// The result does not depend on argument order. Cancelling the link
/// never cancels a source.
pub fn compose(
    a: Option<CancellationToken>,
    b: Option<CancellationToken>,
) -> InvocationCancellation {
    match (a, b) {
        (None, None) => InvocationCancellation::None,
        (Some(token), None) | (None, Some(token)) => InvocationCancellation::Source(token),
        (Some(a), Some(b)) => InvocationCancellation::Linked(LinkedCancellation::new(a, b)),
    }
}

impl InvocationCancellation {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_linked(&self) -> bool {
        matches!(self, Self::Linked(_))
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::None => false,
            Self::Source(token) => token.is_cancelled(),
            Self::Linked(linked) => linked.is_cancelled(),
        }
    }

    /// Resolves once cancellation is requested. Pending forever for `None`.
    pub async fn cancelled(&self) {
        match self {
            Self::None => std::future::pending().await,
            Self::Source(token) => token.cancelled().await,
            Self::Linked(linked) => linked.cancelled().await,
        }
    }
}
