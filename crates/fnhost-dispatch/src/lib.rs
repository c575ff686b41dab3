//! fnhost-dispatch — invocation admission for out-of-process workers.
//!
//! Holds the dispatcher readiness state, gates every invocation on it,
//! and escalates to a host stop when workers never become ready.
//!
//! # Admission
//!
//! ```text
//! state == Initialized              → admit immediately
//! state in {Disposing, Disposed}    → withhold (host is stopping)
//! otherwise                         → wait for Initialized or timeout
//!     Initialized first             → admit
//!     timeout first                 → stop_application(), withhold
//! ```
//!
//! Admitted invocations carry the OR of their framework and request
//! cancellation tokens.

pub mod admission;
pub mod cancellation;
pub mod error;
pub mod lifetime;
pub mod state;

pub use admission::{Admission, AdmissionGate, AdmittedInvocation, InvocationRequest};
pub use cancellation::{compose, InvocationCancellation, LinkedCancellation};
pub use error::{DispatchError, DispatchResult};
pub use lifetime::{ApplicationLifetime, HostLifetime};
pub use state::{state_cell, DispatcherState, DispatcherStateReader, DispatcherStateWriter};
