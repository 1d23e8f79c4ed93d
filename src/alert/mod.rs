//! Contracts shared with the alerting engine
//!
//! The engine delivers [`Event`]s to [`Handler`]s and collects failures
//! through a [`Diagnostic`].

pub mod diagnostic;
pub mod event;

pub use diagnostic::Diagnostic;
pub use event::{Event, EventState, Level};

use async_trait::async_trait;

/// Receives alert events from the engine
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one event. Failures are reported, never returned.
    async fn handle(&self, event: &Event);
}
