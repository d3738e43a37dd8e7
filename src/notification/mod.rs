//! Hooks for observing what sessions are doing.
//!
//! A [`SessionObserver`] is invoked by the session workers around client
//! lifecycle events and around every dispatched command. The default
//! implementation, [`NopObserver`](nop::NopObserver), does nothing.

pub mod nop;

/// Receives session lifecycle and command notifications.
///
/// All methods have empty default bodies so an implementation only overrides
/// what it cares about. Implementations must be cheap and non-blocking; they
/// run inline on the session worker.
pub trait SessionObserver: Send + Sync {
    /// A client was accepted and assigned to a slot.
    fn client_connected(&self) {}

    /// A client's session ended and its slot was released.
    fn client_disconnected(&self) {}

    /// A parsed command is about to be dispatched to its handler.
    fn command_begin(&self, _verb: &str) {}

    /// The handler for a command has returned.
    fn command_end(&self, _verb: &str) {}
}
