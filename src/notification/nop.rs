//! An observer that is not interested.

use super::SessionObserver;

/// The default [`SessionObserver`]: ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NopObserver;

impl SessionObserver for NopObserver {}
