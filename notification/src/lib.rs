//! Transient toast notifications.
//!
//! A [`Toast`] is a short message shown for a couple of seconds without user
//! interaction. On Android it goes through the host Activity; elsewhere it is
//! a desktop notification with a matching timeout.

#![warn(missing_docs)]

/// Platform-specific implementations.
pub mod sys;

use std::time::Duration;

/// How long a toast stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastLength {
    /// `Toast.LENGTH_SHORT`, two seconds.
    #[default]
    Short,
    /// `Toast.LENGTH_LONG`, three and a half seconds.
    Long,
}

impl ToastLength {
    /// On-screen duration.
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::Short => Duration::from_millis(2000),
            Self::Long => Duration::from_millis(3500),
        }
    }
}

/// A transient message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    message: String,
    length: ToastLength,
}

impl Toast {
    /// Create a short toast.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            length: ToastLength::Short,
        }
    }

    /// Set how long the toast stays visible.
    #[must_use]
    pub const fn length(mut self, length: ToastLength) -> Self {
        self.length = length;
        self
    }

    /// The message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The display length.
    #[must_use]
    pub const fn display_length(&self) -> ToastLength {
        self.length
    }
}

/// Errors that can occur when showing a toast.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    /// The platform refused or failed to show the toast.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Something that can put a [`Toast`] on screen.
pub trait Toaster {
    /// Show `toast` and return without waiting for it to disappear.
    ///
    /// # Errors
    /// Returns a [`NotificationError`] if the platform call fails.
    fn show(&self, toast: &Toast) -> Result<(), NotificationError>;
}
