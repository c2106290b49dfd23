use notify_rust::{Notification, Timeout};

use crate::{NotificationError, Toast, Toaster};

/// Shows toasts as desktop notifications.
#[derive(Debug, Clone)]
pub struct DesktopToaster {
    app_name: String,
}

impl DesktopToaster {
    /// Create a toaster that labels its notifications with `app_name`.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl Toaster for DesktopToaster {
    fn show(&self, toast: &Toast) -> Result<(), NotificationError> {
        log::debug!("Desktop toast: {}", toast.message());
        let millis = u32::try_from(toast.display_length().duration().as_millis()).unwrap_or(u32::MAX);
        Notification::new()
            .appname(&self.app_name)
            .summary(&self.app_name)
            .body(toast.message())
            .timeout(Timeout::Milliseconds(millis))
            .show()
            .map(|_| ())
            .map_err(|e| NotificationError::Platform(e.to_string()))
    }
}
