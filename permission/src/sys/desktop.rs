//! Desktop permission implementation.
//!
//! Desktop systems have no runtime consent prompt for any of the report's
//! capabilities: access is decided by file permissions and user groups, so
//! every capability is reported granted.

use std::collections::BTreeMap;

use crate::{Permission, PermissionBackend, PermissionError, PermissionStatus};

/// Backend for platforms without runtime permission prompts.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopBackend;

impl DesktopBackend {
    /// Create the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PermissionBackend for DesktopBackend {
    fn check(&self, _permission: Permission) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request(
        &self,
        permissions: &[Permission],
    ) -> Result<BTreeMap<Permission, bool>, PermissionError> {
        Ok(permissions.iter().map(|&p| (p, true)).collect())
    }
}
