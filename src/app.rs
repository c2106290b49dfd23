//! One run of the app: permission gate, then a single report.

use log::{info, warn};

use crate::notification::{NotificationError, Toast, Toaster};
use crate::permission::{
    GateOutcome, Permission, PermissionBackend, SdkVersion, required_capabilities, resolve,
};
use crate::report::{Aggregator, DeviceReport, ReportOptions};
use crate::system::Platform;

/// Errors returned by [`App`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// The report was already built in this run.
    #[error("the report has already been built")]
    AlreadyStarted,
}

/// Where the run is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppState {
    /// Permissions have not been resolved yet.
    #[default]
    Uninitialized,
    /// The gate ran and the report was built.
    Ready {
        /// How the gate ended.
        permissions: GateOutcome,
        /// The finished report.
        report: DeviceReport,
    },
}

/// Drives the permission gate and builds the report exactly once.
#[derive(Debug)]
pub struct App<P, B, T> {
    platform: P,
    backend: B,
    toaster: T,
    options: ReportOptions,
    sdk_version: Option<SdkVersion>,
    state: AppState,
}

impl<P, B, T> App<P, B, T>
where
    P: Platform,
    B: PermissionBackend,
    T: Toaster,
{
    /// Create an app over the given platform services.
    pub fn new(platform: P, backend: B, toaster: T) -> Self {
        Self {
            platform,
            backend,
            toaster,
            options: ReportOptions::default(),
            sdk_version: None,
            state: AppState::Uninitialized,
        }
    }

    /// Set the report options.
    #[must_use]
    pub const fn options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `version` instead of the platform's API level to pick the
    /// required capabilities.
    #[must_use]
    pub const fn sdk_version(mut self, version: SdkVersion) -> Self {
        self.sdk_version = Some(version);
        self
    }

    /// OS version the capability list is built for. Unknown levels count as
    /// zero, which requires only the base set.
    pub fn effective_sdk_version(&self) -> SdkVersion {
        self.sdk_version.unwrap_or_else(|| {
            self.platform
                .sdk_level()
                .map_or(SdkVersion(0), SdkVersion)
        })
    }

    /// Resolve permissions, then build the report.
    ///
    /// Denied capabilities are announced with one toast each and degrade the
    /// fields that need them; the report is built either way.
    ///
    /// # Errors
    /// Returns [`AppError::AlreadyStarted`] if the report already exists.
    pub async fn start(&mut self) -> Result<(), AppError> {
        if matches!(self.state, AppState::Ready { .. }) {
            return Err(AppError::AlreadyStarted);
        }

        let sdk = self.effective_sdk_version();
        let required = required_capabilities(sdk);
        info!("Checking {} capabilities for SDK {sdk}", required.len());

        let toaster = &self.toaster;
        let sink = |permission: Permission| {
            if let Err(e) = announce_denial(toaster, permission) {
                warn!("Could not announce denied {permission}: {e}");
            }
        };
        let permissions = resolve(&self.backend, &sink, &required).await;

        let report = Aggregator::new(&self.platform, &permissions)
            .options(self.options)
            .build();
        info!("Report ready with {} sections", report.sections().len());

        self.state = AppState::Ready {
            permissions,
            report,
        };
        Ok(())
    }

    /// Current state.
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// The report, once built.
    pub const fn report(&self) -> Option<&DeviceReport> {
        match &self.state {
            AppState::Ready { report, .. } => Some(report),
            AppState::Uninitialized => None,
        }
    }

    /// The gate outcome, once resolved.
    pub const fn permissions(&self) -> Option<&GateOutcome> {
        match &self.state {
            AppState::Ready { permissions, .. } => Some(permissions),
            AppState::Uninitialized => None,
        }
    }

    /// The platform the report is read from.
    pub const fn platform(&self) -> &P {
        &self.platform
    }
}

fn announce_denial<T: Toaster>(toaster: &T, permission: Permission) -> Result<(), NotificationError> {
    toaster.show(&Toast::new(format!("Permission denied: {permission}")))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use crate::permission::{PermissionError, PermissionStatus};
    use crate::report::SectionKind;
    use crate::system::Degraded;
    use crate::system::fixed::FixedPlatform;

    use super::*;

    /// Reports every capability as missing and answers the prompt from a table.
    struct PromptingBackend {
        refuse: Vec<Permission>,
        prompts: RefCell<Vec<Vec<Permission>>>,
    }

    impl PromptingBackend {
        fn refusing(refuse: &[Permission]) -> Self {
            Self {
                refuse: refuse.to_vec(),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl PermissionBackend for PromptingBackend {
        fn check(&self, _permission: Permission) -> PermissionStatus {
            PermissionStatus::NotDetermined
        }

        async fn request(
            &self,
            permissions: &[Permission],
        ) -> Result<BTreeMap<Permission, bool>, PermissionError> {
            self.prompts.borrow_mut().push(permissions.to_vec());
            Ok(permissions
                .iter()
                .map(|p| (*p, !self.refuse.contains(p)))
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingToaster {
        shown: RefCell<Vec<String>>,
    }

    impl Toaster for RecordingToaster {
        fn show(&self, toast: &Toast) -> Result<(), NotificationError> {
            self.shown.borrow_mut().push(toast.message().to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn builds_once_after_the_gate() {
        let mut app = App::new(
            FixedPlatform::sample(),
            PromptingBackend::refusing(&[]),
            RecordingToaster::default(),
        );
        assert_eq!(app.state(), &AppState::Uninitialized);
        assert!(app.report().is_none());

        app.start().await.unwrap();

        assert!(app.permissions().unwrap().all_granted());
        assert_eq!(app.report().unwrap().sections().len(), SectionKind::STANDARD.len());
        let reads = app.platform().reads().len();

        assert_eq!(app.start().await, Err(AppError::AlreadyStarted));
        assert_eq!(app.platform().reads().len(), reads);
        assert_eq!(app.backend.prompts.borrow().len(), 1);
    }

    #[tokio::test]
    async fn denials_toast_and_degrade() {
        let mut platform = FixedPlatform::sample();
        platform.imei = Ok("356938035643809".into());
        let mut app = App::new(
            platform,
            PromptingBackend::refusing(&[Permission::ReadPhoneState]),
            RecordingToaster::default(),
        );

        app.start().await.unwrap();

        assert_eq!(
            *app.toaster.shown.borrow(),
            vec!["Permission denied: android.permission.READ_PHONE_STATE".to_string()]
        );
        let report = app.report().unwrap();
        assert!(!report.is_empty());
        assert_eq!(
            report.section(SectionKind::Telephony).unwrap().lines()[0],
            "IMEI: Not available"
        );
        assert!(!app.permissions().unwrap().all_granted());
    }

    #[tokio::test]
    async fn media_capabilities_follow_the_platform_level() {
        let mut older = FixedPlatform::sample();
        older.sdk_level = Ok(30);
        let mut app = App::new(older, PromptingBackend::refusing(&[]), RecordingToaster::default());
        app.start().await.unwrap();
        assert!(!app.backend.prompts.borrow()[0].contains(&Permission::ReadMediaImages));

        let mut unknown = FixedPlatform::sample();
        unknown.sdk_level = Err(Degraded::unavailable("no API level"));
        let mut app = App::new(unknown, PromptingBackend::refusing(&[]), RecordingToaster::default())
            .sdk_version(SdkVersion::TIRAMISU);
        assert_eq!(app.effective_sdk_version(), SdkVersion::TIRAMISU);
        app.start().await.unwrap();
        assert!(app.backend.prompts.borrow()[0].contains(&Permission::ReadMediaVideo));
    }

    #[tokio::test]
    async fn extended_option_reaches_the_report() {
        let mut app = App::new(
            FixedPlatform::sample(),
            PromptingBackend::refusing(&[]),
            RecordingToaster::default(),
        )
        .options(ReportOptions { extended: true });

        app.start().await.unwrap();

        assert!(app.report().unwrap().section(SectionKind::AppVersion).is_some());
    }
}
