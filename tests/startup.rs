//! End-to-end runs of the app against preset platform state.

#![cfg(feature = "full")]

use std::collections::BTreeMap;
use std::sync::Mutex;

use mobileinfo::notification::{NotificationError, Toast, Toaster};
use mobileinfo::permission::{
    Permission, PermissionBackend, PermissionError, PermissionStatus, SdkVersion,
};
use mobileinfo::report::{ReportOptions, SectionKind};
use mobileinfo::system::Degraded;
use mobileinfo::system::fixed::FixedPlatform;
use mobileinfo::{App, AppError, AppState};

/// A prompt that is torn down before the user answers.
struct DismissedPrompt;

impl PermissionBackend for DismissedPrompt {
    fn check(&self, permission: Permission) -> PermissionStatus {
        match permission {
            Permission::AccessNetworkState | Permission::AccessWifiState => {
                PermissionStatus::Granted
            }
            _ => PermissionStatus::Denied,
        }
    }

    async fn request(
        &self,
        _permissions: &[Permission],
    ) -> Result<BTreeMap<Permission, bool>, PermissionError> {
        Err(PermissionError::Dismissed)
    }
}

/// Nothing granted up front; the user accepts everything.
struct AcceptAll;

impl PermissionBackend for AcceptAll {
    fn check(&self, _permission: Permission) -> PermissionStatus {
        PermissionStatus::NotDetermined
    }

    async fn request(
        &self,
        permissions: &[Permission],
    ) -> Result<BTreeMap<Permission, bool>, PermissionError> {
        Ok(permissions.iter().map(|&p| (p, true)).collect())
    }
}

#[derive(Default)]
struct Toasts(Mutex<Vec<String>>);

impl Toaster for &Toasts {
    fn show(&self, toast: &Toast) -> Result<(), NotificationError> {
        self.0.lock().unwrap().push(toast.message().to_string());
        Ok(())
    }
}

/// Toasts that can never be shown.
struct BrokenToaster;

impl Toaster for BrokenToaster {
    fn show(&self, _toast: &Toast) -> Result<(), NotificationError> {
        Err(NotificationError::Platform("no window".into()))
    }
}

#[tokio::test]
async fn dismissed_prompt_still_produces_a_report() {
    let toasts = Toasts::default();
    let mut app = App::new(FixedPlatform::sample(), DismissedPrompt, &toasts)
        .sdk_version(SdkVersion(34));

    app.start().await.unwrap();

    let report = app.report().unwrap();
    assert!(!report.is_empty());
    assert_eq!(report.section(SectionKind::Network).unwrap().value(), "Wi-Fi");
    let text = report.to_string();
    assert!(text.contains("Telephony: IMEI: Not available\n"));
    assert!(text.contains("           Phone Number: Not available\n"));

    // Nobody answered, so nothing is announced.
    assert!(toasts.0.lock().unwrap().is_empty());
    let permissions = app.permissions().unwrap();
    assert_eq!(permissions.denied().count(), 5);
    assert!(!permissions.is_granted(Permission::ReadMediaImages));
}

#[tokio::test]
async fn accepted_prompt_matches_the_sample_layout() {
    let mut platform = FixedPlatform::sample();
    platform.airplane_mode_flag = Ok(1);
    platform.wifi_connection = Err(Degraded::unavailable("not associated"));
    let mut app = App::new(platform, AcceptAll, BrokenToaster)
        .options(ReportOptions { extended: true });

    app.start().await.unwrap();

    let report = app.report().unwrap();
    let text = report.to_string();
    assert!(text.starts_with("Network: Wi-Fi\nWi-Fi: No Wi-Fi connection\n"));
    assert!(text.contains("Airplane Mode: On\n"));
    assert!(text.contains("\nSecurity Info: IMEI: IMEI: Not available\n"));
    assert!(text.ends_with("App Version: Version Name: 1.0, Version Code: 1"));
    assert!(app.permissions().unwrap().all_granted());
}

#[tokio::test]
async fn second_start_is_rejected() {
    let mut app = App::new(FixedPlatform::sample(), AcceptAll, BrokenToaster);
    app.start().await.unwrap();
    let first = app.state().clone();

    assert_eq!(app.start().await, Err(AppError::AlreadyStarted));
    assert_eq!(app.state(), &first);
    assert!(matches!(first, AppState::Ready { .. }));
}

#[test]
fn runs_under_a_blocking_executor() {
    let mut app = App::new(FixedPlatform::sample(), AcceptAll, BrokenToaster);
    pollster::block_on(app.start()).unwrap();
    let json = serde_json::to_value(app.report().unwrap()).unwrap();
    assert_eq!(json[0]["label"], "Network");
    assert_eq!(json[9]["label"], "Security Info");
}
