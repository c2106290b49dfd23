//! Runtime permission gate.
//!
//! This crate decides which capabilities the device report needs on a given
//! OS version, asks the platform which of them are still missing, requests
//! those in a single batched prompt and folds the answers into one outcome.
//!
//! Platform access goes through [`PermissionBackend`]; the native backend for
//! the current target lives in [`sys`].

#![warn(missing_docs)]

mod gate;

/// Platform-specific implementations.
pub mod sys;

pub use gate::{
    DenialSink, GateOutcome, PermissionBackend, all_granted, missing, request, required_capabilities,
    resolve,
};

use std::fmt;

/// Capabilities the device report may need.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[non_exhaustive]
pub enum Permission {
    /// Precise location.
    AccessFineLocation,
    /// Approximate location.
    AccessCoarseLocation,
    /// Read the active network and its transports.
    AccessNetworkState,
    /// Read the current Wi-Fi connection.
    AccessWifiState,
    /// Read telephony state (IMEI, line number, serial).
    ReadPhoneState,
    /// Read images from shared storage (Android 13+).
    ReadMediaImages,
    /// Read videos from shared storage (Android 13+).
    ReadMediaVideo,
}

impl Permission {
    /// All capabilities, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::AccessFineLocation,
        Self::AccessCoarseLocation,
        Self::AccessNetworkState,
        Self::AccessWifiState,
        Self::ReadPhoneState,
        Self::ReadMediaImages,
        Self::ReadMediaVideo,
    ];

    /// The Android manifest name of this permission.
    #[must_use]
    pub const fn manifest_name(self) -> &'static str {
        match self {
            Self::AccessFineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Self::AccessCoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
            Self::AccessNetworkState => "android.permission.ACCESS_NETWORK_STATE",
            Self::AccessWifiState => "android.permission.ACCESS_WIFI_STATE",
            Self::ReadPhoneState => "android.permission.READ_PHONE_STATE",
            Self::ReadMediaImages => "android.permission.READ_MEDIA_IMAGES",
            Self::ReadMediaVideo => "android.permission.READ_MEDIA_VIDEO",
        }
    }

    /// Look a permission up by its Android manifest name.
    #[must_use]
    pub fn from_manifest_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.manifest_name() == name)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_name())
    }
}

/// The current status of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PermissionStatus {
    /// Permission has been granted by the user.
    Granted,
    /// Permission has been denied by the user.
    Denied,
    /// The platform could not tell.
    NotDetermined,
}

impl PermissionStatus {
    /// Whether the status allows use of the capability.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl From<bool> for PermissionStatus {
    fn from(granted: bool) -> Self {
        if granted { Self::Granted } else { Self::Denied }
    }
}

/// Android API level (`Build.VERSION.SDK_INT`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SdkVersion(pub u32);

impl SdkVersion {
    /// Android 13, the first level with granular media permissions.
    pub const TIRAMISU: Self = Self(33);
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when requesting permissions.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PermissionError {
    /// The backend has not been bound to a host context yet.
    #[error("permission backend not initialized")]
    NotInitialized,
    /// A prompt is already waiting for the user.
    #[error("a permission request is already in flight")]
    RequestInFlight,
    /// The prompt was torn down before the user answered.
    #[error("permission prompt dismissed without a result")]
    Dismissed,
    /// An error reported by the platform.
    #[error("platform error: {0}")]
    Platform(String),
}
