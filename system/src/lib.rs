//! Device, connectivity and telephony accessors.
//!
//! Everything the device report reads goes through the [`Platform`] trait.
//! Each accessor is a one-shot read of ambient platform state that never
//! fails outright: a value the platform cannot or will not hand out comes
//! back as a [`Degraded`] reason.
//!
//! The implementation for the current target is [`sys::NativePlatform`];
//! [`fixed::FixedPlatform`] answers with preset values.

#![warn(missing_docs)]

pub mod fixed;

/// Platform-specific implementations.
pub mod sys;

use serde::Serialize;

/// Result of a single platform read.
pub type Probe<T> = Result<T, Degraded>;

/// Why a platform read produced no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Degraded {
    /// The backing capability was not granted.
    #[error("permission denied")]
    PermissionDenied,
    /// The service or value does not exist right now (no SIM, no network).
    #[error("not available: {0}")]
    Unavailable(String),
    /// The platform raised an unexpected error.
    #[error("{0}")]
    Failed(String),
}

impl Degraded {
    /// Shorthand for [`Degraded::Unavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Classify a Java exception by its `toString()`.
    ///
    /// A `SecurityException` means a runtime permission is missing.
    pub fn from_exception(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.starts_with("java.lang.SecurityException") {
            Self::PermissionDenied
        } else {
            Self::Failed(message)
        }
    }
}

/// Transport of the active network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionType {
    /// Wi-Fi.
    Wifi,
    /// Mobile data.
    Cellular,
    /// Any other transport (Ethernet, Bluetooth, VPN).
    Other,
    /// Offline.
    None,
}

/// The current Wi-Fi association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WifiConnection {
    /// Network name as reported by the platform (Android quotes it).
    pub ssid: String,
    /// Signal strength; dBm on Android, percent on NetworkManager.
    pub signal_strength: i32,
}

/// Battery charge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatteryStatus {
    /// Remaining capacity, 0-100.
    pub level: u8,
    /// Whether a charger is connected and charging.
    pub charging: bool,
}

/// Free and total bytes of the shared storage volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Bytes available.
    pub free_bytes: u64,
    /// Bytes in total.
    pub total_bytes: u64,
}

impl BatteryStatus {
    /// Build from a raw capacity reading.
    ///
    /// Readings outside `0..=100` (Android answers `Integer.MIN_VALUE` for an
    /// unsupported property) are [`Degraded::Unavailable`].
    ///
    /// # Errors
    /// Returns [`Degraded::Unavailable`] for an out-of-range capacity.
    pub fn from_capacity(capacity: i64, charging: bool) -> Probe<Self> {
        u8::try_from(capacity)
            .ok()
            .filter(|level| *level <= 100)
            .map(|level| Self { level, charging })
            .ok_or_else(|| Degraded::unavailable(format!("battery capacity {capacity}")))
    }
}

impl StorageStats {
    const MIB: u64 = 1024 * 1024;

    /// Free space in whole mebibytes.
    #[must_use]
    pub const fn free_mb(&self) -> u64 {
        self.free_bytes / Self::MIB
    }

    /// Total space in whole mebibytes.
    #[must_use]
    pub const fn total_mb(&self) -> u64 {
        self.total_bytes / Self::MIB
    }
}

/// Carrier and SIM details readable without special privileges.
///
/// Each field is read on its own; one failing read does not hide the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telephony {
    /// Registered network operator name.
    pub carrier: Probe<String>,
    /// MCC+MNC of the SIM provider.
    pub sim_operator: Probe<String>,
    /// ISO country code of the SIM provider.
    pub sim_country: Probe<String>,
    /// Radio technology constant (`TelephonyManager.NETWORK_TYPE_*`).
    pub network_type: Probe<i32>,
}

/// Default locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleInfo {
    /// ISO 639 language code.
    pub language: String,
    /// ISO 3166 country code, possibly empty.
    pub country: String,
}

/// Build-time identity of the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    /// End-user visible model name.
    pub model: String,
    /// Manufacturer of the product.
    pub manufacturer: String,
    /// Consumer-visible brand.
    pub brand: String,
    /// Industrial design name.
    pub device: String,
    /// Overall product name.
    pub product: String,
    /// User-visible OS release.
    pub os_release: String,
}

/// Version of the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppVersion {
    /// Monotonic version code.
    pub code: i64,
    /// Display version name.
    pub name: String,
}

/// Read access to the platform's device and connectivity services.
pub trait Platform {
    /// Transport of the active network.
    fn connection_type(&self) -> Probe<ConnectionType>;

    /// Current Wi-Fi association; [`Degraded::Unavailable`] when not associated.
    fn wifi_connection(&self) -> Probe<WifiConnection>;

    /// Battery charge state.
    fn battery(&self) -> Probe<BatteryStatus>;

    /// Shared storage statistics.
    fn storage(&self) -> Probe<StorageStats>;

    /// Carrier and SIM details.
    fn telephony(&self) -> Probe<Telephony>;

    /// Device IMEI.
    fn imei(&self) -> Probe<String>;

    /// Line 1 phone number.
    fn phone_number(&self) -> Probe<String>;

    /// Per-device, per-signing-key 64-bit identifier as a hex string.
    fn android_id(&self) -> Probe<String>;

    /// Default locale.
    fn locale(&self) -> Probe<LocaleInfo>;

    /// Raw `Settings.Global.AIRPLANE_MODE_ON` value.
    fn airplane_mode_flag(&self) -> Probe<i32>;

    /// Raw `Settings.Secure.LOCATION_MODE` value.
    fn location_mode(&self) -> Probe<i32>;

    /// Hardware (kernel board) name.
    fn hardware(&self) -> Probe<String>;

    /// Build-time identity of the device.
    fn device_identity(&self) -> Probe<DeviceIdentity>;

    /// OS API level.
    fn sdk_level(&self) -> Probe<u32>;

    /// Hardware serial number.
    fn serial(&self) -> Probe<String>;

    /// Version of the host application.
    fn app_version(&self) -> Probe<AppVersion>;
}
