//! A [`Platform`] that returns preset values.
//!
//! Used for previews and for exercising the report without a device. Every
//! field is public so a caller can swap in any [`Probe`] outcome.

use std::cell::RefCell;

use crate::{
    AppVersion, BatteryStatus, ConnectionType, Degraded, DeviceIdentity, LocaleInfo, Platform,
    Probe, StorageStats, Telephony, WifiConnection,
};

/// Preset answers for every accessor.
#[derive(Debug, Clone)]
pub struct FixedPlatform {
    /// Answer for [`Platform::connection_type`].
    pub connection_type: Probe<ConnectionType>,
    /// Answer for [`Platform::wifi_connection`].
    pub wifi_connection: Probe<WifiConnection>,
    /// Answer for [`Platform::battery`].
    pub battery: Probe<BatteryStatus>,
    /// Answer for [`Platform::storage`].
    pub storage: Probe<StorageStats>,
    /// Answer for [`Platform::telephony`].
    pub telephony: Probe<Telephony>,
    /// Answer for [`Platform::imei`].
    pub imei: Probe<String>,
    /// Answer for [`Platform::phone_number`].
    pub phone_number: Probe<String>,
    /// Answer for [`Platform::android_id`].
    pub android_id: Probe<String>,
    /// Answer for [`Platform::locale`].
    pub locale: Probe<LocaleInfo>,
    /// Answer for [`Platform::airplane_mode_flag`].
    pub airplane_mode_flag: Probe<i32>,
    /// Answer for [`Platform::location_mode`].
    pub location_mode: Probe<i32>,
    /// Answer for [`Platform::hardware`].
    pub hardware: Probe<String>,
    /// Answer for [`Platform::device_identity`].
    pub device_identity: Probe<DeviceIdentity>,
    /// Answer for [`Platform::sdk_level`].
    pub sdk_level: Probe<u32>,
    /// Answer for [`Platform::serial`].
    pub serial: Probe<String>,
    /// Answer for [`Platform::app_version`].
    pub app_version: Probe<AppVersion>,
    reads: RefCell<Vec<&'static str>>,
}

impl FixedPlatform {
    /// A connected Android 14 phone on Wi-Fi.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            connection_type: Ok(ConnectionType::Wifi),
            wifi_connection: Ok(WifiConnection {
                ssid: "\"HomeNetwork\"".into(),
                signal_strength: -58,
            }),
            battery: Ok(BatteryStatus {
                level: 76,
                charging: false,
            }),
            storage: Ok(StorageStats {
                free_bytes: 48_213 * 1024 * 1024,
                total_bytes: 119_132 * 1024 * 1024,
            }),
            telephony: Ok(Telephony {
                carrier: Ok("Irancell".into()),
                sim_operator: Ok("43235".into()),
                sim_country: Ok("ir".into()),
                network_type: Ok(13),
            }),
            imei: Err(Degraded::unavailable("IMEI is restricted")),
            phone_number: Err(Degraded::unavailable("line number is restricted")),
            android_id: Ok("9774d56d682e549c".into()),
            locale: Ok(LocaleInfo {
                language: "fa".into(),
                country: "IR".into(),
            }),
            airplane_mode_flag: Ok(0),
            location_mode: Ok(3),
            hardware: Ok("tensor".into()),
            device_identity: Ok(DeviceIdentity {
                model: "Pixel 8".into(),
                manufacturer: "Google".into(),
                brand: "google".into(),
                device: "shiba".into(),
                product: "shiba".into(),
                os_release: "14".into(),
            }),
            sdk_level: Ok(34),
            serial: Err(Degraded::Failed(
                "java.lang.SecurityException: getSerial: The user 10234 does not meet the requirements to access device identifiers.".into(),
            )),
            app_version: Ok(AppVersion {
                code: 1,
                name: "1.0".into(),
            }),
            reads: RefCell::new(Vec::new()),
        }
    }

    /// Names of the accessors called so far, in call order.
    #[must_use]
    pub fn reads(&self) -> Vec<&'static str> {
        self.reads.borrow().clone()
    }

    fn read<T: Clone>(&self, name: &'static str, value: &Probe<T>) -> Probe<T> {
        self.reads.borrow_mut().push(name);
        value.clone()
    }
}

impl Default for FixedPlatform {
    fn default() -> Self {
        Self::sample()
    }
}

impl Platform for FixedPlatform {
    fn connection_type(&self) -> Probe<ConnectionType> {
        self.read("connection_type", &self.connection_type)
    }

    fn wifi_connection(&self) -> Probe<WifiConnection> {
        self.read("wifi_connection", &self.wifi_connection)
    }

    fn battery(&self) -> Probe<BatteryStatus> {
        self.read("battery", &self.battery)
    }

    fn storage(&self) -> Probe<StorageStats> {
        self.read("storage", &self.storage)
    }

    fn telephony(&self) -> Probe<Telephony> {
        self.read("telephony", &self.telephony)
    }

    fn imei(&self) -> Probe<String> {
        self.read("imei", &self.imei)
    }

    fn phone_number(&self) -> Probe<String> {
        self.read("phone_number", &self.phone_number)
    }

    fn android_id(&self) -> Probe<String> {
        self.read("android_id", &self.android_id)
    }

    fn locale(&self) -> Probe<LocaleInfo> {
        self.read("locale", &self.locale)
    }

    fn airplane_mode_flag(&self) -> Probe<i32> {
        self.read("airplane_mode_flag", &self.airplane_mode_flag)
    }

    fn location_mode(&self) -> Probe<i32> {
        self.read("location_mode", &self.location_mode)
    }

    fn hardware(&self) -> Probe<String> {
        self.read("hardware", &self.hardware)
    }

    fn device_identity(&self) -> Probe<DeviceIdentity> {
        self.read("device_identity", &self.device_identity)
    }

    fn sdk_level(&self) -> Probe<u32> {
        self.read("sdk_level", &self.sdk_level)
    }

    fn serial(&self) -> Probe<String> {
        self.read("serial", &self.serial)
    }

    fn app_version(&self) -> Probe<AppVersion> {
        self.read("app_version", &self.app_version)
    }
}
