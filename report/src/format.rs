//! Text for each section, from accessor results.
//!
//! Every function here is total: a degraded probe turns into a placeholder,
//! never an error.

use mobileinfo_system::{
    AppVersion, BatteryStatus, ConnectionType, Degraded, DeviceIdentity, LocaleInfo, Probe,
    StorageStats, Telephony, WifiConnection,
};

/// Placeholder for a value whose capability was denied or that does not exist.
pub const NOT_AVAILABLE: &str = "Not available";
/// Placeholder for a missing active network.
pub const NO_NETWORK: &str = "No Network";
/// Placeholder for a missing Wi-Fi association.
pub const NO_WIFI: &str = "No Wi-Fi connection";
/// Version name shown when the package cannot be read.
pub const UNKNOWN_VERSION_NAME: &str = "0.0.0";

/// `Settings.Secure.LOCATION_MODE_OFF`.
const LOCATION_MODE_OFF: i32 = 0;

/// Placeholder text for a degraded value.
///
/// `unavailable` is the field-specific wording for a missing service.
#[must_use]
pub fn placeholder(reason: &Degraded, unavailable: &str) -> String {
    match reason {
        Degraded::PermissionDenied => NOT_AVAILABLE.to_string(),
        Degraded::Unavailable(_) => unavailable.to_string(),
        Degraded::Failed(message) => format!("Error: {message}"),
    }
}

/// `value` itself, or [`NOT_AVAILABLE`]-style placeholder.
#[must_use]
pub fn text_or_placeholder(value: &Probe<String>) -> String {
    match value {
        Ok(text) => text.clone(),
        Err(reason) => placeholder(reason, NOT_AVAILABLE),
    }
}

/// `Wi-Fi`, `Mobile Data` or `No Network`.
#[must_use]
pub fn network(value: &Probe<ConnectionType>) -> String {
    match value {
        Ok(ConnectionType::Wifi) => "Wi-Fi".to_string(),
        Ok(ConnectionType::Cellular) => "Mobile Data".to_string(),
        // Only Wi-Fi and cellular are told apart.
        Ok(ConnectionType::Other | ConnectionType::None) => NO_NETWORK.to_string(),
        Err(reason) => placeholder(reason, NO_NETWORK),
    }
}

/// `SSID: <ssid>, Signal Strength: <rssi>` or `No Wi-Fi connection`.
#[must_use]
pub fn wifi(value: &Probe<WifiConnection>) -> String {
    match value {
        Ok(connection) => format!(
            "SSID: {}, Signal Strength: {}",
            connection.ssid, connection.signal_strength
        ),
        Err(reason) => placeholder(reason, NO_WIFI),
    }
}

/// `Battery Level: <n>%, Charging: <Yes|No>`.
#[must_use]
pub fn battery(value: &Probe<BatteryStatus>) -> String {
    match value {
        Ok(status) => format!(
            "Battery Level: {}%, Charging: {}",
            status.level,
            yes_no(status.charging)
        ),
        Err(reason) => placeholder(reason, NOT_AVAILABLE),
    }
}

/// `Free Storage: <MB>MB, Total Storage: <MB>MB`.
#[must_use]
pub fn storage(value: &Probe<StorageStats>) -> String {
    match value {
        Ok(stats) => format!(
            "Free Storage: {}MB, Total Storage: {}MB",
            stats.free_mb(),
            stats.total_mb()
        ),
        Err(reason) => placeholder(reason, NOT_AVAILABLE),
    }
}

/// The six telephony lines, IMEI first.
#[must_use]
pub fn telephony(
    imei: &Probe<String>,
    phone_number: &Probe<String>,
    details: &Probe<Telephony>,
) -> Vec<String> {
    let (carrier, sim_operator, sim_country, network_type) = match details {
        Ok(t) => (
            text_or_placeholder(&t.carrier),
            text_or_placeholder(&t.sim_operator),
            text_or_placeholder(&t.sim_country),
            match &t.network_type {
                Ok(kind) => kind.to_string(),
                Err(reason) => placeholder(reason, NOT_AVAILABLE),
            },
        ),
        Err(reason) => {
            let text = placeholder(reason, NOT_AVAILABLE);
            (text.clone(), text.clone(), text.clone(), text)
        }
    };

    vec![
        format!("IMEI: {}", text_or_placeholder(imei)),
        format!("Phone Number: {}", text_or_placeholder(phone_number)),
        format!("Carrier: {carrier}"),
        format!("SIM Operator: {sim_operator}"),
        format!("SIM Country: {sim_country}"),
        format!("Network Type: {network_type}"),
    ]
}

/// `Language: <code>, Country: <code>`.
#[must_use]
pub fn locale(value: &Probe<LocaleInfo>) -> String {
    match value {
        Ok(locale) => format!(
            "Language: {}, Country: {}",
            locale.language, locale.country
        ),
        Err(reason) => placeholder(reason, NOT_AVAILABLE),
    }
}

/// `On` for any non-zero flag. An unreadable flag reads as `0`.
#[must_use]
pub fn airplane_mode(flag: &Probe<i32>) -> &'static str {
    if flag.as_ref().copied().unwrap_or(0) != 0 {
        "On"
    } else {
        "Off"
    }
}

/// `Enabled` unless the mode is `LOCATION_MODE_OFF`. An unreadable mode reads
/// as off.
#[must_use]
pub fn gps(mode: &Probe<i32>) -> &'static str {
    if mode.as_ref().copied().unwrap_or(LOCATION_MODE_OFF) == LOCATION_MODE_OFF {
        "Disabled"
    } else {
        "Enabled"
    }
}

/// Security lines: the whole telephony block behind `IMEI:`, then the
/// Android ID and hardware name.
#[must_use]
pub fn security(telephony: &[String], android_id: &str, hardware: &Probe<String>) -> Vec<String> {
    let mut lines = Vec::with_capacity(telephony.len() + 2);
    let mut block = telephony.iter();
    lines.push(format!(
        "IMEI: {}",
        block.next().map_or(NOT_AVAILABLE, String::as_str)
    ));
    lines.extend(block.cloned());
    lines.push(format!("Android ID: {android_id}"));
    lines.push(format!("Hardware: {}", text_or_placeholder(hardware)));
    lines
}

/// Upper-case the first character.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Display name for the device: the model alone when it already names the
/// manufacturer, otherwise `Manufacturer Model`.
#[must_use]
pub fn device_brand(manufacturer: &str, model: &str) -> String {
    if model.starts_with(manufacturer) {
        capitalize(model)
    } else {
        format!("{} {}", capitalize(manufacturer), capitalize(model))
    }
}

/// Lines of the extended `Device` section.
#[must_use]
pub fn device(
    identity: &Probe<DeviceIdentity>,
    sdk_level: &Probe<u32>,
    hardware: &Probe<String>,
    serial: &Probe<String>,
) -> Vec<String> {
    let sdk = match sdk_level {
        Ok(level) => level.to_string(),
        Err(reason) => placeholder(reason, NOT_AVAILABLE),
    };
    let mut lines = match identity {
        Ok(id) => vec![
            format!("Device Brand: {}", device_brand(&id.manufacturer, &id.model)),
            format!("Device Model: {}", id.model),
            format!("Manufacturer: {}", id.manufacturer),
            format!("Brand: {}", id.brand),
            format!("Device Name: {}", id.device),
            format!("Product: {}", id.product),
            format!("Android Version: {}", id.os_release),
        ],
        Err(reason) => vec![format!("Device Brand: {}", placeholder(reason, NOT_AVAILABLE))],
    };
    lines.push(format!("SDK Version: {sdk}"));
    lines.push(format!("Hardware: {}", text_or_placeholder(hardware)));
    lines.push(format!("Serial: {}", text_or_placeholder(serial)));
    lines
}

/// `Version Name: <name>, Version Code: <code>`, falling back to `0.0.0` and `0`.
#[must_use]
pub fn app_version(value: &Probe<AppVersion>) -> String {
    let (name, code) = value
        .as_ref()
        .map_or((UNKNOWN_VERSION_NAME, 0), |v| (v.name.as_str(), v.code));
    format!("Version Name: {name}, Version Code: {code}")
}

const fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}
