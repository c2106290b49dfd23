//! NetworkManager (D-Bus) and sysfs readers.

use std::fs;
use std::path::Path;

use zbus::blocking::Connection;
use zbus::blocking::fdo::PropertiesProxy;
use zbus::names::InterfaceName;
use zbus::proxy::CacheProperties;
use zbus::zvariant::{OwnedObjectPath, OwnedValue};

use crate::{BatteryStatus, ConnectionType, Degraded, Probe, WifiConnection};

const NM: &str = "org.freedesktop.NetworkManager";
const NM_PATH: &str = "/org/freedesktop/NetworkManager";
const NM_ACTIVE: &str = "org.freedesktop.NetworkManager.Connection.Active";
const NM_ACCESS_POINT: &str = "org.freedesktop.NetworkManager.AccessPoint";

pub(super) const POWER_SUPPLY: &str = "/sys/class/power_supply";
const DMI: &str = "/sys/class/dmi/id";

/// Blocking client for the NetworkManager root object.
#[derive(Debug)]
pub(super) struct NetworkManager {
    connection: Connection,
}

impl NetworkManager {
    pub(super) fn connect() -> zbus::Result<Self> {
        let nm = Self {
            connection: Connection::system()?,
        };
        // Fail early when the service is not running.
        nm.property(NM_PATH, NM, "Version")?;
        Ok(nm)
    }

    fn property(&self, path: &str, interface: &str, name: &str) -> zbus::Result<OwnedValue> {
        let proxy = PropertiesProxy::builder(&self.connection)
            .destination(NM)?
            .path(path)?
            .cache_properties(CacheProperties::No)
            .build()?;
        Ok(proxy.get(InterfaceName::try_from(interface)?, name)?)
    }

    pub(super) fn primary_connection_type(&self) -> zbus::Result<String> {
        Ok(String::try_from(self.property(
            NM_PATH,
            NM,
            "PrimaryConnectionType",
        )?)?)
    }

    /// `(WirelessEnabled, WwanEnabled)`.
    pub(super) fn radios_enabled(&self) -> zbus::Result<(bool, bool)> {
        let wireless = bool::try_from(self.property(NM_PATH, NM, "WirelessEnabled")?)?;
        let wwan = bool::try_from(self.property(NM_PATH, NM, "WwanEnabled")?)?;
        Ok((wireless, wwan))
    }

    /// The access point behind the primary connection, if it is Wi-Fi.
    pub(super) fn active_access_point(&self) -> zbus::Result<Option<WifiConnection>> {
        let primary = OwnedObjectPath::try_from(self.property(NM_PATH, NM, "PrimaryConnection")?)?;
        if primary.as_str() == "/" {
            return Ok(None);
        }

        let kind = String::try_from(self.property(primary.as_str(), NM_ACTIVE, "Type")?)?;
        if kind != "802-11-wireless" {
            return Ok(None);
        }

        let access_point =
            OwnedObjectPath::try_from(self.property(primary.as_str(), NM_ACTIVE, "SpecificObject")?)?;
        if access_point.as_str() == "/" {
            return Ok(None);
        }

        let ssid = Vec::<u8>::try_from(self.property(access_point.as_str(), NM_ACCESS_POINT, "Ssid")?)?;
        let strength = u8::try_from(self.property(access_point.as_str(), NM_ACCESS_POINT, "Strength")?)?;

        Ok(Some(WifiConnection {
            ssid: String::from_utf8_lossy(&ssid).into_owned(),
            signal_strength: i32::from(strength),
        }))
    }
}

pub(super) fn connection_type_from_nm(kind: &str) -> ConnectionType {
    match kind {
        "802-11-wireless" => ConnectionType::Wifi,
        "gsm" | "cdma" => ConnectionType::Cellular,
        "" => ConnectionType::None,
        _ => ConnectionType::Other,
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First `type == Battery` supply under `root`.
pub(super) fn battery_status(root: &Path) -> Probe<BatteryStatus> {
    let entries = fs::read_dir(root).map_err(|e| Degraded::unavailable(format!("{}: {e}", root.display())))?;

    let mut supplies: Vec<_> = entries.filter_map(Result::ok).map(|e| e.path()).collect();
    supplies.sort();

    let supply = supplies
        .into_iter()
        .find(|p| read_trimmed(&p.join("type")).as_deref() == Some("Battery"))
        .ok_or_else(|| Degraded::unavailable("no battery"))?;

    let capacity = read_trimmed(&supply.join("capacity"))
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| Degraded::Failed(format!("unreadable capacity in {}", supply.display())))?;
    let status = read_trimmed(&supply.join("status")).unwrap_or_default();

    BatteryStatus::from_capacity(capacity, status == "Charging" || status == "Full")
}

pub(super) fn dmi(field: &str) -> Option<String> {
    read_trimmed(&Path::new(DMI).join(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply(root: &Path, name: &str, files: &[(&str, &str)]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for (file, content) in files {
            fs::write(dir.join(file), format!("{content}\n")).unwrap();
        }
    }

    #[test]
    fn finds_battery_among_supplies() {
        let root = tempfile::tempdir().unwrap();
        supply(root.path(), "AC", &[("type", "Mains"), ("online", "1")]);
        supply(
            root.path(),
            "BAT0",
            &[("type", "Battery"), ("capacity", "87"), ("status", "Charging")],
        );

        let status = battery_status(root.path()).unwrap();
        assert_eq!(status, BatteryStatus { level: 87, charging: true });
    }

    #[test]
    fn discharging_battery_is_not_charging() {
        let root = tempfile::tempdir().unwrap();
        supply(
            root.path(),
            "BAT1",
            &[("type", "Battery"), ("capacity", "12"), ("status", "Discharging")],
        );

        let status = battery_status(root.path()).unwrap();
        assert!(!status.charging);
        assert_eq!(status.level, 12);
    }

    #[test]
    fn no_battery_degrades() {
        let root = tempfile::tempdir().unwrap();
        supply(root.path(), "AC", &[("type", "Mains")]);
        assert!(matches!(battery_status(root.path()), Err(Degraded::Unavailable(_))));
    }

    #[test]
    fn nm_connection_types() {
        assert_eq!(connection_type_from_nm("802-11-wireless"), ConnectionType::Wifi);
        assert_eq!(connection_type_from_nm("gsm"), ConnectionType::Cellular);
        assert_eq!(connection_type_from_nm("802-3-ethernet"), ConnectionType::Other);
        assert_eq!(connection_type_from_nm(""), ConnectionType::None);
    }
}
