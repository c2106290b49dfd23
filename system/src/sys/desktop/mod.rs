//! Desktop implementation.
//!
//! Storage and host identity come from `sysinfo`, the interface type from
//! `netdev`. On Linux, Wi-Fi, radio state and battery come from
//! NetworkManager and sysfs. Telephony and Android-only settings do not
//! exist here and always degrade.

#[cfg(target_os = "linux")]
mod linux;

use std::path::Path;

use log::debug;
use sysinfo::{Disks, System};

use crate::{
    AppVersion, BatteryStatus, ConnectionType, Degraded, DeviceIdentity, LocaleInfo, Platform,
    Probe, StorageStats, Telephony, WifiConnection,
};

/// Platform accessors for desktop hosts.
#[derive(Debug, Default)]
pub struct DesktopPlatform {
    #[cfg(target_os = "linux")]
    network_manager: Option<linux::NetworkManager>,
}

impl DesktopPlatform {
    /// Create the accessors, connecting to the system bus where available.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "linux")]
            network_manager: linux::NetworkManager::connect()
                .inspect_err(|e| debug!("NetworkManager unavailable: {e}"))
                .ok(),
        }
    }

    fn interface_connection_type() -> Probe<ConnectionType> {
        use netdev::interface::types::InterfaceType;

        let Ok(interface) = netdev::get_default_interface() else {
            return Ok(ConnectionType::None);
        };
        debug!("Default interface: {}", interface.name);

        Ok(match interface.if_type {
            InterfaceType::Wireless80211 => ConnectionType::Wifi,
            InterfaceType::Wwanpp | InterfaceType::Wwanpp2 => ConnectionType::Cellular,
            _ => ConnectionType::Other,
        })
    }
}

fn no_telephony<T>() -> Probe<T> {
    Err(Degraded::unavailable("no telephony service"))
}

fn not_on_desktop<T>(what: &str) -> Probe<T> {
    Err(Degraded::unavailable(format!("{what} is Android-only")))
}

/// Wi-Fi answer when only the interface type is known.
fn wifi_without_details(connection: ConnectionType) -> Probe<WifiConnection> {
    match connection {
        ConnectionType::Wifi => Err(Degraded::Failed("Wi-Fi details not exposed".into())),
        _ => Err(Degraded::unavailable("no Wi-Fi connection")),
    }
}

/// Parse a POSIX locale name such as `fa_IR.UTF-8` or `en_US@euro`.
fn parse_posix_locale(value: &str) -> Option<LocaleInfo> {
    let name = value.split(['.', '@']).next()?;
    if name.is_empty() || name == "C" || name == "POSIX" {
        return None;
    }
    let (language, country) = name.split_once('_').unwrap_or((name, ""));
    Some(LocaleInfo {
        language: language.to_lowercase(),
        country: country.to_uppercase(),
    })
}

impl Platform for DesktopPlatform {
    fn connection_type(&self) -> Probe<ConnectionType> {
        #[cfg(target_os = "linux")]
        if let Some(nm) = &self.network_manager {
            match nm.primary_connection_type() {
                Ok(kind) => return Ok(linux::connection_type_from_nm(&kind)),
                Err(e) => debug!("PrimaryConnectionType: {e}"),
            }
        }
        Self::interface_connection_type()
    }

    fn wifi_connection(&self) -> Probe<WifiConnection> {
        #[cfg(target_os = "linux")]
        if let Some(nm) = &self.network_manager {
            return match nm.active_access_point() {
                Ok(Some(connection)) => Ok(connection),
                Ok(None) => Err(Degraded::unavailable("no Wi-Fi connection")),
                Err(e) => Err(Degraded::Failed(e.to_string())),
            };
        }
        wifi_without_details(Self::interface_connection_type()?)
    }

    fn battery(&self) -> Probe<BatteryStatus> {
        #[cfg(target_os = "linux")]
        {
            linux::battery_status(Path::new(linux::POWER_SUPPLY))
        }
        #[cfg(not(target_os = "linux"))]
        {
            Err(Degraded::unavailable("battery"))
        }
    }

    fn storage(&self) -> Probe<StorageStats> {
        let disks = Disks::new_with_refreshed_list();
        let root = if cfg!(windows) { Path::new("C:\\") } else { Path::new("/") };
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == root)
            .or_else(|| disks.list().iter().max_by_key(|d| d.total_space()))
            .ok_or_else(|| Degraded::unavailable("no mounted disks"))?;

        Ok(StorageStats {
            free_bytes: disk.available_space(),
            total_bytes: disk.total_space(),
        })
    }

    fn telephony(&self) -> Probe<Telephony> {
        no_telephony()
    }

    fn imei(&self) -> Probe<String> {
        no_telephony()
    }

    fn phone_number(&self) -> Probe<String> {
        no_telephony()
    }

    fn android_id(&self) -> Probe<String> {
        not_on_desktop("ANDROID_ID")
    }

    fn locale(&self) -> Probe<LocaleInfo> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok())
            .find_map(|value| parse_posix_locale(&value))
            .ok_or_else(|| Degraded::unavailable("no locale configured"))
    }

    fn airplane_mode_flag(&self) -> Probe<i32> {
        #[cfg(target_os = "linux")]
        if let Some(nm) = &self.network_manager {
            return nm
                .radios_enabled()
                .map(|(wireless, wwan)| i32::from(!wireless && !wwan))
                .map_err(|e| Degraded::Failed(e.to_string()));
        }
        not_on_desktop("airplane mode")
    }

    fn location_mode(&self) -> Probe<i32> {
        not_on_desktop("location mode")
    }

    fn hardware(&self) -> Probe<String> {
        Ok(std::env::consts::ARCH.to_string())
    }

    fn device_identity(&self) -> Probe<DeviceIdentity> {
        let host = System::host_name().unwrap_or_default();
        #[cfg(target_os = "linux")]
        let (vendor, product) = (linux::dmi("sys_vendor"), linux::dmi("product_name"));
        #[cfg(not(target_os = "linux"))]
        let (vendor, product): (Option<String>, Option<String>) = (None, None);

        let manufacturer = vendor.unwrap_or_else(|| System::name().unwrap_or_default());
        Ok(DeviceIdentity {
            model: product.clone().unwrap_or_else(|| host.clone()),
            brand: manufacturer.clone(),
            manufacturer,
            device: host,
            product: product.unwrap_or_default(),
            os_release: System::long_os_version().unwrap_or_default(),
        })
    }

    fn sdk_level(&self) -> Probe<u32> {
        not_on_desktop("SDK level")
    }

    fn serial(&self) -> Probe<String> {
        #[cfg(target_os = "linux")]
        if let Some(serial) = linux::dmi("product_serial") {
            return Ok(serial);
        }
        Err(Degraded::unavailable("serial number"))
    }

    fn app_version(&self) -> Probe<AppVersion> {
        Err(Degraded::unavailable("no installed package"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posix_locale_names() {
        assert_eq!(
            parse_posix_locale("fa_IR.UTF-8"),
            Some(LocaleInfo {
                language: "fa".into(),
                country: "IR".into()
            })
        );
        assert_eq!(
            parse_posix_locale("de@euro"),
            Some(LocaleInfo {
                language: "de".into(),
                country: String::new()
            })
        );
        assert_eq!(parse_posix_locale("C.UTF-8"), None);
        assert_eq!(parse_posix_locale("POSIX"), None);
        assert_eq!(parse_posix_locale(""), None);
    }

    #[test]
    fn wifi_without_network_manager_follows_the_interface() {
        assert_eq!(
            wifi_without_details(ConnectionType::Wifi),
            Err(Degraded::Failed("Wi-Fi details not exposed".into()))
        );
        assert!(matches!(
            wifi_without_details(ConnectionType::Other),
            Err(Degraded::Unavailable(_))
        ));
        assert!(matches!(
            wifi_without_details(ConnectionType::None),
            Err(Degraded::Unavailable(_))
        ));
    }

    #[test]
    fn connection_type_always_answers() {
        // Works with or without NetworkManager on the system bus.
        assert!(DesktopPlatform::new().connection_type().is_ok());
    }

    #[test]
    fn telephony_is_never_available() {
        let platform = DesktopPlatform::default();
        assert!(matches!(platform.imei(), Err(Degraded::Unavailable(_))));
        assert!(matches!(platform.telephony(), Err(Degraded::Unavailable(_))));
        assert!(matches!(platform.android_id(), Err(Degraded::Unavailable(_))));
    }
}
