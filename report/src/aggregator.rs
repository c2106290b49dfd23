use mobileinfo_permission::{GateOutcome, Permission};
use mobileinfo_system::{Degraded, Platform, Probe};

use crate::{DeviceReport, ReportOptions, Section, SectionKind, format};

/// Builds a [`DeviceReport`] from a platform and a permission outcome.
///
/// Reads that depend on a denied permission resolve to
/// [`Degraded::PermissionDenied`] without calling the platform.
#[derive(Clone, Copy)]
pub struct Aggregator<'a> {
    platform: &'a dyn Platform,
    permissions: &'a GateOutcome,
    options: ReportOptions,
}

impl std::fmt::Debug for Aggregator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("permissions", self.permissions)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Aggregator<'a> {
    /// Aggregate the standard report.
    #[must_use]
    pub fn new(platform: &'a dyn Platform, permissions: &'a GateOutcome) -> Self {
        Self {
            platform,
            permissions,
            options: ReportOptions::default(),
        }
    }

    /// Replace the report options.
    #[must_use]
    pub const fn options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    fn gated<T>(&self, permission: Permission, read: impl FnOnce() -> Probe<T>) -> Probe<T> {
        if self.permissions.is_granted(permission) {
            read()
        } else {
            log::debug!("{permission} not granted, skipping read");
            Err(Degraded::PermissionDenied)
        }
    }

    /// Read every accessor once and format the report.
    #[must_use]
    pub fn build(&self) -> DeviceReport {
        let platform = self.platform;

        let network = self.gated(Permission::AccessNetworkState, || {
            platform.connection_type()
        });
        let wifi = self.gated(Permission::AccessWifiState, || platform.wifi_connection());
        let imei = self.gated(Permission::ReadPhoneState, || platform.imei());
        let phone_number = self.gated(Permission::ReadPhoneState, || platform.phone_number());
        let phone_state = self.permissions.is_granted(Permission::ReadPhoneState);
        let details = platform.telephony().map(|mut details| {
            // The radio type needs READ_PHONE_STATE from API 30.
            if !phone_state {
                details.network_type = Err(Degraded::PermissionDenied);
            }
            details
        });
        let telephony = format::telephony(&imei, &phone_number, &details);
        let android_id = format::text_or_placeholder(&platform.android_id());
        let hardware = platform.hardware();

        let mut sections = vec![
            Section::single(SectionKind::Network, format::network(&network)),
            Section::single(SectionKind::Wifi, format::wifi(&wifi)),
            Section::single(SectionKind::Battery, format::battery(&platform.battery())),
            Section::single(SectionKind::Storage, format::storage(&platform.storage())),
            Section::new(SectionKind::Telephony, telephony.clone()),
            Section::single(SectionKind::AndroidId, android_id.clone()),
            Section::single(SectionKind::Locale, format::locale(&platform.locale())),
            Section::single(
                SectionKind::AirplaneMode,
                format::airplane_mode(&platform.airplane_mode_flag()),
            ),
            Section::single(SectionKind::Gps, format::gps(&platform.location_mode())),
            Section::new(
                SectionKind::Security,
                format::security(&telephony, &android_id, &hardware),
            ),
        ];

        let serial = self.gated(Permission::ReadPhoneState, || platform.serial());
        let device = format::device(
            &platform.device_identity(),
            &platform.sdk_level(),
            &hardware,
            &serial,
        );
        let app_version = format::app_version(&platform.app_version());
        for line in &device {
            log::info!("{line}");
        }
        log::info!("{app_version}");

        if self.options.extended {
            sections.push(Section::new(SectionKind::Device, device));
            sections.push(Section::single(SectionKind::AppVersion, app_version));
        }

        for section in &sections {
            log::debug!("{}: {}", section.kind(), section.value());
        }
        DeviceReport::new(sections)
    }
}

#[cfg(test)]
mod tests {
    use mobileinfo_system::fixed::FixedPlatform;

    use super::*;

    fn all_granted() -> GateOutcome {
        GateOutcome::granted(Permission::ALL)
    }

    fn without(denied: &[Permission]) -> GateOutcome {
        GateOutcome::granted(
            Permission::ALL
                .into_iter()
                .filter(|permission| !denied.contains(permission)),
        )
    }

    #[test]
    fn sample_report_layout() {
        let platform = FixedPlatform::sample();
        let permissions = all_granted();
        let report = Aggregator::new(&platform, &permissions).build();

        let expected = "\
Network: Wi-Fi
Wi-Fi: SSID: \"HomeNetwork\", Signal Strength: -58
Battery: Battery Level: 76%, Charging: No
Storage: Free Storage: 48213MB, Total Storage: 119132MB
Telephony: IMEI: Not available
           Phone Number: Not available
           Carrier: Irancell
           SIM Operator: 43235
           SIM Country: ir
           Network Type: 13
Android ID: 9774d56d682e549c
Locale: Language: fa, Country: IR
Airplane Mode: Off
GPS: Enabled
Security Info: IMEI: IMEI: Not available
               Phone Number: Not available
               Carrier: Irancell
               SIM Operator: 43235
               SIM Country: ir
               Network Type: 13
               Android ID: 9774d56d682e549c
               Hardware: tensor";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn denied_phone_state_degrades_identifiers() {
        let mut platform = FixedPlatform::sample();
        platform.imei = Ok("356938035643809".into());
        platform.phone_number = Ok("+989121234567".into());
        let permissions = without(&[Permission::ReadPhoneState]);

        let report = Aggregator::new(&platform, &permissions).build();

        assert!(!report.is_empty());
        let telephony = report.section(SectionKind::Telephony).unwrap();
        assert_eq!(telephony.lines()[0], "IMEI: Not available");
        assert_eq!(telephony.lines()[1], "Phone Number: Not available");
        let security = report.section(SectionKind::Security).unwrap();
        assert_eq!(security.lines()[0], "IMEI: IMEI: Not available");
        assert_eq!(security.lines()[1], "Phone Number: Not available");
    }

    #[test]
    fn denied_phone_state_hides_network_type() {
        let mut platform = FixedPlatform::sample();
        if let Ok(details) = &mut platform.telephony {
            details.network_type = Err(Degraded::Failed(
                "java.lang.SecurityException: getDataNetworkTypeForSubscriber".into(),
            ));
        }
        let permissions = without(&[Permission::ReadPhoneState]);

        let report = Aggregator::new(&platform, &permissions).build();

        let telephony = report.section(SectionKind::Telephony).unwrap();
        assert_eq!(telephony.lines()[2], "Carrier: Irancell");
        assert_eq!(telephony.lines()[5], "Network Type: Not available");
        assert!(!report.to_string().contains("SecurityException"));
    }

    #[test]
    fn denied_reads_never_reach_the_platform() {
        let platform = FixedPlatform::sample();
        let permissions = without(&[
            Permission::ReadPhoneState,
            Permission::AccessNetworkState,
            Permission::AccessWifiState,
        ]);

        let report = Aggregator::new(&platform, &permissions).build();

        let reads = platform.reads();
        for gated in ["imei", "phone_number", "serial", "connection_type", "wifi_connection"] {
            assert!(!reads.contains(&gated), "{gated} was read");
        }
        assert!(reads.contains(&"telephony"));
        assert_eq!(
            report.section(SectionKind::Network).unwrap().value(),
            "Not available"
        );
    }

    #[test]
    fn disconnected_wifi_section() {
        let mut platform = FixedPlatform::sample();
        platform.wifi_connection = Err(Degraded::unavailable("not associated"));
        let permissions = all_granted();

        let report = Aggregator::new(&platform, &permissions).build();

        assert_eq!(
            report.section(SectionKind::Wifi).unwrap().value(),
            "No Wi-Fi connection"
        );
    }

    #[test]
    fn airplane_mode_flag() {
        let permissions = all_granted();
        for (flag, expected) in [(1, "Airplane Mode: On"), (0, "Airplane Mode: Off")] {
            let mut platform = FixedPlatform::sample();
            platform.airplane_mode_flag = Ok(flag);
            let report = Aggregator::new(&platform, &permissions).build();
            assert!(report.to_string().contains(expected));
        }
    }

    #[test]
    fn fully_degraded_platform_still_reports() {
        fn failed<T>() -> Probe<T> {
            Err(Degraded::Failed("DeadSystemException".into()))
        }

        let mut platform = FixedPlatform::sample();
        platform.connection_type = failed();
        platform.wifi_connection = failed();
        platform.battery = failed();
        platform.storage = failed();
        platform.telephony = failed();
        platform.android_id = failed();
        platform.locale = failed();
        platform.airplane_mode_flag = failed();
        platform.location_mode = failed();
        platform.hardware = failed();
        platform.device_identity = failed();
        platform.sdk_level = failed();
        platform.app_version = failed();
        let permissions = GateOutcome::default();

        let report = Aggregator::new(&platform, &permissions).build();

        assert_eq!(report.sections().len(), SectionKind::STANDARD.len());
        assert_eq!(
            report.section(SectionKind::Battery).unwrap().value(),
            "Error: DeadSystemException"
        );
        assert_eq!(report.section(SectionKind::AirplaneMode).unwrap().value(), "Off");
        assert_eq!(report.section(SectionKind::Gps).unwrap().value(), "Disabled");
    }

    #[test]
    fn section_order_is_stable() {
        let platform = FixedPlatform::sample();
        let permissions = all_granted();
        let aggregator = Aggregator::new(&platform, &permissions);

        let first = aggregator.build();
        let second = aggregator.build();

        assert_eq!(first, second);
        let kinds: Vec<_> = first.sections().iter().map(Section::kind).collect();
        assert_eq!(kinds, SectionKind::STANDARD);
    }

    #[test]
    fn extended_report_appends_device_and_version() {
        let platform = FixedPlatform::sample();
        let permissions = all_granted();

        let report = Aggregator::new(&platform, &permissions)
            .options(ReportOptions { extended: true })
            .build();

        let kinds: Vec<_> = report.sections().iter().map(Section::kind).collect();
        assert_eq!(kinds[..10], SectionKind::STANDARD);
        assert_eq!(kinds[10..], SectionKind::EXTENDED);
        let device = report.section(SectionKind::Device).unwrap();
        assert_eq!(device.lines()[0], "Device Brand: Google Pixel 8");
        assert!(device.lines().iter().any(|l| l == "SDK Version: 34"));
        assert_eq!(
            report.section(SectionKind::AppVersion).unwrap().value(),
            "Version Name: 1.0, Version Code: 1"
        );
    }
}
