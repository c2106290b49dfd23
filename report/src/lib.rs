//! The device report.
//!
//! [`Aggregator`] reads every accessor of a [`Platform`], honoring the
//! permission outcome of the gate, and produces a [`DeviceReport`]: an
//! ordered list of labeled sections that renders to the text shown on
//! screen.
//!
//! ```
//! use mobileinfo_permission::{GateOutcome, Permission};
//! use mobileinfo_report::Aggregator;
//! use mobileinfo_system::fixed::FixedPlatform;
//!
//! let platform = FixedPlatform::sample();
//! let permissions = GateOutcome::granted(Permission::ALL);
//! let report = Aggregator::new(&platform, &permissions).build();
//! assert!(report.to_string().starts_with("Network: Wi-Fi\n"));
//! ```

#![warn(missing_docs)]

mod aggregator;
pub mod format;

pub use aggregator::Aggregator;
pub use mobileinfo_system::{Degraded, Platform, Probe};

use std::fmt;

use serde::{Serialize, Serializer};

/// Sections of the report, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    /// Transport of the active network.
    Network,
    /// Current Wi-Fi association.
    Wifi,
    /// Battery charge state.
    Battery,
    /// Shared storage.
    Storage,
    /// IMEI, line number, carrier and SIM.
    Telephony,
    /// `Settings.Secure.ANDROID_ID`.
    AndroidId,
    /// Default locale.
    Locale,
    /// Airplane mode switch.
    AirplaneMode,
    /// Location services switch.
    Gps,
    /// Identifiers grouped together.
    Security,
    /// Build identity (extended report only).
    Device,
    /// Host app version (extended report only).
    AppVersion,
}

impl SectionKind {
    /// The sections of the default report, in order.
    pub const STANDARD: [Self; 10] = [
        Self::Network,
        Self::Wifi,
        Self::Battery,
        Self::Storage,
        Self::Telephony,
        Self::AndroidId,
        Self::Locale,
        Self::AirplaneMode,
        Self::Gps,
        Self::Security,
    ];

    /// Sections appended by the extended report.
    pub const EXTENDED: [Self; 2] = [Self::Device, Self::AppVersion];

    /// Display label, without the trailing colon.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Network => "Network",
            Self::Wifi => "Wi-Fi",
            Self::Battery => "Battery",
            Self::Storage => "Storage",
            Self::Telephony => "Telephony",
            Self::AndroidId => "Android ID",
            Self::Locale => "Locale",
            Self::AirplaneMode => "Airplane Mode",
            Self::Gps => "GPS",
            Self::Security => "Security Info",
            Self::Device => "Device",
            Self::AppVersion => "App Version",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for SectionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One labeled block of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    #[serde(rename = "label")]
    kind: SectionKind,
    lines: Vec<String>,
}

impl Section {
    /// A section with one or more lines of value text.
    #[must_use]
    pub fn new(kind: SectionKind, lines: Vec<String>) -> Self {
        Self { kind, lines }
    }

    /// A single-line section.
    pub fn single(kind: SectionKind, value: impl Into<String>) -> Self {
        Self::new(kind, vec![value.into()])
    }

    /// Which section this is.
    #[must_use]
    pub const fn kind(&self) -> SectionKind {
        self.kind
    }

    /// Value lines, unindented.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Value lines joined with newlines, unindented.
    #[must_use]
    pub fn value(&self) -> String {
        self.lines.join("\n")
    }
}

/// Continuation lines line up under the first value column.
impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.kind.label();
        let indent = label.len() + 2;
        let mut lines = self.lines.iter();
        write!(f, "{label}: {}", lines.next().map_or("", String::as_str))?;
        for line in lines {
            write!(f, "\n{:indent$}{line}", "")?;
        }
        Ok(())
    }
}

/// Options for building a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Append the device identity and app version sections.
    pub extended: bool,
}

/// The aggregated report, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeviceReport {
    sections: Vec<Section>,
}

impl DeviceReport {
    pub(crate) const fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Sections in display order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look up a section.
    #[must_use]
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Whether the report has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl fmt::Display for DeviceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuation_lines_align_with_value_column() {
        let section = Section::new(
            SectionKind::Telephony,
            vec!["IMEI: Not available".into(), "Carrier: Irancell".into()],
        );
        assert_eq!(
            section.to_string(),
            "Telephony: IMEI: Not available\n           Carrier: Irancell"
        );
    }

    #[test]
    fn report_joins_sections_with_newlines() {
        let report = DeviceReport::new(vec![
            Section::single(SectionKind::Network, "Wi-Fi"),
            Section::single(SectionKind::AirplaneMode, "Off"),
        ]);
        assert_eq!(report.to_string(), "Network: Wi-Fi\nAirplane Mode: Off");
    }

    #[test]
    fn serializes_as_labeled_list() {
        let report = DeviceReport::new(vec![Section::single(SectionKind::Gps, "Enabled")]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "label": "GPS", "lines": ["Enabled"] }])
        );
    }
}
