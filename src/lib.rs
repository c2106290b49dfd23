//! # Mobileinfo
//!
//! Collects a one-shot report of a device's connectivity, battery, storage,
//! telephony, locale and settings state, after asking for the runtime
//! permissions the report needs.
//!
//! The work is split across crates that can be enabled on their own:
//!
//! - `permission`: the runtime permission gate.
//! - `system`: platform accessors for device and connectivity state.
//! - `notification`: transient toasts, used to announce denied permissions.
//! - `report`: formats the accessors into the labeled report.
//!
//! Use the `full` feature (on by default) to get everything, including
//! [`App`], which drives one run from startup to the finished report.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mobileinfo::App;
//! use mobileinfo::notification::sys::NativeToaster;
//! use mobileinfo::permission::sys::NativeBackend;
//! use mobileinfo::report::ReportOptions;
//! use mobileinfo::system::fixed::FixedPlatform;
//!
//! let mut app = App::new(
//!     FixedPlatform::sample(),
//!     NativeBackend::new(),
//!     NativeToaster::new("mobileinfo"),
//! )
//! .options(ReportOptions { extended: true });
//! pollster::block_on(app.start()).unwrap();
//! println!("{}", app.report().unwrap());
//! ```

#[cfg(feature = "notification")]
pub use mobileinfo_notification as notification;

#[cfg(feature = "permission")]
pub use mobileinfo_permission as permission;

#[cfg(feature = "report")]
pub use mobileinfo_report as report;

#[cfg(feature = "system")]
pub use mobileinfo_system as system;

pub mod session;

#[cfg(feature = "full")]
mod app;

#[cfg(feature = "full")]
pub use app::{App, AppError, AppState};

#[cfg(all(target_os = "android", feature = "full"))]
mod android;
