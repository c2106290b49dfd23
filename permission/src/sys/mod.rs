//! Platform-specific permission implementations.

/// Android platform implementation.
#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
mod desktop;

#[cfg(target_os = "android")]
pub use android::AndroidBackend as NativeBackend;

#[cfg(not(target_os = "android"))]
pub use desktop::DesktopBackend as NativeBackend;
