cfg_if::cfg_if! {
    if #[cfg(target_os = "android")] {
        /// Android platform implementation.
        pub mod android;
        pub use android::AndroidPlatform as NativePlatform;
    } else {
        mod desktop;
        pub use desktop::DesktopPlatform as NativePlatform;
    }
}
