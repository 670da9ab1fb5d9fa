//! Platform-specific implementations
//!
//! # Platform Support
//!
//! - **Linux**: XDG autostart desktop entry
//! - **Other platforms**: Fallback stub (returns platform error)

pub mod autostart;

pub use autostart::XdgAutostart;

#[cfg(not(target_os = "linux"))]
pub mod fallback {
    use hoyosign_core::AutostartRegistrar;
    use hoyosign_domain::{HoyoSignError, Result};

    /// Autostart registrar for platforms without an implementation.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct UnsupportedAutostart;

    impl AutostartRegistrar for UnsupportedAutostart {
        fn is_enabled(&self) -> Result<bool> {
            Ok(false)
        }

        fn enable(&self) -> Result<()> {
            Err(HoyoSignError::Platform("autostart is only supported on Linux".to_string()))
        }

        fn disable(&self) -> Result<()> {
            Ok(())
        }
    }
}

/// Autostart registrar for the current platform.
///
/// # Errors
/// [`hoyosign_domain::HoyoSignError::Platform`] when the autostart location
/// cannot be determined.
#[cfg(target_os = "linux")]
pub fn autostart_registrar() -> hoyosign_domain::Result<Box<dyn hoyosign_core::AutostartRegistrar>> {
    Ok(Box::new(XdgAutostart::for_current_exe()?))
}

/// Autostart registrar for the current platform.
#[cfg(not(target_os = "linux"))]
pub fn autostart_registrar() -> hoyosign_domain::Result<Box<dyn hoyosign_core::AutostartRegistrar>> {
    Ok(Box::new(fallback::UnsupportedAutostart))
}
