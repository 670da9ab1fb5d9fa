//! XDG autostart desktop entry

use std::path::{Path, PathBuf};

use hoyosign_core::AutostartRegistrar;
use hoyosign_domain::{HoyoSignError, Result};
use tracing::info;

pub const DESKTOP_FILE_NAME: &str = "hoyosign.desktop";

/// Registers `<exec> daemon` to start with the desktop session by writing
/// `~/.config/autostart/hoyosign.desktop`.
#[derive(Debug, Clone)]
pub struct XdgAutostart {
    path: PathBuf,
    exec: PathBuf,
}

impl XdgAutostart {
    pub fn new(path: impl Into<PathBuf>, exec: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), exec: exec.into() }
    }

    /// Entry in the user's autostart directory for the running executable.
    ///
    /// # Errors
    /// [`HoyoSignError::Platform`] when neither the config directory nor the
    /// executable path can be determined.
    pub fn for_current_exe() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HoyoSignError::Platform("no user config directory".into()))?;
        let exec = std::env::current_exe()
            .map_err(|e| HoyoSignError::Platform(format!("cannot locate executable: {e}")))?;
        Ok(Self::new(config_dir.join("autostart").join(DESKTOP_FILE_NAME), exec))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn desktop_entry(&self) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name=hoyosign\n\
             Comment=Daily check-in claims\n\
             Exec=\"{}\" daemon\n\
             Terminal=false\n\
             X-GNOME-Autostart-enabled=true\n",
            self.exec.display()
        )
    }
}

impl AutostartRegistrar for XdgAutostart {
    fn is_enabled(&self) -> Result<bool> {
        Ok(self.path.is_file())
    }

    fn enable(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HoyoSignError::Platform(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(&self.path, self.desktop_entry()).map_err(|e| {
            HoyoSignError::Platform(format!("cannot write {}: {e}", self.path.display()))
        })?;
        info!(path = %self.path.display(), "Autostart enabled");
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Autostart disabled");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HoyoSignError::Platform(format!(
                "cannot remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}
