use std::path::PathBuf;

pub const UNINSTALL_KEY: &str =
    r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall\Hearthstone";

/// Install directory recorded by the Battle.net installer.
/// Returns `None` if the key or value is missing, or on non-windows platforms.
#[cfg(windows)]
pub fn install_location() -> Option<PathBuf> {
    use winreg::RegKey;
    use winreg::enums::HKEY_LOCAL_MACHINE;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let key = match hklm.open_subkey(UNINSTALL_KEY) {
        Ok(key) => key,
        Err(e) => {
            tracing::debug!("registry key {UNINSTALL_KEY} unavailable: {e}");
            return None;
        }
    };
    match key.get_value::<String, _>("InstallLocation") {
        Ok(location) if !location.is_empty() => Some(PathBuf::from(location)),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("InstallLocation unavailable: {e}");
            None
        }
    }
}

#[cfg(not(windows))]
pub fn install_location() -> Option<PathBuf> {
    None
}
