//! Game settings and preferences
//!
//! Persisted separately from run snapshots through the storage interface.

use serde::{Deserialize, Serialize};

use crate::persistence;
use crate::platform::{Capabilities, Storage};

/// Presentation/input profile the tuning is parameterized by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeviceProfile {
    #[default]
    Desktop,
    Mobile,
    /// Low refresh rate and/or imprecise input; gets extra recovery room
    Constrained,
}

impl DeviceProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceProfile::Desktop => "Desktop",
            DeviceProfile::Mobile => "Mobile",
            DeviceProfile::Constrained => "Constrained",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "desktop" => Some(DeviceProfile::Desktop),
            "mobile" => Some(DeviceProfile::Mobile),
            "constrained" => Some(DeviceProfile::Constrained),
            _ => None,
        }
    }

    /// Pick a profile from the injected capability flags.
    pub fn from_capabilities(caps: &Capabilities) -> Self {
        if caps.reduced_refresh {
            DeviceProfile::Constrained
        } else if caps.touch_input || caps.coarse_pointer {
            DeviceProfile::Mobile
        } else {
            DeviceProfile::Desktop
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Explicit profile choice; `None` follows the capability flags
    pub profile_override: Option<DeviceProfile>,

    /// Sound effect events enabled (the audio collaborator reads this)
    pub sound: bool,
    /// Haptic feedback enabled, where the host supports it
    pub haptics: bool,

    // === Accessibility ===
    /// Reduced motion (render collaborator dampens shake/flash)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile_override: None,
            sound: true,
            haptics: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "gapwing_settings";
    const VERSION: u32 = 1;

    /// Effective device profile for this session.
    pub fn profile(&self, caps: &Capabilities) -> DeviceProfile {
        self.profile_override
            .unwrap_or_else(|| DeviceProfile::from_capabilities(caps))
    }

    /// Load settings through the storage interface; defaults on any
    /// decode failure.
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get(Self::STORAGE_KEY) {
            Some(raw) => match persistence::decode(Self::VERSION, &raw) {
                Ok(settings) => {
                    log::info!("loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("discarding stored settings: {e}");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    /// Persist settings through the storage interface.
    pub fn save(&self, storage: &mut dyn Storage) {
        match persistence::encode(Self::VERSION, self) {
            Ok(raw) => {
                if let Err(e) = storage.set(Self::STORAGE_KEY, &raw) {
                    log::warn!("failed to save settings: {e}");
                }
            }
            Err(e) => log::warn!("failed to encode settings: {e}"),
        }
    }
}
