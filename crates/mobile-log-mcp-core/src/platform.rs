//! Mobile platform selection for log capture.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Mobile platform a log capture session targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Android device or emulator (logs via `adb logcat`)
    Android,
    /// iOS device or simulator (logs via `idevicesyslog` / `simctl`)
    Ios,
}

impl Platform {
    /// Get the platform name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
