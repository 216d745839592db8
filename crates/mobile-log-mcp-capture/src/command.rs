//! Platform-specific capture command selection.

use mobile_log_mcp_core::{DeviceClass, DeviceClassifier, Platform};

/// An external log-capture command, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureCommand {
    program: String,
    args: Vec<String>,
    via_shell: bool,
}

impl CaptureCommand {
    /// Select the capture command for a platform and optional device id.
    pub fn for_platform(
        platform: Platform,
        device_id: Option<&str>,
        classifier: &dyn DeviceClassifier,
    ) -> Self {
        match platform {
            Platform::Android => Self::android(device_id),
            Platform::Ios => Self::ios(device_id, classifier),
        }
    }

    /// `adb [-s <device>] logcat -v time`, run through a shell so PATH
    /// resolution applies.
    pub fn android(device_id: Option<&str>) -> Self {
        let mut args = Vec::new();
        if let Some(id) = device_id {
            args.push("-s".to_string());
            args.push(id.to_string());
        }
        args.extend(["logcat", "-v", "time"].map(String::from));

        Self {
            program: "adb".to_string(),
            args,
            via_shell: true,
        }
    }

    /// iOS capture: `xcrun simctl spawn <device|booted> log stream --level
    /// debug` for simulators, `idevicesyslog [-u <device>]` for physical
    /// devices.
    pub fn ios(device_id: Option<&str>, classifier: &dyn DeviceClassifier) -> Self {
        match classifier.classify(device_id) {
            DeviceClass::Simulator => {
                let target = device_id.unwrap_or("booted");
                let args = ["simctl", "spawn", target, "log", "stream", "--level", "debug"]
                    .map(String::from)
                    .to_vec();
                Self {
                    program: "xcrun".to_string(),
                    args,
                    via_shell: false,
                }
            }
            DeviceClass::Device => {
                let mut args = Vec::new();
                if let Some(id) = device_id {
                    args.push("-u".to_string());
                    args.push(id.to_string());
                }
                Self {
                    program: "idevicesyslog".to_string(),
                    args,
                    via_shell: false,
                }
            }
        }
    }

    /// The capture tool being invoked (before any shell wrapping).
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Printable form of the command, as reported to callers.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// The actual program + argument list to spawn, wrapping in a shell
    /// invocation when PATH resolution is wanted.
    pub fn invocation(&self) -> (String, Vec<String>) {
        if self.via_shell {
            if cfg!(windows) {
                ("cmd".to_string(), vec!["/C".to_string(), self.display_line()])
            } else {
                ("sh".to_string(), vec!["-c".to_string(), self.display_line()])
            }
        } else {
            (self.program.clone(), self.args.clone())
        }
    }

    #[cfg(test)]
    pub(crate) fn raw(program: &str, args: &[&str], via_shell: bool) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            via_shell,
        }
    }
}
