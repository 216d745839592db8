//! Device classification for iOS capture strategy selection.
//!
//! iOS simulators and physical devices need different capture tools
//! (`xcrun simctl` vs. `idevicesyslog`), but callers only hand us an opaque
//! device identifier. Classification is pluggable so the default heuristic
//! can be swapped for an authoritative lookup.

/// Kind of iOS target a device identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Simulator (UUID-style identifier, reachable via `xcrun simctl`)
    Simulator,
    /// Physical device (short UDID, reachable via `idevicesyslog`)
    Device,
}

/// Classifies an iOS device identifier as simulator or physical device.
pub trait DeviceClassifier: Send + Sync {
    /// Classify the given identifier. `None` means no specific device was
    /// requested, which maps to the booted simulator.
    fn classify(&self, device_id: Option<&str>) -> DeviceClass;
}

/// Physical UDIDs are short hex strings; simulator identifiers are hyphenated
/// UUIDs well past this length.
const MAX_PHYSICAL_UDID_LEN: usize = 25;

/// Default classifier: an identifier containing a hyphen or longer than 25
/// characters is treated as a simulator UUID, everything else as a physical
/// UDID. Heuristic only - not guaranteed correct for all UDID formats.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

impl DeviceClassifier for HeuristicClassifier {
    fn classify(&self, device_id: Option<&str>) -> DeviceClass {
        match device_id {
            Some(id) if !id.contains('-') && id.len() <= MAX_PHYSICAL_UDID_LEN => {
                DeviceClass::Device
            }
            // No id: fall through to the booted simulator.
            _ => DeviceClass::Simulator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphenated_id_is_simulator() {
        let classifier = HeuristicClassifier;
        assert_eq!(
            classifier.classify(Some("00008030-001C2D")),
            DeviceClass::Simulator
        );
    }

    #[test]
    fn test_short_plain_id_is_device() {
        let classifier = HeuristicClassifier;
        assert_eq!(
            classifier.classify(Some("a1b2c3d4e5f6")),
            DeviceClass::Device
        );
    }

    #[test]
    fn test_long_plain_id_is_simulator() {
        let classifier = HeuristicClassifier;
        // 26 hex chars, no hyphen - over the physical UDID length bound.
        assert_eq!(
            classifier.classify(Some("abcdef0123456789abcdef0123")),
            DeviceClass::Simulator
        );
    }

    #[test]
    fn test_boundary_length_is_device() {
        let classifier = HeuristicClassifier;
        let id = "a".repeat(25);
        assert_eq!(classifier.classify(Some(&id)), DeviceClass::Device);
    }

    #[test]
    fn test_missing_id_is_simulator() {
        let classifier = HeuristicClassifier;
        assert_eq!(classifier.classify(None), DeviceClass::Simulator);
    }
}
