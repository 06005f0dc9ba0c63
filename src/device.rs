use serde::{Deserialize, Serialize};

/// A hardware signing device reported by the transport layer.
///
/// Records are immutable once discovered; everything downstream (plugins,
/// the pairing registry) only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Stable identifier minted by the transport layer (serial-based when
    /// available).
    pub unique_id: String,
    /// User-assigned name, if the device has one.
    pub label: Option<String>,
    /// Opaque transport token (e.g. a HID path) used to reopen the device.
    pub transport_path: String,
}

impl Device {
    pub fn new(
        unique_id: impl Into<String>,
        label: Option<String>,
        transport_path: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            label,
            transport_path: transport_path.into(),
        }
    }

    /// Name shown to the user, falling back to the identifier for unnamed
    /// devices.
    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.unique_id,
        }
    }
}

/// Device record enriched with the initialization state, handed to the
/// first-time setup flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device: Device,
    pub label: Option<String>,
    /// False for a wiped or factory-fresh device.
    pub initialized: bool,
}
