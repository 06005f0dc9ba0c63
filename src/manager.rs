//! Process-wide pairing registry mapping an xpub to its signing device.
//!
//! Pairing and unpairing can race between UI actions and wallet-close
//! cleanup, so every mutation goes through the one registry lock. The
//! registry is an explicit dependency passed by reference, not a global.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::HardwareClient;
use crate::device::Device;

struct Pairing {
    device: Device,
    client: Arc<dyn HardwareClient>,
}

/// Registry of xpub → paired device associations.
#[derive(Default)]
pub struct DeviceManager {
    pairings: Mutex<HashMap<String, Pairing>>,
}

impl DeviceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate an xpub with a device and its live session.
    ///
    /// When the new session carries the same label as an already-paired one
    /// (unnamed devices compare equal on the empty label), the two cannot be
    /// told apart; this is logged loudly but the pairing still goes through.
    pub async fn pair_xpub(&self, xpub: &str, device: Device, client: Arc<dyn HardwareClient>) {
        let label = client.label().unwrap_or_default();
        let mut pairings = self.pairings.lock().await;
        for (paired_xpub, pairing) in pairings.iter() {
            if paired_xpub == xpub {
                continue;
            }
            if pairing.client.label().unwrap_or_default() == label {
                log::warn!(
                    "devices {} and {} share the label {:?} and cannot be told apart",
                    pairing.device.unique_id,
                    device.unique_id,
                    label,
                );
            }
        }
        log::debug!("pairing device {} ({})", device.unique_id, device.display_label());
        pairings.insert(xpub.to_string(), Pairing { device, client });
    }

    /// Drop the pairing for `xpub` and close its session. Unpairing an
    /// already-unpaired xpub is a no-op; returns whether a pairing existed.
    pub async fn unpair_xpub(&self, xpub: &str) -> bool {
        let removed = self.pairings.lock().await.remove(xpub);
        match removed {
            Some(pairing) => {
                log::debug!("unpairing device {}", pairing.device.unique_id);
                pairing.client.close().await;
                true
            }
            None => false,
        }
    }

    pub async fn device_for_xpub(&self, xpub: &str) -> Option<Device> {
        self.pairings
            .lock()
            .await
            .get(xpub)
            .map(|pairing| pairing.device.clone())
    }

    pub async fn client_for_xpub(&self, xpub: &str) -> Option<Arc<dyn HardwareClient>> {
        self.pairings
            .lock()
            .await
            .get(xpub)
            .map(|pairing| pairing.client.clone())
    }

    pub async fn paired_count(&self) -> usize {
        self.pairings.lock().await.len()
    }
}
