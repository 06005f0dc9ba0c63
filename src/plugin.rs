//! Vendor capability-set abstraction.
//!
//! One [`HardwarePlugin`] implementation exists per hardware vendor. The
//! required methods are the operations a vendor integration cannot work
//! without; an incomplete variant therefore fails to compile instead of
//! failing at runtime.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bitcoin::bip32::DerivationPath;
use bitcoin::Address;
use serde::{Deserialize, Serialize};

use crate::client::{HardwareClient, ScriptType};
use crate::device::{Device, DeviceInfo};
use crate::errors::Result;
use crate::handler::Handler;
use crate::keystore::{HardwareKeystore, WalletBackend};
use crate::manager::DeviceManager;

/// Why the setup flow is being driven: creating a new wallet, or unlocking
/// a device to decrypt an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupPurpose {
    NewWallet,
    DecryptWallet,
}

/// Capability set every vendor-specific hardware integration implements.
#[async_trait]
pub trait HardwarePlugin: Send + Sync {
    /// Stable tag identifying this vendor integration. Keystores backed by
    /// this plugin carry the same tag; lifecycle operations are dispatched
    /// on it.
    fn kind(&self) -> &'static str;

    /// Whether the vendor's optional support libraries were found. Hooks
    /// wrapped with [`only_if_libraries_available`] are skipped when false.
    fn libraries_available(&self) -> bool {
        true
    }

    /// Whether this vendor integration is usable in the current
    /// environment.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Whether the vendor's firmware accepts BIP44 derivation paths for
    /// this coin.
    fn supports_bip44_derivation(&self) -> bool {
        false
    }

    /// Attempt to open a session on a discovered device.
    ///
    /// Returns `Ok(None)` when the device is not this vendor's (not an
    /// error), and [`crate::Error::Connection`] when it is but
    /// communication fails.
    async fn create_client(
        &self,
        device: &Device,
        handler: Arc<dyn Handler>,
    ) -> Result<Option<Arc<dyn HardwareClient>>>;

    /// Derive the extended public key at `derivation` on the device with
    /// id `device_id`. Fails with [`crate::Error::Device`] when the device
    /// cannot produce it (locked, wrong firmware, user cancellation).
    async fn get_xpub(
        &self,
        device_id: &str,
        derivation: &DerivationPath,
        script_type: ScriptType,
        wizard: Arc<dyn Handler>,
    ) -> Result<String>;

    /// Drive first-time initialization or the unlock flow on a device.
    async fn setup_device(
        &self,
        device_info: &DeviceInfo,
        wizard: Arc<dyn Handler>,
        purpose: SetupPurpose,
    ) -> Result<()>;

    /// Display an address on the device screen. Vendors with a display
    /// override this; the default does nothing.
    async fn show_address(
        &self,
        _wallet: &dyn WalletBackend,
        _address: &Address,
        _keystore: Arc<dyn HardwareKeystore>,
    ) {
    }

    /// Wallet-close cleanup. For every keystore backed by this plugin:
    /// unpair its xpub first (so no new work reaches the device), then stop
    /// its background worker if it has one. Safe to invoke repeatedly and
    /// on wallets with no matching keystores.
    async fn close_wallet(&self, devices: &DeviceManager, wallet: &dyn WalletBackend) {
        for keystore in wallet.get_keystores() {
            if keystore.plugin_kind() != self.kind() {
                continue;
            }
            let was_paired = devices.unpair_xpub(keystore.xpub()).await;
            log::debug!(
                "close_wallet: released {} keystore (was_paired={})",
                keystore.plugin_kind(),
                was_paired,
            );
            if let Some(worker) = keystore.worker() {
                worker.stop();
            }
        }
    }
}

/// Run a hook-style operation only when the plugin's support libraries are
/// available; otherwise skip it and return `None`.
pub async fn only_if_libraries_available<'a, P, F, Fut, T>(plugin: &'a P, hook: F) -> Option<T>
where
    P: HardwarePlugin + ?Sized,
    F: FnOnce(&'a P) -> Fut,
    Fut: Future<Output = T>,
{
    if !plugin.libraries_available() {
        log::debug!(
            "skipping hook for {}: support libraries unavailable",
            plugin.kind()
        );
        return None;
    }
    Some(hook(plugin).await)
}

/// Shared precondition check for address display: the address must belong
/// to the wallet (the user is told otherwise) and the keystore must be
/// backed by this plugin. `keystore` defaults to the wallet's first
/// keystore.
pub fn show_address_helper(
    plugin: &dyn HardwarePlugin,
    wallet: &dyn WalletBackend,
    address: &Address,
    keystore: Option<Arc<dyn HardwareKeystore>>,
) -> bool {
    let keystore = match keystore.or_else(|| wallet.get_keystores().into_iter().next()) {
        Some(keystore) => keystore,
        None => return false,
    };
    if !wallet.is_mine(address) {
        keystore.handler().show_error("Address not in wallet.");
        return false;
    }
    keystore.plugin_kind() == plugin.kind()
}
