//! Per-device session abstraction.
//!
//! A session moves through `Disconnected → Connected → {Initialized | Wiped}
//! → Closed`; a forced `close()` is reachable from any state. Exactly one
//! session exists per physical connection, and device communication is
//! blocking per session: one in-flight request at a time.

use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use bitcoin::bip32::DerivationPath;

use crate::errors::Result;

/// Script kinds an extended public key can be derived for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptType {
    P2PKH,
    P2SH,
    P2WPKH,
    P2WSH,
    P2TR,
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptType::P2PKH => "p2pkh",
            ScriptType::P2SH => "p2sh",
            ScriptType::P2WPKH => "p2wpkh",
            ScriptType::P2WSH => "p2wsh",
            ScriptType::P2TR => "p2tr",
        };
        f.write_str(name)
    }
}

/// A live connection to one physical signing device.
#[async_trait]
pub trait HardwareClient: Send + Sync {
    /// Whether this session can currently be associated with a new xpub.
    async fn is_pairable(&self) -> bool;

    /// True once the device reports it holds key material, false if wiped.
    async fn is_initialized(&self) -> Result<bool>;

    /// The name given by the user to the device.
    ///
    /// Labels are shown to the user to tell their devices apart, and double
    /// as a programmatic disambiguator when several devices of the same
    /// model are connected. Two sessions with the same (possibly empty)
    /// label are indistinguishable; the pairing registry warns rather than
    /// silently merging them.
    fn label(&self) -> Option<String>;

    /// Liveness probe. Returns false on a dead connection, never errors.
    async fn has_usable_connection_with_device(&self) -> bool;

    /// Advisory hint that sessions idle since before `cutoff` may be
    /// disconnected.
    fn timeout(&self, _cutoff: Instant) {}

    /// Derive the extended public key at `path` for the given script type.
    async fn get_xpub(&self, path: &DerivationPath, script_type: ScriptType) -> Result<String>;

    /// Release the transport handle. Idempotent, and safe to call while an
    /// operation is pending: the transport must make that operation fail
    /// rather than hang.
    async fn close(&self);
}
