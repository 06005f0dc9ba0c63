//! Vendor-neutral mediation layer between a wallet application and hardware
//! signing devices.
//!
//! Provides the capability set every vendor integration implements
//! ([`HardwarePlugin`]), per-device sessions ([`HardwareClient`]), the
//! process-wide xpub → device pairing registry ([`DeviceManager`]), the
//! wallet-close lifecycle, and the OP_RETURN output validator that keeps
//! data-carrier outputs inside what device firmware can safely parse.
//!
//! Transport (USB/HID), vendor wire protocols, transaction signing, and the
//! wallet UI live outside this crate; they appear here only as the traits
//! the core needs from them.

pub mod client;
pub mod device;
pub mod errors;
pub mod handler;
pub mod keystore;
pub mod manager;
pub mod op_return;
pub mod plugin;
pub mod transaction;

pub use client::{HardwareClient, ScriptType};
pub use device::{Device, DeviceInfo};
pub use errors::{Error, Result};
pub use handler::Handler;
pub use keystore::{HardwareKeystore, StopSignal, WalletBackend, WorkerHandle};
pub use manager::DeviceManager;
pub use op_return::{validate_op_return_output, OpReturnPolicy};
pub use plugin::{only_if_libraries_available, show_address_helper, HardwarePlugin, SetupPurpose};
pub use transaction::{any_output_on_change_branch, AddressPath, OutputKind, TxOutput};
