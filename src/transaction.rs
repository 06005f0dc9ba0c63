//! Transaction-output model shared by the OP_RETURN validator and the
//! pre-signing checks.

use bitcoin::ScriptBuf;
use serde::{Deserialize, Serialize};

/// Distinguishes raw-script outputs from standard payment outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// Pays to an address (P2PKH, P2SH, segwit, ...).
    Address,
    /// Carries a raw script, e.g. an OP_RETURN data carrier.
    Script,
}

/// Wallet derivation of an output that pays back into the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressPath {
    /// 0 for the receive branch, 1 for the change branch.
    pub branch: u32,
    pub index: u32,
}

impl AddressPath {
    pub fn is_change(&self) -> bool {
        self.branch == 1
    }
}

/// A candidate transaction output as handed to a signing device.
#[derive(Debug, Clone)]
pub struct TxOutput {
    pub kind: OutputKind,
    pub script: ScriptBuf,
    /// Amount in the smallest currency unit.
    pub value: u64,
    /// Wallet derivation for the output when known; used for change
    /// detection, absent for foreign outputs.
    pub address_path: Option<AddressPath>,
}

impl TxOutput {
    /// A standard payment output paying to `script_pubkey`.
    pub fn payment(script_pubkey: ScriptBuf, value: u64) -> Self {
        Self {
            kind: OutputKind::Address,
            script: script_pubkey,
            value,
            address_path: None,
        }
    }

    /// A raw-script output.
    pub fn script_output(script: ScriptBuf, value: u64) -> Self {
        Self {
            kind: OutputKind::Script,
            script,
            value,
            address_path: None,
        }
    }

    pub fn with_address_path(mut self, path: AddressPath) -> Self {
        self.address_path = Some(path);
        self
    }
}

/// True when any output derives from the wallet's change branch. Devices
/// display change outputs differently, so callers check this before handing
/// a transaction over.
pub fn any_output_on_change_branch(outputs: &[TxOutput]) -> bool {
    outputs
        .iter()
        .filter_map(|output| output.address_path)
        .any(|path| path.is_change())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_branch_detection() {
        let mut outputs = vec![
            TxOutput::payment(ScriptBuf::new(), 1000),
            TxOutput::payment(ScriptBuf::new(), 2000)
                .with_address_path(AddressPath { branch: 0, index: 7 }),
        ];
        assert!(!any_output_on_change_branch(&outputs));

        outputs.push(
            TxOutput::payment(ScriptBuf::new(), 500)
                .with_address_path(AddressPath { branch: 1, index: 3 }),
        );
        assert!(any_output_on_change_branch(&outputs));
    }

    #[test]
    fn test_no_outputs_is_not_change() {
        assert!(!any_output_on_change_branch(&[]));
    }
}
