//! OP_RETURN output validation.
//!
//! Signing devices display and sign data-carrier outputs only when the
//! script stays inside what their firmware can parse: one OP_RETURN marker,
//! a bounded number of data pushes, a bounded payload, and a zero amount.
//! [`validate_op_return_output`] is the gate every such output passes
//! through before it is handed to a device.

use std::num::NonZeroUsize;

use bitcoin::blockdata::opcodes::all as opcodes;
use bitcoin::Script;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::transaction::{OutputKind, TxOutput};

/// Payload cap most hardware firmwares enforce, in bytes.
pub const DEFAULT_MAX_SIZE: usize = 220;

/// Limits a device firmware imposes on OP_RETURN outputs.
///
/// `max_pushes: None` means no explicit push cap; there can never be more
/// pushes than payload bytes, so `max_size` bounds the count anyway. Most
/// hardware wallets support a single push, some more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpReturnPolicy {
    pub max_size: usize,
    pub max_pushes: Option<NonZeroUsize>,
}

impl Default for OpReturnPolicy {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            max_pushes: NonZeroUsize::new(1),
        }
    }
}

impl OpReturnPolicy {
    pub fn unlimited_pushes(max_size: usize) -> Self {
        Self {
            max_size,
            max_pushes: None,
        }
    }

    fn effective_max_pushes(&self) -> usize {
        self.max_pushes.map(NonZeroUsize::get).unwrap_or(self.max_size)
    }
}

/// One operation of a parsed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOp {
    pub opcode: u8,
    /// Payload for data pushes, `None` for opcode-only operations.
    pub push: Option<Vec<u8>>,
    /// The operation's full encoding: opcode, length bytes, payload.
    pub raw: Vec<u8>,
}

impl ScriptOp {
    pub fn is_push(&self) -> bool {
        self.push.is_some()
    }
}

/// Flat, non-recursive scan of a script into its operations.
///
/// Direct pushes (opcodes 0x00..=0x4b) and the three PUSHDATA forms are
/// decoded; every other opcode is kept as an opcode-only operation. A push
/// whose declared length overruns the script end fails with
/// [`Error::TruncatedScript`].
pub fn parse_script_ops(script: &Script) -> Result<Vec<ScriptOp>> {
    let bytes = script.as_bytes();
    let pushdata1 = opcodes::OP_PUSHDATA1.to_u8();
    let pushdata2 = opcodes::OP_PUSHDATA2.to_u8();
    let pushdata4 = opcodes::OP_PUSHDATA4.to_u8();

    let mut ops = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let start = i;
        let opcode = bytes[i];
        i += 1;

        let push_len = if opcode < pushdata1 {
            Some(opcode as usize)
        } else if opcode == pushdata1 {
            let len = *bytes
                .get(i)
                .ok_or(Error::TruncatedScript { offset: start })?;
            i += 1;
            Some(len as usize)
        } else if opcode == pushdata2 {
            let raw = bytes
                .get(i..i + 2)
                .ok_or(Error::TruncatedScript { offset: start })?;
            i += 2;
            Some(u16::from_le_bytes([raw[0], raw[1]]) as usize)
        } else if opcode == pushdata4 {
            let raw = bytes
                .get(i..i + 4)
                .ok_or(Error::TruncatedScript { offset: start })?;
            i += 4;
            Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize)
        } else {
            None
        };

        let push = match push_len {
            Some(len) => {
                let payload = bytes
                    .get(i..i + len)
                    .ok_or(Error::TruncatedScript { offset: start })?;
                i += len;
                Some(payload.to_vec())
            }
            None => None,
        };

        ops.push(ScriptOp {
            opcode,
            push,
            raw: bytes[start..i].to_vec(),
        });
    }
    Ok(ops)
}

/// Validate a candidate OP_RETURN output against `policy` and return the
/// embedded payload: the raw concatenation of the push length encodings and
/// push payloads after the marker opcode.
///
/// Pure and deterministic; rejections are transaction-construction errors
/// the caller surfaces to the user.
pub fn validate_op_return_output(output: &TxOutput, policy: &OpReturnPolicy) -> Result<Vec<u8>> {
    let max_pushes = policy.effective_max_pushes();

    if output.kind != OutputKind::Script {
        return Err(Error::InvalidOutputKind { kind: output.kind });
    }

    let ops = parse_script_ops(&output.script)?;

    if ops.first().map(|op| op.opcode) != Some(opcodes::OP_RETURN.to_u8()) {
        return Err(Error::MissingOpReturnMarker);
    }

    let pushes = &ops[1..];
    if pushes.is_empty() || pushes.len() > max_pushes || pushes.iter().any(|op| !op.is_push()) {
        return Err(Error::TooManyOrInvalidPushes { max_pushes });
    }

    // Everything after the marker, re-serialized from the parsed operations
    // so multi-byte push length encodings keep their exact boundaries.
    let data: Vec<u8> = pushes.iter().flat_map(|op| op.raw.iter().copied()).collect();

    if data.len() > policy.max_size {
        return Err(Error::OpReturnTooLarge {
            size: data.len(),
            max_size: policy.max_size,
        });
    }

    if output.value != 0 {
        return Err(Error::NonZeroOpReturnValue {
            value: output.value,
        });
    }

    log::debug!(
        "OP_RETURN output accepted: {} bytes ({})",
        data.len(),
        hex::encode(&data)
    );
    Ok(data)
}
