use std::num::NonZeroUsize;

use bitcoin::ScriptBuf;
use hwbase::{validate_op_return_output, Error, OpReturnPolicy, OutputKind, TxOutput};

#[test]
fn test_single_push_returns_length_prefixed_payload() {
    let _ = env_logger::try_init();

    // OP_RETURN <push "hi">
    let output = op_return_output(&[0x6a, 0x02, 0x68, 0x69], 0);
    let data = validate_op_return_output(&output, &OpReturnPolicy::default())
        .expect("Failed to validate a minimal OP_RETURN output");
    assert_eq!(data, vec![0x02, 0x68, 0x69]);
}

#[test]
fn test_validation_is_deterministic() {
    let output = op_return_output(&[0x6a, 0x03, 0x61, 0x62, 0x63], 0);
    let policy = OpReturnPolicy::default();
    let first = validate_op_return_output(&output, &policy).unwrap();
    let second = validate_op_return_output(&output, &policy).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_payment_output_is_rejected() {
    let output = TxOutput::payment(script(&[0x6a, 0x01, 0x41]), 0);
    let err = validate_op_return_output(&output, &OpReturnPolicy::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidOutputKind {
            kind: OutputKind::Address
        }
    ));
}

#[test]
fn test_script_without_marker_is_rejected() {
    // A bare push, no OP_RETURN.
    let output = op_return_output(&[0x02, 0x68, 0x69], 0);
    let err = validate_op_return_output(&output, &OpReturnPolicy::default()).unwrap_err();
    assert!(matches!(err, Error::MissingOpReturnMarker));
    assert_eq!(err.to_string(), "only OP_RETURN scripts are supported");

    // Trailing content does not rescue it.
    let output = op_return_output(&[0x76, 0x6a, 0x01, 0x41], 0);
    let err = validate_op_return_output(&output, &OpReturnPolicy::default()).unwrap_err();
    assert!(matches!(err, Error::MissingOpReturnMarker));
}

#[test]
fn test_empty_script_is_rejected() {
    let output = op_return_output(&[], 0);
    let err = validate_op_return_output(&output, &OpReturnPolicy::default()).unwrap_err();
    assert!(matches!(err, Error::MissingOpReturnMarker));
}

#[test]
fn test_marker_without_pushes_is_rejected() {
    let output = op_return_output(&[0x6a], 0);
    let err = validate_op_return_output(&output, &OpReturnPolicy::default()).unwrap_err();
    assert!(matches!(err, Error::TooManyOrInvalidPushes { max_pushes: 1 }));
    assert_eq!(err.to_string(), "OP_RETURN is limited to 1 data push");
}

#[test]
fn test_push_count_above_cap_is_rejected() {
    // OP_RETURN <push "A"> <push "B">
    let output = op_return_output(&[0x6a, 0x01, 0x41, 0x01, 0x42], 0);
    let err = validate_op_return_output(&output, &OpReturnPolicy::default()).unwrap_err();
    assert!(matches!(err, Error::TooManyOrInvalidPushes { max_pushes: 1 }));
}

#[test]
fn test_multiple_pushes_allowed_when_cap_permits() {
    let output = op_return_output(&[0x6a, 0x01, 0x41, 0x02, 0x42, 0x43], 0);
    let policy = policy_with_cap(220, 2);
    let data = validate_op_return_output(&output, &policy)
        .expect("Failed to validate a two-push OP_RETURN output");
    assert_eq!(data, vec![0x01, 0x41, 0x02, 0x42, 0x43]);
}

#[test]
fn test_plural_message_when_cap_above_one() {
    let output = op_return_output(&[0x6a, 0x01, 0x41, 0x01, 0x42, 0x01, 0x43], 0);
    let err = validate_op_return_output(&output, &policy_with_cap(220, 2)).unwrap_err();
    assert_eq!(err.to_string(), "OP_RETURN is limited to 2 data pushes");
}

#[test]
fn test_non_push_operation_after_marker_is_rejected() {
    // OP_RETURN <push "hi"> OP_CHECKSIG
    let output = op_return_output(&[0x6a, 0x02, 0x68, 0x69, 0xac], 0);
    let err = validate_op_return_output(&output, &policy_with_cap(220, 2)).unwrap_err();
    assert!(matches!(err, Error::TooManyOrInvalidPushes { max_pushes: 2 }));
}

#[test]
fn test_payload_over_size_cap_is_rejected() {
    // Five payload bytes encode to six; cap of five rejects.
    let output = op_return_output(&[0x6a, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05], 0);
    let err = validate_op_return_output(&output, &policy_with_cap(5, 1)).unwrap_err();
    assert!(matches!(
        err,
        Error::OpReturnTooLarge {
            size: 6,
            max_size: 5
        }
    ));
}

#[test]
fn test_size_cap_counts_push_encoding_bytes() {
    // A PUSHDATA1 push of 218 bytes encodes to 220: exactly at the cap.
    let mut bytes = vec![0x6a, 0x4c, 218];
    bytes.extend_from_slice(&[0xaa; 218]);
    let data = validate_op_return_output(&op_return_output(&bytes, 0), &OpReturnPolicy::default())
        .expect("Failed to validate an output at the size cap");
    assert_eq!(data.len(), 220);

    // One more payload byte tips the encoding over the cap.
    let mut bytes = vec![0x6a, 0x4c, 219];
    bytes.extend_from_slice(&[0xaa; 219]);
    let err = validate_op_return_output(&op_return_output(&bytes, 0), &OpReturnPolicy::default())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::OpReturnTooLarge {
            size: 221,
            max_size: 220
        }
    ));
}

#[test]
fn test_nonzero_amount_is_rejected() {
    let output = op_return_output(&[0x6a, 0x02, 0x68, 0x69], 546);
    let err = validate_op_return_output(&output, &OpReturnPolicy::default()).unwrap_err();
    assert!(matches!(err, Error::NonZeroOpReturnValue { value: 546 }));
}

#[test]
fn test_no_push_cap_behaves_like_size_cap() {
    // Three pushes, rejected under the default single-push policy but
    // accepted with the cap lifted.
    let bytes = [0x6a, 0x01, 0x41, 0x01, 0x42, 0x01, 0x43];
    let output = op_return_output(&bytes, 0);

    let err = validate_op_return_output(&output, &OpReturnPolicy::default()).unwrap_err();
    assert!(matches!(err, Error::TooManyOrInvalidPushes { max_pushes: 1 }));

    let unlimited = OpReturnPolicy::unlimited_pushes(220);
    let explicit = policy_with_cap(220, 220);
    let from_unlimited = validate_op_return_output(&output, &unlimited).unwrap();
    let from_explicit = validate_op_return_output(&output, &explicit).unwrap();
    assert_eq!(from_unlimited, from_explicit);
    assert_eq!(from_unlimited, vec![0x01, 0x41, 0x01, 0x42, 0x01, 0x43]);
}

#[test]
fn test_pushdata1_encoding_is_preserved() {
    // A PUSHDATA1-encoded 3-byte push keeps its 2-byte length prefix.
    let output = op_return_output(&[0x6a, 0x4c, 0x03, 0x61, 0x62, 0x63], 0);
    let data = validate_op_return_output(&output, &OpReturnPolicy::default())
        .expect("Failed to validate a PUSHDATA1 OP_RETURN output");
    assert_eq!(data, vec![0x4c, 0x03, 0x61, 0x62, 0x63]);
}

#[test]
fn test_truncated_push_is_rejected() {
    let output = op_return_output(&[0x6a, 0x05, 0x68], 0);
    let err = validate_op_return_output(&output, &OpReturnPolicy::default()).unwrap_err();
    assert!(matches!(err, Error::TruncatedScript { offset: 1 }));
}

fn script(bytes: &[u8]) -> ScriptBuf {
    ScriptBuf::from_bytes(bytes.to_vec())
}

fn op_return_output(script_bytes: &[u8], value: u64) -> TxOutput {
    TxOutput::script_output(script(script_bytes), value)
}

fn policy_with_cap(max_size: usize, max_pushes: usize) -> OpReturnPolicy {
    OpReturnPolicy {
        max_size,
        max_pushes: NonZeroUsize::new(max_pushes),
    }
}
