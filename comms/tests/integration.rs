use std::io;

use bytes::BufMut;
use comms::{GradientBatch, ParameterSnapshot, Tensor};

fn snapshot() -> ParameterSnapshot {
    ParameterSnapshot::new(vec![
        Tensor::new(vec![2, 3], vec![0.5; 6]).unwrap(),
        Tensor::scalar(-1.),
    ])
}

#[test]
fn snapshot_round_trip() {
    let bytes = comms::encode(&snapshot()).unwrap();
    let decoded: ParameterSnapshot = comms::decode(&bytes).unwrap();
    assert_eq!(decoded, snapshot());
}

#[test]
fn layout_is_header_then_tensors() {
    let batch = GradientBatch::new(vec![Tensor::vector(vec![1., 2.])]);
    let bytes = comms::encode(&batch).unwrap();

    let mut expected = Vec::new();
    expected.put_u32(2); // gradient kind
    expected.put_u32(1); // tensor count
    expected.put_u32(1); // rank
    expected.put_u64(2); // dims
    expected.put_f32_ne(1.);
    expected.put_f32_ne(2.);

    assert_eq!(&bytes[..], &expected[..]);
}

#[test]
fn truncated_payloads_are_rejected() {
    let bytes = comms::encode(&snapshot()).unwrap();

    for len in [0, 3, 8, bytes.len() - 1] {
        let err = comms::decode::<ParameterSnapshot>(&bytes[..len]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData, "prefix of {len} bytes");
    }
}
