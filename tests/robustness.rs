//! Property tests: the decoder must be total over arbitrary input, and
//! the codec must agree with itself on well-formed trees.

use bser::{from_slice, to_vec, Decoder, KeyOrdering, Value};
use proptest::prelude::*;

/// Smallest-width integer variant, mirroring what the encoder emits.
fn canonical_int(v: i64) -> Value {
    if let Ok(v) = i8::try_from(v) {
        Value::Int8(v)
    } else if let Ok(v) = i16::try_from(v) {
        Value::Int16(v)
    } else if let Ok(v) = i32::try_from(v) {
        Value::Int32(v)
    } else {
        Value::Int64(v)
    }
}

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(canonical_int),
        (-1.0e12..1.0e12f64).prop_map(Value::Real),
        "[a-z ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn encoded_trees_decode_to_themselves(value in value_strategy()) {
        let encoded = to_vec(&value).unwrap();
        let decoded = from_slice(&encoded).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn arbitrary_input_never_panics(input in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = from_slice(&input);
    }

    #[test]
    fn arbitrary_bodies_never_panic(body in prop::collection::vec(any::<u8>(), 0..127)) {
        let mut input = vec![0x00, 0x01, 0x03, body.len() as u8];
        input.extend_from_slice(&body);
        let _ = Decoder::new(KeyOrdering::Sorted).decode(&input[..]);
    }
}
