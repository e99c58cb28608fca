use bser::{to_vec, Decoder, KeyOrdering, Object, Value};

const TAG_OBJECT: u8 = 0x01;
const TAG_STRING: u8 = 0x02;
const TAG_INT8: u8 = 0x03;
const TAG_INT16: u8 = 0x04;
const TAG_INT32: u8 = 0x05;
const TAG_INT64: u8 = 0x06;
const TAG_REAL: u8 = 0x07;

#[test]
fn frames_string_message() {
    let encoded = to_vec(&Value::from("hello world")).unwrap();
    assert_eq!(encoded, b"\x00\x01\x03\x0e\x02\x03\x0bhello world");
}

#[test]
fn integers_use_smallest_width() {
    // The encoder normalizes widths; only the decoder preserves them.
    let encoded = to_vec(&Value::Int64(0x23)).unwrap();
    assert_eq!(encoded, [0x00, 0x01, TAG_INT8, 0x02, TAG_INT8, 0x23]);

    let mut expected = vec![0x00, 0x01, TAG_INT8, 0x03, TAG_INT16];
    expected.extend_from_slice(&1976i16.to_ne_bytes());
    assert_eq!(to_vec(&Value::Int64(1976)).unwrap(), expected);

    let mut expected = vec![0x00, 0x01, TAG_INT8, 0x05, TAG_INT32];
    expected.extend_from_slice(&70_000i32.to_ne_bytes());
    assert_eq!(to_vec(&Value::Int64(70_000)).unwrap(), expected);

    let mut expected = vec![0x00, 0x01, TAG_INT8, 0x09, TAG_INT64];
    expected.extend_from_slice(&(1i64 << 40).to_ne_bytes());
    assert_eq!(to_vec(&Value::Int64(1 << 40)).unwrap(), expected);
}

#[test]
fn encodes_real_payload() {
    let mut expected = vec![0x00, 0x01, TAG_INT8, 0x09, TAG_REAL];
    expected.extend_from_slice(&0.123456789f64.to_ne_bytes());
    assert_eq!(to_vec(&Value::Real(0.123456789)).unwrap(), expected);
}

#[test]
fn envelope_length_widens_with_body() {
    let text = "x".repeat(200);
    let encoded = to_vec(&Value::from(text.as_str())).unwrap();

    // Body: string tag + int16 length prefix + 200 bytes.
    let mut expected = vec![0x00, 0x01, TAG_INT16];
    expected.extend_from_slice(&204i16.to_ne_bytes());
    expected.push(TAG_STRING);
    expected.push(TAG_INT16);
    expected.extend_from_slice(&200i16.to_ne_bytes());
    expected.extend_from_slice(text.as_bytes());
    assert_eq!(encoded, expected);
}

#[test]
fn objects_encode_in_iteration_order() {
    let mut object = Object::new();
    object.insert("foo".into(), Value::Int8(0x23));
    object.insert("bar".into(), Value::Int8(0x42));
    object.insert("baz".into(), Value::Int8(0xF0u8 as i8));

    let mut expected = vec![0x00, 0x01, TAG_INT8, 0x1B, TAG_OBJECT, TAG_INT8, 3];
    for (key, byte) in [("foo", 0x23u8), ("bar", 0x42), ("baz", 0xF0)] {
        expected.extend_from_slice(&[TAG_STRING, TAG_INT8, key.len() as u8]);
        expected.extend_from_slice(key.as_bytes());
        expected.extend_from_slice(&[TAG_INT8, byte]);
    }
    assert_eq!(to_vec(&Value::Object(object.clone())).unwrap(), expected);

    // Sorting first gives the canonical stream.
    object.sort_keys();
    let encoded = to_vec(&Value::Object(object)).unwrap();
    let decoded = bser::from_slice(&encoded).unwrap();
    let keys: Vec<_> = decoded.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["bar", "baz", "foo"]);
}

#[test]
fn encoded_messages_decode_back() {
    let mut child = Object::new();
    child.insert("name".into(), Value::from("John Doe"));
    child.insert("age".into(), Value::Int8(43));
    let mut root = Object::new();
    root.insert("user".into(), Value::Object(child));
    root.insert("paths".into(), Value::Array(vec![Value::from("a"), Value::from("b")]));
    root.insert("ok".into(), Value::Bool(true));
    root.insert("gen".into(), Value::Null);
    let tree = Value::Object(root);

    let encoded = to_vec(&tree).unwrap();
    assert_eq!(bser::from_slice(&encoded).unwrap(), tree);

    // Sorted decoding of the same bytes reorders the keys.
    let sorted = Decoder::new(KeyOrdering::Sorted).decode(&encoded[..]).unwrap();
    let keys: Vec<_> = sorted.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["gen", "ok", "paths", "user"]);
}
