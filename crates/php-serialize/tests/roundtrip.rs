//! Encode/decode contract checks across the public API.

use std::cell::RefCell;
use std::rc::Rc;

use php_serialize::{dumps, loads, ErrorCategory, PhpArray, PhpValue};

#[test]
fn scalars_round_trip() {
    let values = [
        PhpValue::Null,
        PhpValue::Bool(true),
        PhpValue::Bool(false),
        PhpValue::Int(0),
        PhpValue::Int(-42),
        PhpValue::Int(i64::MAX),
        PhpValue::Float(0.1),
        PhpValue::Float(-1e300),
        PhpValue::Float(f64::INFINITY),
        PhpValue::from(""),
        PhpValue::from("héllo wörld"),
        PhpValue::from("quotes \" and ; inside"),
    ];
    for value in values {
        let encoded = dumps(&value).unwrap();
        assert_eq!(loads(&encoded).unwrap(), value, "{}", value);
    }
}

#[test]
fn nan_round_trips_as_nan() {
    let encoded = dumps(&PhpValue::Float(f64::NAN)).unwrap();
    assert_eq!(encoded, b"d:NAN;");
    assert!(matches!(loads(&encoded).unwrap(), PhpValue::Float(f) if f.is_nan()));
}

#[test]
fn string_keyed_mapping_round_trips() {
    let value = PhpValue::array([
        ("name", PhpValue::from("Alice")),
        ("age", PhpValue::Int(30)),
        ("tags", PhpValue::array([("primary", "admin")])),
        ("missing", PhpValue::Null),
    ]);
    let decoded = loads(&dumps(&value).unwrap()).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn mixed_key_mapping_round_trips_with_string_keys() {
    let value = PhpValue::array([
        (PhpValue::Bytes(b"raw".to_vec()), PhpValue::Int(1)),
        (PhpValue::Int(42), PhpValue::from("answer")),
        (PhpValue::Null, PhpValue::Bool(false)),
        (PhpValue::from("text"), PhpValue::Float(2.5)),
    ]);
    let encoded = dumps(&value).unwrap();
    assert_eq!(
        encoded,
        br#"a:4:{s:3:"raw";i:1;s:2:"42";s:6:"answer";s:0:"";b:0;s:4:"text";d:2.5;}"#
    );

    let expected = PhpValue::array([
        ("raw", PhpValue::Int(1)),
        ("42", PhpValue::from("answer")),
        ("", PhpValue::Bool(false)),
        ("text", PhpValue::Float(2.5)),
    ]);
    assert_eq!(loads(&encoded).unwrap(), expected);
    assert_eq!(dumps(&expected).unwrap(), encoded);
}

#[test]
fn scalar_keys_decode_as_written() {
    let decoded = loads(b"a:3:{N;s:1:\"n\";b:1;s:1:\"t\";d:0.5;s:1:\"h\";}").unwrap();
    let array = decoded.as_array().unwrap();
    assert_eq!(array.get(&PhpValue::Null), Some(&PhpValue::from("n")));
    assert_eq!(array.get(&PhpValue::Bool(true)), Some(&PhpValue::from("t")));
    assert_eq!(array.get(&PhpValue::Float(0.5)), Some(&PhpValue::from("h")));

    // Booleans and floats have no key form on the way back out
    assert_eq!(dumps(&decoded).unwrap_err().category(), ErrorCategory::Type);
}

#[test]
fn sequence_decodes_as_integer_keyed_mapping() {
    let value = PhpValue::list([PhpValue::Int(1), PhpValue::from("two")]);
    let decoded = loads(&dumps(&value).unwrap()).unwrap();

    let expected = PhpValue::array([(0, PhpValue::Int(1)), (1, PhpValue::from("two"))]);
    assert_eq!(decoded, expected);

    let list = decoded.as_array().unwrap().to_list().unwrap();
    assert_eq!(PhpValue::from(list), value);
}

#[test]
fn utf8_byte_length_is_used() {
    assert_eq!(dumps(&PhpValue::from("héllo")).unwrap(), "s:6:\"héllo\";".as_bytes());
}

#[test]
fn booleans_and_null() {
    assert_eq!(dumps(&PhpValue::Bool(true)).unwrap(), b"b:1;");
    assert_eq!(dumps(&PhpValue::Bool(false)).unwrap(), b"b:0;");
    assert_eq!(dumps(&PhpValue::Null).unwrap(), b"N;");
    assert_eq!(loads(b"N;").unwrap(), PhpValue::Null);
}

#[test]
fn nested_array_bytes_and_decoded_shape() {
    let value = PhpValue::array([("a", PhpValue::Int(1)), ("b", PhpValue::list([1, 2]))]);
    let encoded = dumps(&value).unwrap();
    assert_eq!(encoded, br#"a:2:{s:1:"a";i:1;s:1:"b";a:2:{i:0;i:1;i:1;i:2;}}"#);

    let decoded = loads(&encoded).unwrap();
    let top = decoded.as_array().unwrap();
    let keys: Vec<_> = top.keys().filter_map(PhpValue::as_str).collect();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(
        top.get_str("b"),
        Some(&PhpValue::array([(0, 1), (1, 2)]))
    );
}

#[test]
fn cycle_is_a_policy_error() {
    let array = Rc::new(RefCell::new(PhpArray::new()));
    let value = PhpValue::Array(Rc::clone(&array));
    let middle = PhpValue::list([value.clone()]);
    array.borrow_mut().insert("loop", middle);

    let err = dumps(&value).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Policy);

    array.borrow_mut().insert("loop", PhpValue::Null);
}

#[test]
fn object_opcodes_are_policy_errors() {
    for data in [
        &br#"O:8:"stdClass":0:{}"#[..],
        &b"O:not even close"[..],
        &b"C:3:\"Foo\":0:{}"[..],
    ] {
        assert_eq!(loads(data).unwrap_err().category(), ErrorCategory::Policy);
    }
}

#[test]
fn trailing_data_is_a_format_error() {
    let err = loads(b"N;N;").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Format);
    assert!(err.to_string().starts_with("extra data"));
}

#[test]
fn malformed_input_fails_the_same_way_every_time() {
    for data in [&b""[..], &b"Q;"[..], &b"i:1"[..], &b"s:3:\"ab\";"[..], &b"a:1:{i:0;}"[..]] {
        let first = loads(data).unwrap_err();
        let second = loads(data).unwrap_err();
        assert_eq!(first.kind, second.kind);
        assert_eq!(first.category(), ErrorCategory::Format);
    }
}

#[test]
fn empty_array() {
    assert_eq!(dumps(&PhpValue::from(PhpArray::new())).unwrap(), b"a:0:{}");
    assert_eq!(loads(b"a:0:{}").unwrap(), PhpValue::from(PhpArray::new()));
}
