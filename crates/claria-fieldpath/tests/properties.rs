use claria_fieldpath::{
    MAX_ARRAY_GAP, PathError, delete_field_path, get_field_value, set_field_value,
};
use proptest::prelude::*;
use serde_json::{Value, json};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(Value::String),
    ]
}

fn document() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn index() -> impl Strategy<Value = usize> {
    prop_oneof![
        4 => 0usize..4,
        1 => 0usize..=2 * MAX_ARRAY_GAP,
    ]
}

fn path() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        "[a-c]".boxed(),
        index().prop_map(|i| i.to_string()).boxed(),
        ("[a-c]", index()).prop_map(|(key, i)| format!("{key}[{i}]")).boxed(),
    ];
    prop::collection::vec(segment, 1..4).prop_map(|segments| segments.join("."))
}

fn keys() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-c]", 1..4)
}

proptest! {
    #[test]
    fn set_then_get_round_trips(doc in document(), path in path(), value in document()) {
        if let Ok(updated) = set_field_value(&doc, &path, value.clone()) {
            prop_assert_eq!(get_field_value(&updated, &path), Some(&value));
        }
    }

    #[test]
    fn set_never_mutates_input(doc in document(), path in path(), value in leaf()) {
        let before = doc.clone();
        let _ = set_field_value(&doc, &path, value);
        prop_assert_eq!(doc, before);
    }

    #[test]
    fn object_paths_always_succeed_on_objects(keys in keys(), value in leaf()) {
        let path = keys.join(".");
        let updated = set_field_value(&json!({}), &path, value.clone());
        prop_assert!(updated.is_ok());
        let updated = updated.unwrap();
        prop_assert_eq!(get_field_value(&updated, &path), Some(&value));
    }

    // Key-only: deleting an array index splices, so a second delete removes
    // the element that shifted into its place.
    #[test]
    fn delete_of_key_path_is_idempotent(doc in document(), keys in keys()) {
        let path = keys.join(".");
        let once = delete_field_path(&doc, &path);
        prop_assert_eq!(delete_field_path(&once, &path), once.clone());
    }

    #[test]
    fn any_index_either_writes_or_is_out_of_range(len in 0usize..8, i in any::<usize>()) {
        let doc = json!({ "a": vec![Value::Null; len] });
        match set_field_value(&doc, &format!("a[{i}]"), json!(true)) {
            Ok(updated) => {
                prop_assert!(i <= len + MAX_ARRAY_GAP);
                prop_assert_eq!(updated["a"][i].clone(), json!(true));
            }
            Err(err) => {
                prop_assert!(i > len + MAX_ARRAY_GAP);
                let is_range = matches!(err, PathError::IndexOutOfRange { .. });
                prop_assert!(is_range);
            }
        }
    }
}
