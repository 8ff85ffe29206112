use claria_fieldpath::{
    MAX_ARRAY_GAP, PathError, delete_field_path, get_field_value, has_field_path, set_field_value,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn report() -> serde_json::Value {
    json!({
        "client_name": "A. Client",
        "assessment_results": {
            "domains": {
                "articulation": { "strengths": [], "concerns": ["/r/ distortion"] }
            }
        },
        "goals": [
            { "title": "Produce /r/ in initial position", "objectives": ["words", "phrases"] },
            { "title": "Fluency", "objectives": [] }
        ],
        "notes": null
    })
}

#[test]
fn get_reads_keys_indices_and_bracket_segments() {
    let doc = report();
    assert_eq!(get_field_value(&doc, "client_name"), Some(&json!("A. Client")));
    assert_eq!(
        get_field_value(&doc, "assessment_results.domains.articulation.concerns.0"),
        Some(&json!("/r/ distortion"))
    );
    assert_eq!(get_field_value(&doc, "goals[1].title"), Some(&json!("Fluency")));
    assert_eq!(get_field_value(&doc, "goals.0.objectives[1]"), Some(&json!("phrases")));
}

#[test]
fn get_signals_absence_instead_of_failing() {
    let doc = report();
    assert_eq!(get_field_value(&doc, ""), None);
    assert_eq!(get_field_value(&doc, "a..b"), None);
    assert_eq!(get_field_value(&doc, "missing"), None);
    assert_eq!(get_field_value(&doc, "goals.5"), None);
    assert_eq!(get_field_value(&doc, "goals.title"), None);
    assert_eq!(get_field_value(&doc, "client_name.0"), None);
    assert_eq!(get_field_value(&doc, "notes.anything"), None);
    assert_eq!(get_field_value(&doc, "goals.-1"), None);
}

#[test]
fn stored_null_is_present() {
    let doc = report();
    assert_eq!(get_field_value(&doc, "notes"), Some(&json!(null)));
    assert!(has_field_path(&doc, "notes"));
    assert!(!has_field_path(&doc, "notes.text"));
}

#[test]
fn set_does_not_touch_the_input() {
    let doc = report();
    let before = doc.clone();

    let updated = set_field_value(&doc, "goals.1.title", json!("Stuttering modification")).unwrap();

    assert_eq!(doc, before);
    assert_eq!(
        get_field_value(&updated, "goals.1.title"),
        Some(&json!("Stuttering modification"))
    );
}

#[test]
fn set_creates_intermediate_containers_by_next_segment() {
    let updated = set_field_value(&json!({}), "history.onsets.0.age", json!(3)).unwrap();
    assert_eq!(updated, json!({ "history": { "onsets": [{ "age": 3 }] } }));

    let updated = set_field_value(&json!({ "a": null }), "a.b", json!(true)).unwrap();
    assert_eq!(updated, json!({ "a": { "b": true } }));
}

#[test]
fn set_pads_arrays_with_null() {
    let updated = set_field_value(&json!({ "items": ["a"] }), "items.3", json!("d")).unwrap();
    assert_eq!(updated, json!({ "items": ["a", null, null, "d"] }));

    let updated = set_field_value(&json!({}), "items[2].name", json!("c")).unwrap();
    assert_eq!(updated, json!({ "items": [null, null, { "name": "c" }] }));
}

#[test]
fn set_rejects_malformed_paths() {
    assert_eq!(set_field_value(&json!({}), "", json!(1)), Err(PathError::Empty));
    assert!(matches!(
        set_field_value(&json!({}), "a..b", json!(1)),
        Err(PathError::EmptySegment { .. })
    ));
    assert!(matches!(
        set_field_value(&json!({}), ".a", json!(1)),
        Err(PathError::EmptySegment { .. })
    ));
}

#[test]
fn set_rejects_wrong_shaped_containers() {
    let doc = report();

    match set_field_value(&doc, "client_name.0", json!("x")) {
        Err(PathError::TypeMismatch { at, expected, found, .. }) => {
            assert_eq!(at, "client_name");
            assert_eq!(expected, "array");
            assert_eq!(found, "string");
        }
        other => panic!("expected type mismatch, got {other:?}"),
    }

    assert!(matches!(
        set_field_value(&doc, "goals.title", json!("x")),
        Err(PathError::TypeMismatch { expected: "object", found: "array", .. })
    ));
    assert!(matches!(
        set_field_value(&doc, "client_name.first.last", json!("x")),
        Err(PathError::TypeMismatch { expected: "object", found: "string", .. })
    ));
}

#[test]
fn set_pads_arrays_up_to_the_gap_limit() {
    let doc = json!({ "a": [] });

    let at_limit = set_field_value(&doc, &format!("a.{MAX_ARRAY_GAP}"), json!(1)).unwrap();
    let items = at_limit["a"].as_array().unwrap();
    assert_eq!(items.len(), MAX_ARRAY_GAP + 1);
    assert!(items[..MAX_ARRAY_GAP].iter().all(|v| v.is_null()));

    let past = set_field_value(&doc, &format!("a[{}]", MAX_ARRAY_GAP + 1), json!(1));
    assert_eq!(
        past,
        Err(PathError::IndexOutOfRange {
            path: format!("a.{}", MAX_ARRAY_GAP + 1),
            index: MAX_ARRAY_GAP + 1,
            len: 0,
        })
    );
}

#[test]
fn huge_indices_are_rejected_without_allocating() {
    let doc = json!({ "a": [] });

    for path in ["a.18446744073709551615", "a.1000000000000", "b.1000000000000.c"] {
        assert!(
            matches!(
                set_field_value(&doc, path, json!(1)),
                Err(PathError::IndexOutOfRange { .. })
            ),
            "{path}"
        );
    }
    assert_eq!(get_field_value(&doc, "a.18446744073709551615"), None);
    assert_eq!(delete_field_path(&doc, "a.18446744073709551615"), doc);
}

#[test]
fn delete_removes_keys_and_splices_arrays() {
    let doc = report();

    let without_goal = delete_field_path(&doc, "goals.0");
    assert_eq!(get_field_value(&without_goal, "goals.0.title"), Some(&json!("Fluency")));
    assert_eq!(without_goal["goals"].as_array().map(Vec::len), Some(1));

    let without_name = delete_field_path(&doc, "client_name");
    assert!(!has_field_path(&without_name, "client_name"));
    assert_eq!(doc, report());
}

#[test]
fn delete_of_missing_path_is_an_unchanged_copy() {
    let doc = report();
    assert_eq!(delete_field_path(&doc, "nope.nothing"), doc);
    assert_eq!(delete_field_path(&doc, "goals.9"), doc);
    assert_eq!(delete_field_path(&doc, ""), doc);
    assert_eq!(delete_field_path(&doc, "client_name.x"), doc);
}

#[test]
fn delete_twice_equals_delete_once() {
    let doc = report();
    let once = delete_field_path(&doc, "assessment_results.domains.articulation.strengths");
    let twice = delete_field_path(&once, "assessment_results.domains.articulation.strengths");
    assert_eq!(once, twice);
}
