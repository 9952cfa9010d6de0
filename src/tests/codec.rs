use super::{deserialize, serialize, try_deserialize};
use crate::interval::Interval;
use crate::mark_store::MarkStore;
use rstest::rstest;

fn sample_store() -> MarkStore {
    let mut store = MarkStore::new();
    store.add("src/main.rs", Interval::new(0, 4));
    store.add("src/main.rs", Interval::new(10, 12));
    store.add("docs/guide.md", Interval::new(3, 3));
    store.get_or_create("empty.txt");
    store
}

#[test]
fn test_serialize_shape() {
    let mut store = MarkStore::new();
    store.add("a.rs", Interval::new(2, 8));

    let json = serialize(&store).unwrap();

    assert_eq!(json, r#"{"a.rs":{"array":[{"start":2,"end":8}]}}"#);
}

#[test]
fn test_empty_entries_are_written() {
    let mut store = MarkStore::new();
    store.get_or_create("unmarked.rs");

    let json = serialize(&store).unwrap();

    assert_eq!(json, r#"{"unmarked.rs":{"array":[]}}"#);
}

#[test]
fn test_round_trip_preserves_marks() {
    let store = sample_store();
    let restored = deserialize(&serialize(&store).unwrap());

    assert_eq!(restored, store);
    for (key, set) in store.iter() {
        let other = restored.get(key).unwrap();
        assert_eq!(other.covered_lines(), set.covered_lines(), "{key}");
    }
}

#[test]
fn test_load_does_not_merge() {
    let json = r#"{"a.rs":{"array":[{"start":5,"end":9},{"start":0,"end":4}]}}"#;

    let store = try_deserialize(json).unwrap();

    let marks: Vec<_> = store.get("a.rs").unwrap().iter().copied().collect();
    assert_eq!(marks, vec![Interval::new(0, 4), Interval::new(5, 9)]);
}

#[test]
fn test_blank_input_is_empty_store() {
    assert!(try_deserialize("").unwrap().is_empty());
    assert!(try_deserialize("  \n").unwrap().is_empty());
}

#[rstest]
#[case::not_json("this is not json")]
#[case::truncated(r#"{"a.rs":{"array":[{"start":1,"#)]
#[case::null("null")]
#[case::top_level_array("[1, 2, 3]")]
#[case::missing_array_field(r#"{"a.rs":{"set":[]}}"#)]
#[case::string_bounds(r#"{"a.rs":{"array":[{"start":"1","end":"2"}]}}"#)]
#[case::negative_line(r#"{"a.rs":{"array":[{"start":-1,"end":2}]}}"#)]
fn test_corrupt_input_is_empty_store(#[case] text: &str) {
    assert!(try_deserialize(text).is_err());
    assert!(deserialize(text).is_empty());
}
