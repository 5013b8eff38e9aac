use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use envoverlay::{ConfigLoader, MergeError, Overlay, OverlayError, overlay_from, templates_for};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Overlay)]
#[serde(default)]
struct A {
    int: i64,
    intptr: Option<i64>,
    strings: Vec<String>,
    time: DateTime<Utc>,

    embedded: Embedded,

    map: HashMap<String, B>,
    mapptr: HashMap<String, Box<B>>,
    mapprim: HashMap<String, i64>,
    mapprimptr: HashMap<String, Option<i64>>,

    slice: Vec<B>,
    sliceptr: Vec<Option<B>>,

    r#struct: B,
    structptr: Option<Box<B>>,
    #[serde(skip)]
    ignored: Option<B>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Overlay)]
#[serde(default)]
struct Embedded {
    int: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Overlay)]
#[serde(default)]
struct B {
    float: f64,
}

fn b(float: f64) -> B {
    B { float }
}

fn date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2009, 11, 10, 23, 0, 0).unwrap()
}

fn full_listing(prefix: &str) -> Vec<String> {
    [
        ("INT", "5"),
        ("INTPTR", "5"),
        ("STRINGS", "one,two,three"),
        ("TIME", "2009-11-10T23:00:00Z"),
        ("EMBEDDED_INT", "6"),
        ("MAP_ONE_FLOAT", "4.5"),
        ("MAP_TWO_FLOAT", "5.5"),
        ("MAPPTR_ONE_FLOAT", "6.5"),
        ("MAPPTR_TWO_FLOAT", "7.5"),
        ("MAPPRIM_ONE", "1"),
        ("MAPPRIM_TWO", "2"),
        ("MAPPRIMPTR_ONE", "3"),
        ("MAPPRIMPTR_TWO", "4"),
        ("SLICE_0_FLOAT", "8.5"),
        ("SLICE_1_FLOAT", "9.5"),
        ("SLICEPTR_0_FLOAT", "10.5"),
        ("SLICEPTR_1_FLOAT", "11.5"),
        ("STRUCT_FLOAT", "12.5"),
        ("STRUCTPTR_FLOAT", "13.5"),
        ("-_FLOAT", "13.5"),
        ("IGNORED_FLOAT", "14.5"),
    ]
    .iter()
    .map(|(key, value)| format!("{prefix}_{key}={value}"))
    .collect()
}

#[test]
fn test_templates_cover_every_field() {
    let templates: Vec<String> = templates_for::<A>()
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();

    for required in [
        "int",
        "intptr",
        "strings",
        "time",
        "embedded.int",
        "map.*.float",
        "mapptr.*.float",
        "mapprim.*",
        "mapprimptr.*",
        "slice.#.float",
        "sliceptr.#.float",
        "struct.float",
        "structptr.float",
    ] {
        assert!(
            templates.iter().any(|t| t == required),
            "missing template {required}: {templates:?}"
        );
    }
    assert!(!templates.iter().any(|t| t.starts_with("ignored")));
}

#[test]
fn test_env_only_builds_whole_graph() {
    let mut got = A::default();
    overlay_from(full_listing("TEST3"), "test3", &mut got).unwrap();

    let want = A {
        int: 5,
        intptr: Some(5),
        strings: vec!["one".into(), "two".into(), "three".into()],
        time: date(),
        embedded: Embedded { int: 6 },
        map: HashMap::from([("one".into(), b(4.5)), ("two".into(), b(5.5))]),
        mapptr: HashMap::from([
            ("one".into(), Box::new(b(6.5))),
            ("two".into(), Box::new(b(7.5))),
        ]),
        mapprim: HashMap::from([("one".into(), 1), ("two".into(), 2)]),
        mapprimptr: HashMap::from([("one".into(), Some(3)), ("two".into(), Some(4))]),
        slice: vec![b(8.5), b(9.5)],
        sliceptr: vec![Some(b(10.5)), Some(b(11.5))],
        r#struct: b(12.5),
        structptr: Some(Box::new(b(13.5))),
        ignored: None,
    };

    assert_eq!(got, want);
}

#[test]
fn test_other_prefixes_are_ignored() {
    let mut got = A::default();
    let mut env = full_listing("OTHER");
    env.push("TEST4_INT=9".to_string());

    overlay_from(env, "test4", &mut got).unwrap();
    assert_eq!(
        got,
        A {
            int: 9,
            ..Default::default()
        }
    );
}

#[test]
fn test_repeated_container_paths_share_one_element() {
    let mut got = A::default();
    overlay_from(
        ["T_MAPPTR_ONE_FLOAT=1.5", "T_STRUCTPTR_FLOAT=2.5", "T_SLICEPTR_0_FLOAT=3.5"],
        "t",
        &mut got,
    )
    .unwrap();
    overlay_from(
        ["T_MAPPTR_ONE_FLOAT=4.5", "T_STRUCTPTR_FLOAT=5.5", "T_SLICEPTR_0_FLOAT=6.5"],
        "t",
        &mut got,
    )
    .unwrap();

    assert_eq!(got.mapptr.len(), 1);
    assert_eq!(got.mapptr["one"].float, 4.5);
    assert_eq!(got.structptr, Some(Box::new(b(5.5))));
    assert_eq!(got.sliceptr, vec![Some(b(6.5))]);
}

#[test]
fn test_sequences_grow_to_the_highest_index() {
    let mut got = A {
        slice: vec![b(1.0)],
        ..Default::default()
    };
    overlay_from(["T_SLICE_3_FLOAT=4.0", "T_SLICEPTR_2_FLOAT=3.0"], "t", &mut got).unwrap();

    assert_eq!(got.slice, vec![b(1.0), b(0.0), b(0.0), b(4.0)]);
    assert_eq!(got.sliceptr, vec![None, None, Some(b(3.0))]);
}

#[test]
fn test_sibling_map_entries_are_order_independent() {
    let one = "T_MAP_ONE_FLOAT=1.5";
    let two = "T_MAP_TWO_FLOAT=2.5";

    let mut forward = A::default();
    overlay_from([one], "t", &mut forward).unwrap();
    overlay_from([two], "t", &mut forward).unwrap();

    let mut backward = A::default();
    overlay_from([two], "t", &mut backward).unwrap();
    overlay_from([one], "t", &mut backward).unwrap();

    assert_eq!(forward, backward);
    assert_eq!(forward.map.len(), 2);
    assert_eq!(forward.map["one"], b(1.5));
    assert_eq!(forward.map["two"], b(2.5));
}

#[test]
fn test_huge_sequence_index_is_an_error() {
    let mut got = A::default();
    let err = overlay_from(["T_SLICE_18446744073709551615_FLOAT=1"], "t", &mut got).unwrap_err();

    match err {
        OverlayError::Assignment { path, source } => {
            assert_eq!(path, "slice.18446744073709551615.float");
            assert!(matches!(source, MergeError::IndexOutOfRange { .. }));
        }
        other => panic!("Expected assignment error, got {other:?}"),
    }
    assert!(got.slice.is_empty());
}

#[test]
fn test_bad_value_keeps_prior_value() {
    let mut got = A {
        int: 7,
        ..Default::default()
    };
    let err = overlay_from(["T_INT=seven"], "t", &mut got).unwrap_err();

    match err {
        OverlayError::Assignment { path, source } => {
            assert_eq!(path, "int");
            assert!(matches!(source, MergeError::TypeMismatch { .. }));
        }
        other => panic!("Expected assignment error, got {other:?}"),
    }
    assert_eq!(got.int, 7);
}

#[test]
fn test_bad_nested_value_creates_nothing() {
    let mut got = A::default();
    assert!(overlay_from(["T_MAPPTR_ONE_FLOAT=nope"], "t", &mut got).is_err());
    assert!(got.mapptr.is_empty());

    assert!(overlay_from(["T_STRUCTPTR_FLOAT=nope"], "t", &mut got).is_err());
    assert_eq!(got.structptr, None);
}

#[test]
fn test_unknown_field_on_direct_apply() {
    let mut got = A::default();
    assert!(matches!(
        got.apply_path(&["nope"], "1"),
        Err(MergeError::UnknownField { field, .. }) if field == "nope"
    ));
    assert!(matches!(
        got.apply_path(&["ignored", "float"], "1"),
        Err(MergeError::UnknownField { .. })
    ));
}

#[test]
fn test_non_record_roots() {
    let mut map: HashMap<String, i64> = HashMap::new();
    overlay_from(["T_ONE=1"], "t", &mut map).unwrap();
    assert_eq!(map["one"], 1);

    let mut list: Vec<B> = Vec::new();
    overlay_from(["T_0_FLOAT=1.0"], "t", &mut list).unwrap();
    assert_eq!(list, vec![b(1.0)]);

    let mut scalar = 0i64;
    assert!(matches!(
        overlay_from(["T=1"], "t", &mut scalar),
        Err(OverlayError::UnsupportedRootShape { .. })
    ));
}

#[cfg(feature = "toml-config")]
mod file_and_env {
    use std::io::Write;

    use super::*;

    const ONE_TOML: &str = r#"
int = 5

[map.one]
float = 4.5

[map.two]
float = 4.5

[mapptr.one]
float = 4.5

[mapptr.two]
float = 4.5

[mapprim]
one = 1
two = 1

[mapprimptr]
one = 1
two = 1

[[slice]]
float = 4.5

[[slice]]
float = 4.5
"#;

    fn one_toml() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(ONE_TOML.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_values_without_env() {
        let file = one_toml();
        let got: A = ConfigLoader::new("test0")
            .file(file.path())
            .env_snapshot(Vec::<String>::new())
            .load()
            .unwrap();

        assert_eq!(got.int, 5);
        assert_eq!(got.map["two"], b(4.5));
        assert_eq!(got.mapptr["one"].float, 4.5);
        assert_eq!(got.mapprim["two"], 1);
        assert_eq!(got.mapprimptr["one"], Some(1));
        assert_eq!(got.slice, vec![b(4.5), b(4.5)]);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let file = one_toml();
        let got: A = ConfigLoader::new("test1")
            .file(file.path())
            .env_snapshot([
                "TEST1_INT=6",
                "TEST1_MAP_ONE_FLOAT=5.5",
                "TEST1_MAPPTR_ONE_FLOAT=5.5",
                "TEST1_MAPPRIM_ONE=2",
                "TEST1_MAPPRIMPTR_ONE=2",
                "TEST1_SLICE_0_FLOAT=5.5",
            ])
            .load()
            .unwrap();

        assert_eq!(got.int, 6);
        assert_eq!(got.map["one"], b(5.5));
        assert_eq!(got.map["two"], b(4.5));
        assert_eq!(got.mapptr["one"].float, 5.5);
        assert_eq!(got.mapptr["two"].float, 4.5);
        assert_eq!(got.mapprim["one"], 2);
        assert_eq!(got.mapprim["two"], 1);
        assert_eq!(got.mapprimptr["one"], Some(2));
        assert_eq!(got.mapprimptr["two"], Some(1));
        assert_eq!(got.slice, vec![b(5.5), b(4.5)]);
    }

    #[test]
    fn test_missing_file_falls_back_to_env() {
        let dir = tempfile::tempdir().unwrap();
        let got: A = envoverlay::ConfigLoader::new("test2")
            .file(dir.path().join("two.toml"))
            .env_snapshot(full_listing("TEST2"))
            .load()
            .unwrap();

        assert_eq!(got.embedded.int, 6);
        assert_eq!(got.time, date());
        assert_eq!(got.sliceptr, vec![Some(b(10.5)), Some(b(11.5))]);
    }
}
