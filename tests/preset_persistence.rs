mod common;

use std::fs;

use mrex_nodetool::error::NodeToolError;
use mrex_nodetool::frame::{PidTriple, TractionProfile};
use mrex_nodetool::presets::PresetStore;

#[test]
fn missing_file_loads_empty() {
    let (_tmp, path) = common::preset_path();
    let presets = PresetStore::new(&path).load().expect("load");
    assert!(presets.is_empty());
    assert!(!path.exists());
}

#[test]
fn save_then_load_round_trips_across_instances() {
    let (_tmp, path) = common::preset_path();
    let profile = common::sample_profile();
    PresetStore::new(&path).save(&profile).expect("save");

    // A new store stands in for a process restart
    let reloaded = PresetStore::new(&path).load().expect("load");
    assert_eq!(reloaded.len(), 5);
    assert_eq!(reloaded["Mode4"], PidTriple::new("5", "", "1"));
    assert_eq!(TractionProfile::from_presets(&reloaded), profile);
}

#[test]
fn file_is_mode_keyed_with_pid_fields() {
    let (_tmp, path) = common::preset_path();
    PresetStore::new(&path).save(&common::sample_profile()).unwrap();
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let obj = raw.as_object().unwrap();
    let keys: Vec<&String> = obj.keys().collect();
    assert_eq!(keys, vec!["Mode1", "Mode2", "Mode3", "Mode4", "Mode5"]);
    assert_eq!(raw["Mode1"]["P"], "1");
    assert_eq!(raw["Mode1"]["I"], "2");
    assert_eq!(raw["Mode1"]["D"], "3");
    assert_eq!(raw["Mode3"]["P"], "");
}

#[test]
fn save_overwrites_instead_of_merging() {
    let (_tmp, path) = common::preset_path();
    fs::write(&path, r#"{"Mode1":{"P":"8","I":"8","D":"8"},"Legacy":{"P":"1","I":"1","D":"1"}}"#).unwrap();
    let store = PresetStore::new(&path);
    store.save(&TractionProfile::default()).unwrap();
    let presets = store.load().unwrap();
    assert!(!presets.contains_key("Legacy"));
    assert_eq!(presets["Mode1"], PidTriple::default());
}

#[test]
fn garbage_file_is_reported_as_corrupt() {
    let (_tmp, path) = common::preset_path();
    fs::write(&path, "{ not json").unwrap();
    match PresetStore::new(&path).load() {
        Err(NodeToolError::CorruptPresetFile { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected CorruptPresetFile, got {:?}", other),
    }
}

#[test]
fn non_utf8_file_is_reported_as_corrupt() {
    let (_tmp, path) = common::preset_path();
    fs::write(&path, [0xff, 0xfe, b'{', b'}']).unwrap();
    assert!(matches!(
        PresetStore::new(&path).load(),
        Err(NodeToolError::CorruptPresetFile { .. })
    ));
}

#[test]
fn leading_nuls_are_skipped() {
    let (_tmp, path) = common::preset_path();
    fs::write(&path, b"\0\0{\"Mode5\":{\"P\":\"2\",\"I\":\"\",\"D\":\"\"}}").unwrap();
    let presets = PresetStore::new(&path).load().unwrap();
    assert_eq!(presets["Mode5"], PidTriple::new("2", "", ""));
}

#[test]
fn wrong_shape_is_reported_as_corrupt() {
    let (_tmp, path) = common::preset_path();
    fs::write(&path, r#"["Mode1", "Mode2"]"#).unwrap();
    assert!(matches!(
        PresetStore::new(&path).load(),
        Err(NodeToolError::CorruptPresetFile { .. })
    ));
}

#[test]
fn interrupted_save_leaves_previous_file_intact() {
    let (tmp, path) = common::preset_path();
    let store = PresetStore::new(&path);
    store.save(&common::sample_profile()).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    // A crash mid-save leaves only a half-written temp sibling behind
    let partial = tmp.path().join(format!(".pid_presets.json.tmp-{}-0", std::process::id()));
    fs::write(&partial, r#"{"Mode1": {"P": "#).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(TractionProfile::from_presets(&store.load().unwrap()), common::sample_profile());

    // The next save steps around the stale temp file and lands whole
    let mut updated = common::sample_profile();
    updated.set_mode(2, PidTriple::new("7", "7", "7"));
    store.save(&updated).unwrap();
    assert_eq!(TractionProfile::from_presets(&store.load().unwrap()), updated);
}

#[test]
fn successful_save_clears_stale_temp_files() {
    let (tmp, path) = common::preset_path();
    let stale = [
        tmp.path().join(".pid_presets.json.tmp-1-0"),
        tmp.path().join(".pid_presets.json.tmp-4242-3"),
    ];
    for leftover in &stale {
        fs::write(leftover, "{\"Mode1\"").unwrap();
    }
    let unrelated = tmp.path().join(".other.json.tmp-1-0");
    fs::write(&unrelated, "keep").unwrap();

    PresetStore::new(&path).save(&common::sample_profile()).unwrap();

    for leftover in &stale {
        assert!(!leftover.exists(), "{} should be removed", leftover.display());
    }
    assert!(unrelated.exists());
    assert!(path.exists());
}

#[test]
fn incomplete_profile_is_not_saved() {
    let (_tmp, path) = common::preset_path();
    let short = TractionProfile::new(vec![PidTriple::default(); 3]);
    assert!(matches!(
        PresetStore::new(&path).save(&short),
        Err(NodeToolError::MalformedProfile { found: 3, .. })
    ));
    assert!(!path.exists());
}
