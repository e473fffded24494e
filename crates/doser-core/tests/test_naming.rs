use doser_core::error::DoserError;
use doser_core::naming::{
    get_tag, pair_names, parse_fname, remove_tag, replace_tag, select_video_pairs, NameFormat,
    NamingConfig, TagValue,
};

fn format<'a>(fname_format: &'a str) -> NameFormat<'a> {
    NameFormat {
        fname_format,
        sampleinfo_format: "mw-backbone",
        fname_split: "_",
        sample_split: "-",
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tag parsing
// ---------------------------------------------------------------------------

#[test]
fn test_parse_full_name() {
    let tags = parse_fname("20210929_6M-PEO_fps-25k_1", &format("date_sampleinfo_fps_run")).unwrap();

    assert_eq!(tags.get("date"), Some(&TagValue::Text("20210929".into())));
    assert_eq!(tags.get("sample"), Some(&TagValue::Text("6M-PEO".into())));
    assert_eq!(tags.get("mw"), Some(&TagValue::Text("6M".into())));
    assert_eq!(tags.get("backbone"), Some(&TagValue::Text("PEO".into())));
    assert_eq!(tags.fps(), Some(25_000.0));
    assert_eq!(tags.get("run"), Some(&TagValue::Number(1.0)));
}

#[test]
fn test_parse_keeps_format_order() {
    let tags = parse_fname("20210929_6M-PEO_fps-25k_1", &format("date_sampleinfo_fps_run")).unwrap();
    let keys: Vec<&str> = tags.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["date", "sample", "mw", "backbone", "fps", "run"]);
}

#[test]
fn test_parse_fps_without_k() {
    let tags = parse_fname("500fps_2", &format("fps_run")).unwrap();
    assert_eq!(tags.fps(), Some(500.0));
}

#[test]
fn test_parse_too_few_tokens() {
    let err = parse_fname("20210929_6M-PEO", &format("date_sampleinfo_fps_run")).unwrap_err();
    assert!(matches!(err, DoserError::FilenameFormat { .. }));
}

#[test]
fn test_parse_fps_without_digits() {
    assert!(parse_fname("fast_1", &format("fps_run")).is_err());
}

// ---------------------------------------------------------------------------
// Tag helpers
// ---------------------------------------------------------------------------

#[test]
fn test_remove_get_replace_tag() {
    let format = "date_sampleinfo_fps_run_vtype";
    let name = "20210929_6M-PEO_fps-25k_1_bg";
    assert_eq!(remove_tag(name, format, "vtype", "_"), "20210929_6M-PEO_fps-25k_1");
    assert_eq!(get_tag(name, format, "vtype", "_"), vec!["bg".to_string()]);
    assert_eq!(
        replace_tag(name, format, "vtype", "exp", "_"),
        "20210929_6M-PEO_fps-25k_1_exp"
    );
}

#[test]
fn test_remove_absent_tag_keeps_name() {
    assert_eq!(remove_tag("a_b", "date_run", "vtype", "_"), "a_b");
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

#[test]
fn test_pairs_by_base_name() {
    let config = NamingConfig::default();
    let pairs = pair_names(
        &names(&[
            "20210929_6M-PEO_fps-25k_2_exp",
            "20210929_6M-PEO_fps-25k_1_bg",
            "20210929_6M-PEO_fps-25k_1_exp",
            "20210929_6M-PEO_fps-25k_2_bg",
            "notes",
        ]),
        &config,
    );
    assert_eq!(
        pairs,
        vec![
            (
                "20210929_6M-PEO_fps-25k_1".to_string(),
                "20210929_6M-PEO_fps-25k_1_exp".to_string(),
                "20210929_6M-PEO_fps-25k_1_bg".to_string(),
            ),
            (
                "20210929_6M-PEO_fps-25k_2".to_string(),
                "20210929_6M-PEO_fps-25k_2_exp".to_string(),
                "20210929_6M-PEO_fps-25k_2_bg".to_string(),
            ),
        ]
    );
}

#[test]
fn test_experiment_without_background_is_skipped() {
    let pairs = pair_names(&names(&["20210929_6M-PEO_fps-25k_1_exp"]), &NamingConfig::default());
    assert!(pairs.is_empty());
}

#[test]
fn test_several_backgrounds_first_after_sort() {
    let config = NamingConfig {
        fname_format: "date_sampleinfo_fps_run_vtype_remove".into(),
        ..NamingConfig::default()
    };
    let pairs = pair_names(
        &names(&[
            "20210929_6M-PEO_fps-25k_1_bg_0932",
            "20210929_6M-PEO_fps-25k_1_bg_0830",
            "20210929_6M-PEO_fps-25k_1_exp_0900",
        ]),
        &config,
    );
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].0, "20210929_6M-PEO_fps-25k_1");
    assert_eq!(pairs[0].2, "20210929_6M-PEO_fps-25k_1_bg_0830");
}

#[test]
fn test_one_background_for_all() {
    let config = NamingConfig {
        one_background: true,
        ..NamingConfig::default()
    };
    let pairs = pair_names(
        &names(&[
            "20210929_6M-PEO_fps-25k_1_exp",
            "20210929_6M-PEO_fps-25k_2_exp",
            "20210929_6M-PEO_fps-25k_0_bg",
        ]),
        &config,
    );
    assert_eq!(pairs.len(), 2);
    assert!(pairs.iter().all(|(_, _, bg)| bg == "20210929_6M-PEO_fps-25k_0_bg"));
}

#[test]
fn test_empty_experiment_tag() {
    let config = NamingConfig {
        experiment_tag: String::new(),
        ..NamingConfig::default()
    };
    let pairs = pair_names(
        &names(&["20210929_6M-PEO_fps-25k_1", "20210929_6M-PEO_fps-25k_1_bg"]),
        &config,
    );
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].1, "20210929_6M-PEO_fps-25k_1");
}

#[test]
fn test_select_video_pairs_from_folder() {
    let tmp = tempfile::tempdir().unwrap();
    for name in [
        "20210929_6M-PEO_fps-25k_1_exp",
        "20210929_6M-PEO_fps-25k_1_bg",
        "20210929_6M-PEO_fps-25k_2_exp",
    ] {
        std::fs::create_dir(tmp.path().join(name)).unwrap();
    }
    std::fs::write(tmp.path().join("20210929_6M-PEO_fps-25k_2_bg.ser"), b"").unwrap();
    std::fs::write(tmp.path().join("readme.txt"), b"").unwrap();

    let pairs = select_video_pairs(tmp.path(), &NamingConfig::default()).unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].experiment, tmp.path().join("20210929_6M-PEO_fps-25k_1_exp"));
    assert_eq!(pairs[0].background, tmp.path().join("20210929_6M-PEO_fps-25k_1_bg"));
    assert_eq!(pairs[1].background, tmp.path().join("20210929_6M-PEO_fps-25k_2_bg.ser"));
}
