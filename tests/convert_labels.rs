use std::fs;
use tempfile::TempDir;

use parklot::convert::{convert_dir, convert_file, write_classes_file, ClassTable};

const GOOD_DOCUMENT: &str = r#"{
    "version": "5.3.1",
    "imageHeight": 500,
    "imageWidth": 400,
    "imagePath": "lot_007.jpg",
    "shapes": [
        {
            "label": "occupied",
            "points": [[100.0, 50.0], [300.0, 250.0]],
            "shape_type": "rectangle"
        },
        {
            "label": "tree",
            "points": [[0.0, 0.0], [10.0, 10.0]],
            "shape_type": "rectangle"
        },
        {
            "label": "vacant",
            "points": [[400.0, 500.0], [0.0, 0.0]],
            "shape_type": "rectangle"
        }
    ]
}"#;

#[test]
fn converts_rectangles_and_skips_unknown_labels() {
    let dir = TempDir::new().expect("temp dir");
    let json_path = dir.path().join("lot_007.json");
    fs::write(&json_path, GOOD_DOCUMENT).expect("write json");

    let classes = ClassTable::parking_default();
    let boxes = convert_file(&json_path, dir.path(), &classes).expect("convert");
    assert_eq!(boxes, 2, "the unknown 'tree' label is skipped");

    let text = fs::read_to_string(dir.path().join("lot_007.txt")).expect("read output");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "0 0.500000 0.300000 0.500000 0.400000",
            "1 0.500000 0.500000 1.000000 1.000000",
        ]
    );
}

#[test]
fn malformed_document_fails_alone() {
    let json_dir = TempDir::new().expect("json dir");
    let out_dir = TempDir::new().expect("out dir");
    fs::write(json_dir.path().join("good.json"), GOOD_DOCUMENT).expect("write good");
    fs::write(json_dir.path().join("bad.json"), "{ not json").expect("write bad");
    fs::write(json_dir.path().join("notes.txt"), "ignored").expect("write notes");

    let classes = ClassTable::parking_default();
    let summary = convert_dir(json_dir.path(), out_dir.path(), &classes).expect("convert dir");
    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, 1);
    assert!(out_dir.path().join("good.txt").is_file());
    assert!(!out_dir.path().join("bad.txt").exists());
}

#[test]
fn empty_directory_is_a_warning_not_an_error() {
    let json_dir = TempDir::new().expect("json dir");
    let out_dir = TempDir::new().expect("out dir");
    let classes = ClassTable::parking_default();
    let summary = convert_dir(json_dir.path(), out_dir.path(), &classes).expect("convert dir");
    assert_eq!(summary.converted, 0);
    assert_eq!(summary.failed, 0);
}

#[test]
fn classes_file_lists_names_in_id_order() {
    let dir = TempDir::new().expect("temp dir");
    let classes = ClassTable::parking_default();
    write_classes_file(dir.path(), &classes).expect("write classes");
    let text = fs::read_to_string(dir.path().join("classes.txt")).expect("read classes");
    assert_eq!(text, "occupied\nvacant\n");
}
