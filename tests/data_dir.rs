use std::fs;

use tokenbudget::bpe::{MERGES_FILE, TOKENS_FILE};
use tokenbudget::{BpeEncoder, Error};

#[test]
fn loads_resources_from_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(TOKENS_FILE), "a\0b\0ab\0\0c\0").unwrap();
    fs::write(dir.path().join(MERGES_FILE), "#version: 0.2\na b\n").unwrap();

    let enc = BpeEncoder::from_dir(dir.path()).unwrap();
    assert_eq!(enc.vocab().len(), 5);
    assert_eq!(enc.merges().len(), 1);
    assert_eq!(enc.encode("abc"), vec![2, 4]);
    assert_eq!(enc.decode(&[2, 3, 4]).unwrap(), "abc");
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(TOKENS_FILE), "a\0").unwrap();

    match BpeEncoder::from_dir(dir.path()) {
        Err(Error::Io { path, .. }) => assert_eq!(path, dir.path().join(MERGES_FILE)),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn malformed_merge_line_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(TOKENS_FILE), "a\0b\0").unwrap();
    fs::write(dir.path().join(MERGES_FILE), "#version: 0.2\na b\nab\n").unwrap();

    let err = BpeEncoder::from_dir(dir.path()).unwrap_err();
    assert_eq!(
        err,
        Error::MalformedMerge {
            line: 3,
            text: "ab".to_string()
        }
    );
}
