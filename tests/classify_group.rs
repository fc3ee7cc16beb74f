use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use sysreport::{Classifier, GroupKey, TestKind, group_files, scan_csv_files};

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn prbs_csv() -> &'static str {
    "host,test_type,lane,ber\nh1,TestType.SERDES_PRBS,0,1e-12\nh1,TestType.SERDES_PRBS,1,2e-12\n"
}

fn data_csv() -> &'static str {
    "host,test_type,packets,errors\nh1,TestType.SIMPLE_PACKET,1000,0\n"
}

fn classify_all(dir: &Path) -> Vec<sysreport::FileMetadata> {
    let classifier = Classifier::new();
    scan_csv_files(dir)
        .iter()
        .map(|path| classifier.classify(path))
        .collect()
}

#[test]
fn one_system_two_kinds_forms_one_bucket() {
    let temp = TempDir::new().unwrap();
    write_csv(temp.path(), "SYS1_erisc_v1_7_103_prbs_test.csv", prbs_csv());
    write_csv(temp.path(), "SYS1_erisc_v1_7_103_data_test.csv", data_csv());

    let buckets = group_files(classify_all(temp.path()));
    assert_eq!(buckets.len(), 1);

    let key = GroupKey {
        hostname: "h1".to_string(),
        firmware: "erisc_v1_7_103".to_string(),
    };
    let bucket = buckets.get(&key).unwrap();
    assert_eq!(bucket.files(TestKind::Prbs).len(), 1);
    assert_eq!(bucket.files(TestKind::Data).len(), 1);
}

#[test]
fn specific_firmware_pattern_beats_the_general_one_end_to_end() {
    let temp = TempDir::new().unwrap();
    write_csv(temp.path(), "SYS1_erisc_v1_7_103_prbs_test.csv", prbs_csv());

    let metadata = classify_all(temp.path());
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata[0].firmware.as_deref(), Some("erisc_v1_7_103"));
}

#[test]
fn unclassifiable_file_is_dropped_without_affecting_others() {
    let temp = TempDir::new().unwrap();
    write_csv(temp.path(), "SYS1_erisc_v1_7_103_prbs_test.csv", prbs_csv());
    // Unrecognized test_type and no filename marker.
    write_csv(
        temp.path(),
        "SYS1_erisc_v1_7_103_mystery.csv",
        "host,test_type\nh1,TestType.BOGUS\n",
    );
    // No firmware version anywhere.
    write_csv(temp.path(), "SYS2_prbs_test.csv", prbs_csv());

    let buckets = group_files(classify_all(temp.path()));
    assert_eq!(buckets.len(), 1);
    let key = GroupKey {
        hostname: "h1".to_string(),
        firmware: "erisc_v1_7_103".to_string(),
    };
    assert_eq!(buckets.get(&key).unwrap().files(TestKind::Prbs).len(), 1);
}

#[test]
fn files_without_host_or_unreadable_bodies_never_crash_grouping() {
    let temp = TempDir::new().unwrap();
    write_csv(
        temp.path(),
        "SYS1_erisc_v1_7_103_prbs_test.csv",
        "lane,ber\n0,1e-12\n",
    );
    // Ragged rows make the csv reader fail partway through the probe.
    write_csv(
        temp.path(),
        "SYS2_erisc_v1_7_103_data_test.csv",
        "host,test_type\n\"unterminated\n",
    );

    let metadata = classify_all(temp.path());
    assert!(metadata.iter().all(|m| m.hostname.is_none()));
    assert!(group_files(metadata).is_empty());
}

#[test]
fn grouping_twice_yields_identical_buckets() {
    let temp = TempDir::new().unwrap();
    write_csv(temp.path(), "SYS1_erisc_v1_7_103_prbs_test.csv", prbs_csv());
    write_csv(temp.path(), "SYS1_erisc_v1_7_104_prbs_test.csv", prbs_csv());
    write_csv(temp.path(), "SYS1_erisc_v1_7_103_b_prbs_test.csv", prbs_csv());

    let first = group_files(classify_all(temp.path()));
    let second = group_files(classify_all(temp.path()));

    let first_keys: Vec<_> = first.keys().cloned().collect();
    let second_keys: Vec<_> = second.keys().cloned().collect();
    assert_eq!(first_keys, second_keys);
    for key in &first_keys {
        assert_eq!(
            first.get(key).unwrap().files(TestKind::Prbs),
            second.get(key).unwrap().files(TestKind::Prbs)
        );
    }
}
