use tempfile::TempDir;

mod common;

#[test]
fn e2e_seed_twice_keeps_one_of_each() {
    let data_dir = TempDir::new().expect("temp dir");
    let uri = common::sqlite_uri(data_dir.path());

    let first = common::base_cmd(&uri).arg("seed").output().expect("first seed");
    common::assert_success("first seed", &first);

    // No subcommand means seed.
    let second = common::base_cmd(&uri).output().expect("second seed");
    common::assert_success("second seed", &second);
    assert!(
        String::from_utf8_lossy(&second.stderr).contains("already seeded"),
        "second run should be a no-op:\n{}",
        String::from_utf8_lossy(&second.stderr)
    );

    let status = common::base_cmd(&uri).arg("status").output().expect("status");
    common::assert_success("status", &status);
    let counts = common::parse_status(&status);
    assert_eq!(counts.len(), 9, "unexpected status output: {counts:?}");
    for (collection, count) in counts {
        assert_eq!(count, 1, "{collection} should hold exactly one document");
    }
}

#[test]
fn e2e_reset_clears_previous_state() {
    let data_dir = TempDir::new().expect("temp dir");
    let uri = common::sqlite_uri(data_dir.path());

    let seed = common::base_cmd(&uri).arg("seed").output().expect("seed");
    common::assert_success("seed", &seed);

    let status = common::base_cmd(&uri)
        .arg("--reset")
        .arg("status")
        .output()
        .expect("status after reset");
    common::assert_success("status after reset", &status);
    let counts = common::parse_status(&status);
    assert!(!counts.is_empty());
    assert!(counts.iter().all(|(_, n)| *n == 0), "{counts:?}");
}
