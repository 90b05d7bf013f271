use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn roost(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("roost").unwrap();
    cmd.current_dir(dir.path())
        .env("ROOST_DATA_DIR", dir.path());
    cmd
}

/// Write a config with no pacing delay so posts complete immediately.
fn write_fast_config(dir: &TempDir, daily_limit: u32) {
    let yaml = format!(
        "daily_limit: {daily_limit}\nhourly_limit: 60\nmin_delay_ms: 0\nmax_delay_ms: 0\n"
    );
    std::fs::write(dir.path().join("config.yaml"), yaml).unwrap();
}

// ---------------------------------------------------------------------------
// roost stats
// ---------------------------------------------------------------------------

#[test]
fn stats_on_fresh_dir_shows_zero_usage() {
    let dir = TempDir::new().unwrap();
    roost(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("daily:    0/500"))
        .stdout(predicate::str::contains("hourly:   0/60"))
        .stdout(predicate::str::contains("last at:  never"));
}

#[test]
fn stats_json_output_is_parseable() {
    let dir = TempDir::new().unwrap();
    let output = roost(&dir).args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stats"]["total"], 0);
    assert_eq!(report["quota"]["daily_count"], 0);
    assert_eq!(report["daily_remaining"], 500);
}

// ---------------------------------------------------------------------------
// roost recent
// ---------------------------------------------------------------------------

#[test]
fn recent_on_fresh_dir_is_empty() {
    let dir = TempDir::new().unwrap();
    roost(&dir)
        .arg("recent")
        .assert()
        .success()
        .stdout(predicate::str::contains("No attempts recorded."));
}

// ---------------------------------------------------------------------------
// roost post --dry-run
// ---------------------------------------------------------------------------

#[test]
fn dry_run_post_records_attempt_and_consumes_quota() {
    let dir = TempDir::new().unwrap();
    write_fast_config(&dir, 500);

    roost(&dir)
        .args(["post", "1690000000000000001", "Nice thread.", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replied to 1690000000000000001"));

    // Quota snapshot persisted
    assert!(dir.path().join("quota_state.json").exists());

    // Ledger holds exactly the one attempt
    roost(&dir)
        .arg("recent")
        .assert()
        .success()
        .stdout(predicate::str::contains("1690000000000000001"))
        .stdout(predicate::str::contains("success"));

    roost(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("daily:    1/500"));
}

#[test]
fn third_post_is_denied_at_daily_limit_two() {
    let dir = TempDir::new().unwrap();
    write_fast_config(&dir, 2);

    for target in ["t1", "t2"] {
        roost(&dir)
            .args(["post", target, "hello", "--dry-run"])
            .assert()
            .success();
    }

    roost(&dir)
        .args(["post", "t3", "hello", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("daily limit exceeded"));

    // The denial left no trace: still two ledger rows, counters unchanged
    roost(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("daily:    2/2"))
        .stdout(predicate::str::contains("total:    2"));
}

#[test]
fn back_to_back_posts_hit_the_pacing_floor() {
    let dir = TempDir::new().unwrap();

    // Seed the pacing anchor with a zero-delay post first, since a fresh
    // dir has no anchor and the pacing sleep would stall the test.
    write_fast_config(&dir, 500);
    roost(&dir)
        .args(["post", "t1", "hello", "--dry-run"])
        .assert()
        .success();

    // Large min_delay: the follow-up arrives well inside the floor
    std::fs::write(
        dir.path().join("config.yaml"),
        "daily_limit: 500\nhourly_limit: 60\nmin_delay_ms: 600000\nmax_delay_ms: 600000\n",
    )
    .unwrap();
    roost(&dir)
        .args(["post", "t2", "hello", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too soon"));
}

// ---------------------------------------------------------------------------
// roost reset-quota
// ---------------------------------------------------------------------------

#[test]
fn reset_quota_zeroes_persisted_counters() {
    let dir = TempDir::new().unwrap();
    write_fast_config(&dir, 500);

    roost(&dir)
        .args(["post", "t1", "hello", "--dry-run"])
        .assert()
        .success();

    roost(&dir)
        .arg("reset-quota")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quota reset: 0/500 daily, 0/60 hourly"));

    // Zeroes survive a fresh process
    roost(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("daily:    0/500"));
}

#[test]
fn retries_flag_caps_actuator_retries() {
    let dir = TempDir::new().unwrap();
    write_fast_config(&dir, 500);

    // Dry-run actuator always succeeds, so --retries only needs to parse
    roost(&dir)
        .args(["post", "t1", "hello", "--dry-run", "--retries", "1"])
        .assert()
        .success();
}
