use std::path::Path;

use bisect_core::config::BisectLayout;
use bisect_core::report::{sha256_hex, write_report, RunReport};
use bisect_core::{BisectOutcome, BisectReport, ProbeRecord, RunOutcome, Strategy};
use chrono::{TimeZone, Utc};
use tempfile::tempdir;

fn sample_report() -> BisectReport {
    BisectReport {
        total: 4,
        probes: vec![
            ProbeRecord {
                keep_count: 4,
                exit_code: Some(1),
                outcome: RunOutcome::Reproduced,
                scratch_path: Some("stores/__tests__/prefix_full.test.ts".into()),
                filter: None,
            },
            ProbeRecord {
                keep_count: 2,
                exit_code: Some(1),
                outcome: RunOutcome::Reproduced,
                scratch_path: Some("stores/__tests__/prefix_2.test.ts".into()),
                filter: None,
            },
        ],
        outcome: BisectOutcome::FailingPrefix {
            ordinal: 2,
            display_name: "loads zones".into(),
            line: 40,
        },
    }
}

#[test]
fn sha256_matches_known_hash() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn report_captures_run_metadata() {
    let started = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
    let report = RunReport::new(
        Path::new("stores/__tests__/parentalStore.test.ts"),
        "abc",
        Strategy::SkipRewrite,
        started,
        sample_report(),
    );

    assert_eq!(report.tool_version, bisect_core::version());
    assert_eq!(report.started_at, "2026-10-16T09:30:00+00:00");
    assert_eq!(report.source_hash, sha256_hex(b"abc"));
    assert_eq!(report.total, 4);
    assert_eq!(report.probes.len(), 2);
    assert_eq!(report.outcome.failing_ordinal(), Some(2));
}

#[test]
fn write_report_creates_timestamped_files_without_clobbering() {
    let temp = tempdir().unwrap();
    let layout = BisectLayout::new(temp.path());
    let started = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
    let report =
        RunReport::new(Path::new("a.test.ts"), "", Strategy::NameFilter, started, sample_report());

    let first = write_report(&layout, started, &report).unwrap();
    let second = write_report(&layout, started, &report).unwrap();

    assert_eq!(first, layout.reports_dir.join("run-20261016T093000Z.json"));
    assert_eq!(second, layout.reports_dir.join("run-20261016T093000Z-1.json"));

    let parsed: RunReport =
        serde_json::from_str(&std::fs::read_to_string(&first).unwrap()).unwrap();
    assert_eq!(parsed, report);
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&first).unwrap()).unwrap();
    assert_eq!(raw["outcome"]["kind"], "failing_prefix");
    assert_eq!(raw["strategy"], "name-filter");
}
