use std::path::Path;

use bisect_core::config::RunnerConfig;
use bisect_core::{classify, CommandOracle, Oracle, OracleError, OracleExit, RunOutcome};

#[test]
fn classify_maps_exit_codes_to_outcomes() {
    assert_eq!(classify(OracleExit::with_code(0), &[]), RunOutcome::Clean);
    assert_eq!(classify(OracleExit::with_code(1), &[]), RunOutcome::Reproduced);
    assert_eq!(classify(OracleExit::with_code(137), &[]), RunOutcome::Reproduced);
    assert_eq!(classify(OracleExit::with_code(137), &[137]), RunOutcome::Inconclusive);
    assert_eq!(classify(OracleExit::terminated(), &[]), RunOutcome::Inconclusive);
    // Zero is always clean, even if listed.
    assert_eq!(classify(OracleExit::with_code(0), &[0]), RunOutcome::Clean);
}

#[test]
fn command_args_substitute_the_file_placeholder() {
    let oracle = CommandOracle::from_config(&RunnerConfig::default(), Path::new("/repo"));
    let args = oracle.command_args(Path::new("/repo/stores/prefix_3.test.ts"), None);
    assert_eq!(
        args,
        vec!["test", "--", "/repo/stores/prefix_3.test.ts", "-i", "--runInBand", "--detectOpenHandles"]
    );
    assert_eq!(oracle.program(), "npm");
}

#[test]
fn command_args_append_file_and_filter_when_needed() {
    let oracle = CommandOracle::new("jest")
        .args(["--ci"])
        .filter_flag(Some("--testNamePattern".into()));
    let args = oracle.command_args(Path::new("a.test.ts"), Some("^(?:one)$"));
    assert_eq!(args, vec!["--ci", "a.test.ts", "--testNamePattern", "^(?:one)$"]);

    let bare = CommandOracle::new("jest");
    assert_eq!(bare.command_args(Path::new("a.test.ts"), Some("x")), vec!["a.test.ts", "x"]);
}

#[test]
fn spawn_failures_are_reported_with_the_program_name() {
    let mut oracle = CommandOracle::new("definitely-not-a-test-runner-7f3a").echo_output(false);
    let err = oracle.run(Path::new("x.test.ts"), None).unwrap_err();
    let OracleError::Spawn { program, .. } = &err;
    assert_eq!(program, "definitely-not-a-test-runner-7f3a");
    assert!(err.to_string().contains("Failed to spawn test runner"));
}

#[cfg(unix)]
mod unix {
    use super::*;

    fn sh(script: &str) -> CommandOracle {
        CommandOracle::new("sh").args(["-c", script, "sh", "{file}"]).echo_output(false)
    }

    #[test]
    fn exit_status_is_passed_through() {
        let file = Path::new("unused.test.ts");
        assert_eq!(sh("exit 0").run(file, None).unwrap(), OracleExit::with_code(0));
        assert_eq!(sh("exit 3").run(file, None).unwrap(), OracleExit::with_code(3));
    }

    #[test]
    fn runner_receives_the_variant_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("prefix_2.test.ts");
        std::fs::write(&file, "it('a', () => {});\n").unwrap();

        let exit = sh(r#"test -f "$1" && grep -q "it('a'" "$1""#).run(&file, None).unwrap();
        assert!(exit.success());
    }

    #[test]
    fn runner_receives_the_filter_after_its_flag() {
        let mut oracle = sh(r#"[ "$2" = "--testNamePattern" ] && [ "$3" = "^(?:case 1)$" ]"#)
            .filter_flag(Some("--testNamePattern".into()));
        let exit = oracle.run(Path::new("s.test.ts"), Some("^(?:case 1)$")).unwrap();
        assert!(exit.success());
    }

    #[test]
    fn runner_runs_in_the_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();
        let mut oracle = sh("test -f marker").current_dir(dir.path());
        assert!(oracle.run(Path::new("s.test.ts"), None).unwrap().success());
    }

    #[test]
    fn echoed_output_does_not_change_the_status() {
        let mut oracle = sh("echo running; echo boom >&2; exit 1").echo_output(true);
        let exit = oracle.run(Path::new("s.test.ts"), None).unwrap();
        assert_eq!(exit.code, Some(1));
    }
}
