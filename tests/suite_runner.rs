// tests/suite_runner.rs
//
// Runs every YAML suite under tests/suites through the round-trip harness.

use coolast::test_harness::{
    collect_results, discover_yaml_files, load_test_cases, HarnessConfig, TestResult,
};

fn config() -> HarnessConfig {
    HarnessConfig {
        use_colors: false,
        ..HarnessConfig::default()
    }
}

#[test]
fn test_suites_are_discovered() {
    let files = discover_yaml_files("tests/suites");
    assert!(files.len() >= 3, "{files:?}");
    for file in &files {
        let cases = load_test_cases(file).unwrap();
        assert!(!cases.is_empty(), "{} has no cases", file.display());
    }
}

#[test]
fn test_all_suites_pass() {
    let report = collect_results(&config()).unwrap();
    let failures: Vec<_> = report
        .results
        .iter()
        .filter(|r| matches!(r, TestResult::Fail { .. }))
        .collect();
    assert!(failures.is_empty(), "{failures:#?}");
    assert!(report.passed() > 10);
}

#[test]
fn test_filter_skips_other_cases() {
    let config = HarnessConfig {
        filter: Some("static dispatch".to_string()),
        ..config()
    };
    let report = collect_results(&config).unwrap();
    assert!(report.passed() >= 1);
    assert!(report.skipped() > report.passed());
}
