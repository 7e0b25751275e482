//! Integration test: the checked-in fixture suite passes under both matchers.

use std::path::{Path, PathBuf};

use fossil_harness::runner::EVALUATORS;
use fossil_harness::structured_log::{LogEmitter, validate_log_file};
use fossil_harness::{FixtureSet, TestRunner, VerificationSummary};

fn workspace_root() -> PathBuf {
    let manifest = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn load_sets() -> Vec<FixtureSet> {
    let dir = workspace_root().join("tests/fixtures");
    fossil_harness::fixtures::fixture_paths(&dir)
        .expect("fixture dir should be readable")
        .iter()
        .map(|path| {
            FixtureSet::from_file(path)
                .unwrap_or_else(|err| panic!("{} should parse: {err}", path.display()))
        })
        .collect()
}

#[test]
fn fixture_suite_passes_for_every_evaluator() {
    let sets = load_sets();
    let families: Vec<&str> = sets.iter().map(|s| s.family.as_str()).collect();
    for family in ["args", "command", "memory", "regex"] {
        assert!(families.contains(&family), "missing {family} fixtures");
    }

    for evaluator in EVALUATORS {
        let runner = TestRunner::new("suite", evaluator);
        let results: Vec<_> = sets.iter().flat_map(|set| runner.run(set)).collect();
        let summary = VerificationSummary::from_results(results);
        let failures: Vec<_> = summary
            .failures()
            .map(|r| format!("{}: {:?}", r.case_name, r.diff))
            .collect();
        assert!(summary.total > 30, "{evaluator}: only {} cases", summary.total);
        assert!(failures.is_empty(), "{evaluator} failures:\n{}", failures.join("\n"));
    }
}

#[test]
fn fixture_cases_have_unique_names() {
    for set in load_sets() {
        let mut names: Vec<&str> = set.cases.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len(), "duplicate case names in {}", set.family);
    }
}

#[test]
fn emitted_log_validates() {
    let dir = std::env::temp_dir().join(format!("fossil-harness-log-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("run.log.jsonl");

    let mut emitter = LogEmitter::to_file(&path, "suite", "run-1").unwrap();
    emitter
        .emit(fossil_harness::structured_log::LogLevel::Info, "start")
        .unwrap();
    emitter
        .emit(fossil_harness::structured_log::LogLevel::Info, "end")
        .unwrap();
    emitter.flush().unwrap();
    drop(emitter);

    let (lines, errors) = validate_log_file(&path).unwrap();
    assert_eq!(lines, 2);
    assert!(errors.is_empty(), "{errors:?}");
    std::fs::remove_dir_all(&dir).unwrap();
}
