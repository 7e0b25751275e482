//! CLI entrypoint for the fossil conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fossil_core::command;
use fossil_core::config::{self, DiagLevel};
use fossil_core::hostsys::HostSystem;
use fossil_core::regex::{self, Session};
use fossil_harness::runner::EVALUATORS;
use fossil_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, StreamKind, validate_log_file,
};
use fossil_harness::{ConformanceReport, FixtureSet, HarnessError, TestRunner, VerificationSummary};

/// Conformance tooling for the fossil utility library.
#[derive(Debug, Parser)]
#[command(name = "fossil-harness")]
#[command(about = "Conformance testing harness for fossil")]
struct Cli {
    /// Library diagnostic level (quiet, errors, verbose). Overrides FOSSIL_DIAG.
    #[arg(long, global = true)]
    diag: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the library against fixture files.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long, default_value = "tests/fixtures")]
        fixture: PathBuf,
        /// Output report path (markdown); a JSON twin is written next to it.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log output path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Match one text against one pattern.
    Match {
        #[arg(long)]
        pattern: String,
        #[arg(long)]
        text: String,
        /// Matcher to use (`recursive` or `compiled`).
        #[arg(long, default_value = "compiled")]
        evaluator: String,
    },
    /// Print the host description.
    Hostinfo {
        /// Emit JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },
    /// Run a shell command through the library.
    Run {
        /// Command line handed to the shell.
        command: String,
        /// Capture at most this many bytes (minus one) of stdout and print them.
        #[arg(long)]
        capture: Option<usize>,
    },
    /// Validate a structured JSONL log.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if let Some(level) = &cli.diag {
        config::set_diag_level(DiagLevel::from_str_loose(level));
    }

    match cli.command {
        Command::Verify {
            fixture,
            report,
            log,
            timestamp,
        } => verify(fixture, report, log, timestamp)?,
        Command::Match {
            pattern,
            text,
            evaluator,
        } => {
            let hit = match evaluator.as_str() {
                "recursive" => {
                    regex::validate_pattern(pattern.as_bytes())?;
                    regex::is_match_str(&text, &pattern)
                }
                "compiled" => Session::create(&pattern)?.match_text(&text)?,
                other => return Err(HarnessError::UnknownEvaluator(other.to_string()).into()),
            };
            if !hit {
                return Err(format!("'{text}' does not match '{pattern}'").into());
            }
            println!("{text}");
        }
        Command::Hostinfo { json } => {
            let host = HostSystem::query()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&host)?);
            } else {
                print!("{host}");
            }
        }
        Command::Run {
            command: line,
            capture,
        } => match capture {
            Some(capacity) => print!("{}", command::output(&line, capacity)?),
            None => {
                let status = command::run_checked(&line)?;
                if status != 0 {
                    return Err(format!("command exited with status {status}").into());
                }
            }
        },
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            eprintln!("Validated {lines} line(s): {} error(s)", errors.len());
            if !errors.is_empty() {
                return Err("Log validation failed".into());
            }
        }
    }
    Ok(())
}

fn verify(
    fixture: PathBuf,
    report: Option<PathBuf>,
    log: Option<PathBuf>,
    timestamp: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Verifying against fixtures in {}", fixture.display());
    let mut fixture_sets = Vec::new();
    for path in fossil_harness::fixtures::fixture_paths(&fixture)? {
        match FixtureSet::from_file(&path) {
            Ok(set) => fixture_sets.push(set),
            Err(err) => eprintln!("Skipping {}: {}", path.display(), err),
        }
    }
    if fixture_sets.is_empty() {
        return Err(HarnessError::NoFixtures(fixture.display().to_string()).into());
    }

    let mut results = Vec::new();
    for evaluator in EVALUATORS {
        let runner = TestRunner::new("fixture-verify", evaluator);
        for set in &fixture_sets {
            results.extend(runner.run(set));
        }
    }

    // Stabilize report ordering for reproducible output.
    results.sort_by(|a, b| {
        a.family
            .cmp(&b.family)
            .then_with(|| a.evaluator.cmp(&b.evaluator))
            .then_with(|| a.case_name.cmp(&b.case_name))
    });

    let timestamp = timestamp.unwrap_or_else(fossil_harness::structured_log::now_utc);
    let summary = VerificationSummary::from_results(results);
    let report_doc = ConformanceReport {
        title: String::from("fossil Conformance Report"),
        evaluators: EVALUATORS.join("+"),
        timestamp,
        summary,
    };

    eprintln!(
        "Verification complete: total={}, passed={}, failed={}",
        report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
    );

    let mut artifacts = Vec::new();
    if let Some(report_path) = &report {
        eprintln!("Writing report to {}", report_path.display());
        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(report_path, report_doc.to_markdown())?;
        let json_path = report_path.with_extension("json");
        std::fs::write(&json_path, report_doc.to_json())?;
        artifacts.push((report_path.clone(), "report_markdown"));
        artifacts.push((json_path, "report_json"));
    }

    if let Some(log_path) = &log {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let run_id = format!("run-{}", std::process::id());
        let mut emitter = LogEmitter::to_file(log_path, "verify", &run_id)?;
        emitter.emit(LogLevel::Info, "verify_start")?;
        for r in &report_doc.summary.results {
            let trace_id = emitter.next_trace_id();
            let (level, outcome) = if r.passed {
                (LogLevel::Info, Outcome::Pass)
            } else {
                (LogLevel::Error, Outcome::Fail)
            };
            emitter.emit_entry(
                LogEntry::new(trace_id, level, "case_result")
                    .with_stream(StreamKind::Conformance)
                    .with_evaluator(&r.evaluator)
                    .with_case(&r.case_name)
                    .with_outcome(outcome)
                    .with_details(serde_json::json!({
                        "family": r.family,
                        "expected": r.expected,
                        "actual": r.actual,
                    })),
            )?;
        }
        let refs = artifacts
            .iter()
            .map(|(path, _)| path.display().to_string())
            .collect();
        let trace_id = emitter.next_trace_id();
        emitter.emit_entry(
            LogEntry::new(trace_id, LogLevel::Info, "verify_end")
                .with_stream(StreamKind::Conformance)
                .with_exit_code(i32::from(!report_doc.summary.all_passed()))
                .with_artifacts(refs),
        )?;
        emitter.flush()?;

        let mut index = ArtifactIndex::new(&run_id, "verify");
        index.add_file(log_path, "log")?;
        for (path, kind) in &artifacts {
            index.add_file(path, *kind)?;
        }
        std::fs::write(log_path.with_extension("index.json"), index.to_json()?)?;
    }

    if !report_doc.summary.all_passed() {
        return Err("Conformance verification failed".into());
    }
    Ok(())
}
