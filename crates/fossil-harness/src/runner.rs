//! Test execution engine.

use fossil_core::args::{CliOption, OptionKind, OptionTable, combo_choices};
use fossil_core::regex::{self, Session};
use fossil_core::{command, diag, memory, stdlib};
use serde_json::Value;

use crate::fixtures::{FixtureCase, FixtureSet};
use crate::verify::VerificationResult;
use crate::{HarnessError, diff};

/// Matchers a regex case can run under.
pub const EVALUATORS: [&str; 2] = ["recursive", "compiled"];

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Matcher under test (`recursive` or `compiled`).
    pub evaluator: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>, evaluator: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            evaluator: evaluator.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .filter(|case| evaluator_matches(&self.evaluator, &case.evaluator))
            .map(|case| {
                let (actual, diff) = execute_case(case, &self.evaluator);
                let case_name = if case.evaluator.eq_ignore_ascii_case("both") {
                    format!("{} [{}]", case.name, self.evaluator)
                } else {
                    case.name.clone()
                };
                VerificationResult {
                    case_name,
                    family: fixture_set.family.clone(),
                    section: case.section.clone(),
                    evaluator: self.evaluator.clone(),
                    passed: actual == case.expected_output,
                    expected: case.expected_output.clone(),
                    actual,
                    diff,
                }
            })
            .collect()
    }
}

fn evaluator_matches(active: &str, case: &str) -> bool {
    let active = active.to_ascii_lowercase();
    let case = case.to_ascii_lowercase();
    case == active || case == "both"
}

fn execute_case(case: &FixtureCase, evaluator: &str) -> (String, Option<String>) {
    // Diagnostics from the library are collected rather than printed.
    let (execution, diagnostics) =
        diag::capture(|| execute_fixture_case(&case.function, &case.inputs, evaluator));
    match execution {
        Ok(actual) => {
            let diff_out = if actual != case.expected_output {
                Some(diff::render_diff(&case.expected_output, &actual))
            } else if !diagnostics.is_empty() {
                Some(
                    diagnostics
                        .iter()
                        .map(|d| d.message.as_str())
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
            } else {
                None
            };
            (actual, diff_out)
        }
        Err(err) => {
            let actual = format!("unsupported:{err}");
            let diff_out = Some(diff::render_diff(&case.expected_output, &actual));
            (actual, diff_out)
        }
    }
}

/// Execute one fixture operation and render its outcome as a string.
///
/// Library-level failures (an invalid pattern, a zero size) are part of
/// the rendered outcome as `error:<message>`. Malformed fixture input is a
/// [`HarnessError`].
pub fn execute_fixture_case(
    function: &str,
    inputs: &Value,
    evaluator: &str,
) -> Result<String, HarnessError> {
    match function {
        "regex_create" => {
            let pattern = str_input(function, inputs, "pattern")?;
            Ok(match Session::create(pattern) {
                Ok(_) => String::from("ok"),
                Err(err) => format!("error:{err}"),
            })
        }
        "regex_match" => {
            let pattern = str_input(function, inputs, "pattern")?;
            let text = str_input(function, inputs, "text")?;
            Ok(match regex_outcome(pattern, text, evaluator)? {
                Ok(true) => String::from("match"),
                Ok(false) => String::from("no_match"),
                Err(err) => format!("error:{err}"),
            })
        }
        "regex_extract" => {
            let pattern = str_input(function, inputs, "pattern")?;
            let text = str_input(function, inputs, "text")?;
            Ok(match regex_outcome(pattern, text, evaluator)? {
                Ok(true) => text.to_string(),
                Ok(false) => String::from("null"),
                Err(err) => format!("error:{err}"),
            })
        }
        "memory_compare" => {
            let a = bytes_input(function, inputs, "a")?;
            let b = bytes_input(function, inputs, "b")?;
            let size = usize_input(function, inputs, "size")?;
            Ok(match memory::compare(&a, &b, size) {
                Ok(ordering) => (ordering as i8).to_string(),
                Err(err) => format!("error:{err}"),
            })
        }
        "strcat_safe" => {
            let mut dest = str_input(function, inputs, "dest")?.to_string();
            let src = str_input(function, inputs, "src")?;
            let dest_size = usize_input(function, inputs, "dest_size")?;
            command::strcat_safe(&mut dest, src, dest_size);
            Ok(dest)
        }
        "atoi" => {
            let s = str_input(function, inputs, "s")?;
            Ok(stdlib::atoi(s.as_bytes()).to_string())
        }
        "args_has" => {
            let mut table = option_table(function, inputs)?;
            let argv = string_list(function, inputs, "argv")?;
            let name = str_input(function, inputs, "name")?;
            let errors = table.parse(&argv);
            if let Some(err) = errors.first() {
                return Ok(format!("error:{err}"));
            }
            Ok(table.has(name).to_string())
        }
        other => Err(HarnessError::UnknownFunction(other.to_string())),
    }
}

/// Run one anchored match under `evaluator`. The outer error is a harness
/// problem, the inner one a library outcome.
fn regex_outcome(
    pattern: &str,
    text: &str,
    evaluator: &str,
) -> Result<Result<bool, regex::RegexError>, HarnessError> {
    match evaluator.to_ascii_lowercase().as_str() {
        "recursive" => Ok(regex::validate_pattern(pattern.as_bytes())
            .map(|()| regex::is_match_str(text, pattern))),
        "compiled" => Ok(Session::create(pattern).and_then(|mut session| session.match_text(text))),
        other => Err(HarnessError::UnknownEvaluator(other.to_string())),
    }
}

fn option_table(function: &str, inputs: &Value) -> Result<OptionTable, HarnessError> {
    let bad = |field| HarnessError::BadInput {
        function: function.to_string(),
        field,
    };
    let entries = inputs
        .get("options")
        .and_then(Value::as_array)
        .ok_or_else(|| bad("options"))?;
    let mut options = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.get("name").and_then(Value::as_str).ok_or_else(|| bad("options.name"))?;
        let kind = match entry.get("kind").and_then(Value::as_str) {
            Some("int") => OptionKind::Int,
            Some("str") => OptionKind::Str,
            Some("bool") => OptionKind::Bool,
            Some("combo") => OptionKind::Combo,
            Some("feature") => OptionKind::Feature,
            _ => return Err(bad("options.kind")),
        };
        let mut option = CliOption::new(name, kind);
        if let Some(choices) = entry.get("choices").and_then(Value::as_array) {
            let names: Vec<&str> = choices.iter().filter_map(Value::as_str).collect();
            let values: Vec<i32> = (0..).take(names.len()).collect();
            let choices = combo_choices(&names, &values).map_err(|_| bad("options.choices"))?;
            option = option.with_choices(choices);
        }
        options.push(option);
    }
    Ok(OptionTable::new(options))
}

fn str_input<'a>(
    function: &str,
    inputs: &'a Value,
    field: &'static str,
) -> Result<&'a str, HarnessError> {
    inputs
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| HarnessError::BadInput {
            function: function.to_string(),
            field,
        })
}

fn usize_input(function: &str, inputs: &Value, field: &'static str) -> Result<usize, HarnessError> {
    inputs
        .get(field)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| HarnessError::BadInput {
            function: function.to_string(),
            field,
        })
}

fn bytes_input(function: &str, inputs: &Value, field: &'static str) -> Result<Vec<u8>, HarnessError> {
    let bad = || HarnessError::BadInput {
        function: function.to_string(),
        field,
    };
    inputs
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(bad)?
        .iter()
        .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()).ok_or_else(bad))
        .collect()
}

fn string_list(
    function: &str,
    inputs: &Value,
    field: &'static str,
) -> Result<Vec<String>, HarnessError> {
    let bad = || HarnessError::BadInput {
        function: function.to_string(),
        field,
    };
    inputs
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(bad)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(bad))
        .collect()
}
