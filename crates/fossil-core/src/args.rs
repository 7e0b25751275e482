//! Command-line option tables.
//!
//! Options are addressed as `-name` on the command line. Each option has a
//! kind that decides whether it consumes the following argument:
//!
//! | kind      | consumes | usage text               |
//! |-----------|----------|--------------------------|
//! | `Int`     | yes      | `<int>`                  |
//! | `Str`     | yes      | `<string>`               |
//! | `Bool`    | no       | `(flag)`                 |
//! | `Combo`   | yes      | `{a\|b\|c}`              |
//! | `Feature` | yes      | `{enable\|disable\|auto}` |

use std::fmt::Write as _;

use thiserror::Error;

use crate::diag;
use crate::stdlib::conversion::atoi;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Missing argument for option '-{option}'")]
    MissingValue { option: String },
    #[error("Unknown choice '{value}' for option '-{option}'")]
    UnknownChoice { option: String, value: String },
    #[error("Invalid feature value '{value}' for option '-{option}'")]
    InvalidFeature { option: String, value: String },
    #[error("Unrecognized option '{arg}'")]
    Unrecognized { arg: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Int,
    Str,
    Bool,
    Combo,
    Feature,
}

/// Tri-state feature switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Feature {
    Enable,
    Disable,
    #[default]
    Auto,
}

impl Feature {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "enable" => Some(Self::Enable),
            "disable" => Some(Self::Disable),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Auto => "auto",
        }
    }
}

/// Named value accepted by a `Combo` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboChoice {
    pub name: String,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Int(i32),
    Str(String),
    Bool(bool),
    Combo(i32),
    Feature(Feature),
}

impl OptionValue {
    /// Initial value for an option of `kind`.
    #[must_use]
    pub fn default_for(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Int => Self::Int(0),
            OptionKind::Str => Self::Str(String::new()),
            OptionKind::Bool => Self::Bool(false),
            OptionKind::Combo => Self::Combo(0),
            OptionKind::Feature => Self::Feature(Feature::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOption {
    pub name: String,
    pub kind: OptionKind,
    pub value: OptionValue,
    pub choices: Vec<ComboChoice>,
    pub parsed: bool,
}

impl CliOption {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            value: OptionValue::default_for(kind),
            choices: Vec::new(),
            parsed: false,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: OptionValue) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn with_choices(mut self, choices: Vec<ComboChoice>) -> Self {
        self.choices = choices;
        self
    }

    fn usage_suffix(&self) -> String {
        match self.kind {
            OptionKind::Int => " <int>".to_string(),
            OptionKind::Str => " <string>".to_string(),
            OptionKind::Bool => " (flag)".to_string(),
            OptionKind::Combo => {
                let names: Vec<&str> = self.choices.iter().map(|c| c.name.as_str()).collect();
                format!(" {{{}}}", names.join("|"))
            }
            OptionKind::Feature => " {enable|disable|auto}".to_string(),
        }
    }
}

/// Pair up choice names with their values.
pub fn combo_choices(names: &[&str], values: &[i32]) -> Result<Vec<ComboChoice>, ArgsError> {
    if names.len() != values.len() {
        return Err(ArgsError::LengthMismatch {
            what: "combo values",
            expected: names.len(),
            actual: values.len(),
        });
    }
    Ok(names
        .iter()
        .zip(values)
        .map(|(name, &value)| ComboChoice {
            name: (*name).to_string(),
            value,
        })
        .collect())
}

/// Ordered set of options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionTable {
    options: Vec<CliOption>,
}

impl OptionTable {
    #[must_use]
    pub fn new(options: Vec<CliOption>) -> Self {
        Self { options }
    }

    /// Build a table from parallel arrays. `choices[i]` is only used when
    /// `kinds[i]` is `Combo`.
    pub fn from_parts(
        names: &[&str],
        kinds: &[OptionKind],
        values: Vec<OptionValue>,
        choices: Vec<Vec<ComboChoice>>,
    ) -> Result<Self, ArgsError> {
        let expected = names.len();
        for (what, actual) in [
            ("option kinds", kinds.len()),
            ("option values", values.len()),
            ("option choices", choices.len()),
        ] {
            if actual != expected {
                return Err(ArgsError::LengthMismatch {
                    what,
                    expected,
                    actual,
                });
            }
        }

        let options = names
            .iter()
            .zip(kinds)
            .zip(values.into_iter().zip(choices))
            .map(|((name, &kind), (value, choices))| {
                CliOption::new(*name, kind)
                    .with_value(value)
                    .with_choices(choices)
            })
            .collect();
        Ok(Self { options })
    }

    #[must_use]
    pub fn options(&self) -> &[CliOption] {
        &self.options
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CliOption> {
        self.options.iter().find(|option| option.name == name)
    }

    /// True if `name` exists and was seen by [`OptionTable::parse`].
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|option| option.parsed)
    }

    fn position(&self, arg: &str) -> Option<usize> {
        let name = arg.strip_prefix('-')?;
        self.options.iter().position(|option| option.name == name)
    }

    /// Parse `argv` (program name first) into the table.
    ///
    /// Unknown `-name` arguments and plain arguments are skipped. Problems
    /// with individual values are collected and parsing carries on.
    pub fn parse<S: AsRef<str>>(&mut self, argv: &[S]) -> Vec<ArgsError> {
        let mut errors = Vec::new();
        let mut i = 1;
        while i < argv.len() {
            let Some(index) = self.position(argv[i].as_ref()) else {
                i += 1;
                continue;
            };
            let option = &mut self.options[index];
            option.parsed = true;

            if option.kind == OptionKind::Bool {
                option.value = OptionValue::Bool(true);
                i += 1;
                continue;
            }

            let Some(raw) = argv.get(i + 1).map(AsRef::<str>::as_ref) else {
                errors.push(ArgsError::MissingValue {
                    option: option.name.clone(),
                });
                break;
            };
            i += 2;

            match option.kind {
                OptionKind::Int => option.value = OptionValue::Int(atoi(raw.as_bytes())),
                OptionKind::Str => option.value = OptionValue::Str(raw.to_string()),
                OptionKind::Combo => {
                    match option.choices.iter().find(|choice| choice.name == raw) {
                        Some(choice) => option.value = OptionValue::Combo(choice.value),
                        None => errors.push(ArgsError::UnknownChoice {
                            option: option.name.clone(),
                            value: raw.to_string(),
                        }),
                    }
                }
                OptionKind::Feature => match Feature::from_name(raw) {
                    Some(feature) => option.value = OptionValue::Feature(feature),
                    None => errors.push(ArgsError::InvalidFeature {
                        option: option.name.clone(),
                        value: raw.to_string(),
                    }),
                },
                OptionKind::Bool => {}
            }
        }

        for err in &errors {
            diag::error("args", "fossil_arg_parse", format!("Error: {err}."));
        }
        errors
    }

    /// First `-name` argument in `argv[1..]` that names no option.
    pub fn check_unrecognized<S: AsRef<str>>(&self, argv: &[S]) -> Result<(), ArgsError> {
        let unknown = argv
            .iter()
            .skip(1)
            .map(AsRef::<str>::as_ref)
            .find(|arg| arg.starts_with('-') && self.position(arg).is_none());
        match unknown {
            Some(arg) => {
                let err = ArgsError::Unrecognized {
                    arg: arg.to_string(),
                };
                diag::error("args", "fossil_arg_check_unrecognized", format!("Error: {err}"));
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Usage text listing every option.
    #[must_use]
    pub fn usage(&self, program: &str) -> String {
        let mut out = format!("Usage: {program} [options]\n\nOptions:\n");
        for option in &self.options {
            let _ = writeln!(out, "  -{}{}", option.name, option.usage_suffix());
        }
        out
    }

    /// One `Option: <name>, Parsed: true|false` line per option.
    #[must_use]
    pub fn parsed_report(&self) -> String {
        let mut out = String::new();
        for option in &self.options {
            let _ = writeln!(out, "Option: {}, Parsed: {}", option.name, option.parsed);
        }
        out
    }

    pub fn reset_parsed(&mut self) {
        for option in &mut self.options {
            option.parsed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> OptionTable {
        let levels = combo_choices(&["low", "mid", "high"], &[1, 5, 9]).unwrap();
        OptionTable::new(vec![
            CliOption::new("count", OptionKind::Int),
            CliOption::new("name", OptionKind::Str),
            CliOption::new("verbose", OptionKind::Bool),
            CliOption::new("level", OptionKind::Combo).with_choices(levels),
            CliOption::new("color", OptionKind::Feature),
        ])
    }

    #[test]
    fn parses_each_kind() {
        let mut table = table();
        let argv = [
            "prog", "-count", "42", "-name", "fossil", "-verbose", "-level", "mid", "-color",
            "disable",
        ];
        assert!(table.parse(&argv).is_empty());
        assert_eq!(table.get("count").unwrap().value, OptionValue::Int(42));
        assert_eq!(
            table.get("name").unwrap().value,
            OptionValue::Str("fossil".to_string())
        );
        assert_eq!(table.get("verbose").unwrap().value, OptionValue::Bool(true));
        assert_eq!(table.get("level").unwrap().value, OptionValue::Combo(5));
        assert_eq!(
            table.get("color").unwrap().value,
            OptionValue::Feature(Feature::Disable)
        );
        assert!(table.has("count"));
        assert!(!table.has("missing"));
    }

    #[test]
    fn int_uses_atoi_leniency() {
        let mut table = table();
        table.parse(&["prog", "-count", "12abc"]);
        assert_eq!(table.get("count").unwrap().value, OptionValue::Int(12));
        table.parse(&["prog", "-count", "junk"]);
        assert_eq!(table.get("count").unwrap().value, OptionValue::Int(0));
    }

    #[test]
    fn missing_value_is_reported() {
        let mut table = table();
        let (errors, records) = diag::capture(|| table.parse(&["prog", "-count"]));
        assert_eq!(
            errors,
            vec![ArgsError::MissingValue {
                option: "count".to_string()
            }]
        );
        assert_eq!(records.len(), 1);
        assert!(table.has("count"));
        assert_eq!(table.get("count").unwrap().value, OptionValue::Int(0));
    }

    #[test]
    fn bad_choices_are_collected() {
        let mut table = table();
        let errors = table.parse(&["prog", "-level", "extreme", "-color", "maybe", "-verbose"]);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ArgsError::UnknownChoice { .. }));
        assert!(matches!(errors[1], ArgsError::InvalidFeature { .. }));
        assert!(table.has("verbose"));
    }

    #[test]
    fn unknown_and_plain_arguments_are_skipped() {
        let mut table = table();
        assert!(table.parse(&["prog", "input.txt", "-unknown", "-verbose"]).is_empty());
        assert!(table.has("verbose"));
        assert!(!table.has("count"));
    }

    #[test]
    fn check_unrecognized_reports_first() {
        let table = table();
        assert_eq!(table.check_unrecognized(&["prog", "-count", "3", "file"]), Ok(()));
        assert_eq!(
            table.check_unrecognized(&["prog", "-verbose", "-bogus", "-other"]),
            Err(ArgsError::Unrecognized {
                arg: "-bogus".to_string()
            })
        );
    }

    #[test]
    fn usage_text() {
        assert_eq!(
            table().usage("prog"),
            "Usage: prog [options]\n\nOptions:\n\
             \x20 -count <int>\n\
             \x20 -name <string>\n\
             \x20 -verbose (flag)\n\
             \x20 -level {low|mid|high}\n\
             \x20 -color {enable|disable|auto}\n"
        );
    }

    #[test]
    fn parsed_report_and_reset() {
        let mut table = table();
        table.parse(&["prog", "-verbose"]);
        let report = table.parsed_report();
        assert!(report.contains("Option: verbose, Parsed: true\n"));
        assert!(report.contains("Option: count, Parsed: false\n"));

        table.reset_parsed();
        assert!(!table.has("verbose"));
        assert!(table.parsed_report().lines().all(|l| l.ends_with("false")));
    }

    #[test]
    fn from_parts_checks_lengths() {
        let table = OptionTable::from_parts(
            &["n", "mode"],
            &[OptionKind::Int, OptionKind::Combo],
            vec![OptionValue::Int(7), OptionValue::Combo(0)],
            vec![Vec::new(), combo_choices(&["a", "b"], &[0, 1]).unwrap()],
        )
        .unwrap();
        assert_eq!(table.get("n").unwrap().value, OptionValue::Int(7));
        assert!(!table.has("n"));
        assert_eq!(table.get("mode").unwrap().choices.len(), 2);

        assert!(matches!(
            OptionTable::from_parts(&["n"], &[], Vec::new(), Vec::new()),
            Err(ArgsError::LengthMismatch { expected: 1, actual: 0, .. })
        ));
        assert!(combo_choices(&["a"], &[1, 2]).is_err());
    }
}
