#![no_main]
use fossil_core::args::{CliOption, OptionKind, OptionTable, OptionValue, combo_choices};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut argv = vec!["prog"];
    argv.extend(text.split(['\0', ' ']));

    let Ok(choices) = combo_choices(&["low", "high"], &[0, 1]) else {
        return;
    };
    let mut table = OptionTable::new(vec![
        CliOption::new("n", OptionKind::Int),
        CliOption::new("name", OptionKind::Str),
        CliOption::new("v", OptionKind::Bool),
        CliOption::new("level", OptionKind::Combo).with_choices(choices),
        CliOption::new("color", OptionKind::Feature),
    ]);

    let _ = fossil_core::diag::capture(|| table.parse(&argv));
    // Options never named on the command line keep their defaults.
    for option in table.options() {
        if !option.parsed {
            assert_eq!(option.value, OptionValue::default_for(option.kind));
        }
    }
    let _ = table.usage("prog");
    let _ = fossil_core::diag::capture(|| table.check_unrecognized(&argv));
});
