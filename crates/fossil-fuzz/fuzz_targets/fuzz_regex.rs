#![no_main]
use fossil_core::regex::{PATTERN_LIMIT, Program, is_match};
use libfuzzer_sys::fuzz_target;

// Input layout: [pattern_len][pattern bytes][text bytes]
fuzz_target!(|data: &[u8]| {
    let Some((&n, rest)) = data.split_first() else {
        return;
    };
    let n = usize::from(n).min(rest.len()).min(PATTERN_LIMIT - 1);
    let (pattern, text) = rest.split_at(n);
    // Keep the recursive side away from exponential blowup and deep stacks.
    if text.len() > 64 || pattern.iter().filter(|&&b| b == b'*').count() > 8 {
        return;
    }

    let recursive = is_match(text, pattern);
    let compiled = Program::compile(pattern).matches(text);
    assert_eq!(
        recursive, compiled,
        "matchers disagree: pattern={pattern:?} text={text:?}"
    );
});
