use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Identifier immediately followed by a parenthesized, non-nested
    // argument list. Nested parentheses are left to the shell.
    static ref CALL_RE: Regex =
        Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\(([^()]*)\)").unwrap();
}

/// One parsed `name(args)` expression found in a substituted template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<String>,
    /// Byte offset of the call's first character.
    pub start: usize,
    /// Byte offset one past the closing parenthesis.
    pub end: usize,
}

/// Scan left-to-right for function-call expressions.
pub fn find_calls(input: &str) -> Vec<FunctionCall> {
    CALL_RE
        .captures_iter(input)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            let raw_args = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            FunctionCall {
                name: caps[1].to_string(),
                args: split_args(raw_args),
                start: whole.start(),
                end: whole.end(),
            }
        })
        .collect()
}

fn split_args(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|a| a.trim().to_string()).collect()
}
