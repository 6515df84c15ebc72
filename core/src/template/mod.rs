//! Template substitution and embedded function evaluation.
//!
//! A template contains zero or more occurrences of the placeholder token and
//! zero or more function-call expressions (`name(args)`), with `;` between
//! independent calls. Placeholder substitution is textual and total, and it
//! happens before function arguments are parsed, so arguments may contain
//! the placeholder.

mod functions;
mod parser;

pub use functions::{FunctionError, FunctionRegistry};
pub use parser::find_calls;

/// Result of expanding a template for one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalOutcome {
    pub expanded: String,
    /// True when at least one registered function call was evaluated.
    pub had_functions: bool,
}

pub struct TemplateEngine {
    placeholder: String,
    functions: FunctionRegistry,
}

impl TemplateEngine {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            functions: FunctionRegistry::with_builtins(),
        }
    }

    /// Replace every placeholder occurrence with the work item's value.
    pub fn substitute(&self, template: &str, value: &str) -> String {
        template.replace(&self.placeholder, value)
    }

    /// Substitute the placeholder, then evaluate every registered function
    /// call left-to-right. Unknown names stay as literal text; a failing call
    /// contributes an empty string and logs at error severity. Never panics
    /// or returns an error past this boundary.
    pub fn evaluate(&self, template: &str, value: &str) -> EvalOutcome {
        let substituted = self.substitute(template, value);
        let calls = find_calls(&substituted);

        if calls.is_empty() {
            return EvalOutcome {
                expanded: substituted,
                had_functions: false,
            };
        }

        let mut expanded = String::with_capacity(substituted.len());
        let mut cursor = 0usize;
        let mut had_functions = false;

        for call in calls {
            if !self.functions.contains(&call.name) {
                continue;
            }
            had_functions = true;
            expanded.push_str(&substituted[cursor..call.start]);
            match self.functions.invoke(&call.name, &call.args) {
                Ok(result) => expanded.push_str(&result),
                Err(e) => {
                    tracing::error!("function {}() failed: {}", call.name, e);
                }
            }
            cursor = call.end;
        }
        expanded.push_str(&substituted[cursor..]);

        EvalOutcome {
            expanded,
            had_functions,
        }
    }
}
