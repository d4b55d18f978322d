//! XPath expression rewrites
//!
//! Three independent, purely textual rewrites applied to rule contexts and
//! assertion tests, in a fixed order:
//! 1. a leading wildcard step gets a `//` prefix (some engines, Saxon among
//!    them, match nothing on a bare leading `*`)
//! 2. whitespace around the `=` of an attribute selector is stripped
//! 3. a predicate that exactly repeats the following descendant step
//!    (`[X]/X`) is collapsed to `/X`
//!
//! Step 2 must run before step 3 so selector literals are already normalized
//! when compared for duplication. Every rewrite is a pure string function and
//! the whole pipeline is idempotent.

use regex::Regex;
use std::sync::LazyLock;

/// Whitespace around the equal sign of an attribute selector, e.g.
/// `[@root = '1.3']`
static ATTR_SELECTOR_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\[@[a-zA-Z0-9]+)\s*=\s*").expect("attribute selector pattern is valid")
});

/// Applies all rewrites to an XPath expression
pub fn rewrite(expression: &str) -> String {
    let fixed = fix_leading_wildcard(expression);
    let fixed = normalize_attribute_selectors(&fixed);
    collapse_duplicate_nesting(&fixed)
}

/// Prefixes an expression starting with a wildcard step with `//`
fn fix_leading_wildcard(expression: &str) -> String {
    if expression.starts_with('*') {
        format!("//{expression}")
    } else {
        expression.to_string()
    }
}

/// Strips whitespace around the `=` inside attribute selectors
fn normalize_attribute_selectors(expression: &str) -> String {
    ATTR_SELECTOR_WHITESPACE
        .replace_all(expression, "${1}=")
        .into_owned()
}

/// Collapses `[X]/X` to `/X` wherever the predicate literally repeats the
/// following descendant step
///
/// Only syntactic duplication is detected; the longest repeated text wins,
/// and scanning resumes after each collapsed region.
fn collapse_duplicate_nesting(expression: &str) -> String {
    let bytes = expression.as_bytes();
    let mut output = String::with_capacity(expression.len());
    let mut segment_start = 0;
    let mut position = 0;

    while position < bytes.len() {
        if bytes[position] == b'['
            && let Some((step, end)) = find_duplicate_nesting(expression, position)
        {
            output.push_str(&expression[segment_start..position]);
            output.push('/');
            output.push_str(step);
            position = end;
            segment_start = end;
        } else {
            position += 1;
        }
    }
    output.push_str(&expression[segment_start..]);
    output
}

/// Looks for `[X]/X` starting at the opening bracket, preferring the longest
/// candidate `X`; returns the repeated step and the position just past the
/// duplicate
fn find_duplicate_nesting(expression: &str, open: usize) -> Option<(&str, usize)> {
    let bytes = expression.as_bytes();
    for close in (open + 2..bytes.len()).rev() {
        if bytes[close] != b']' {
            continue;
        }
        let step = &expression[open + 1..close];
        if bytes.get(close + 1) == Some(&b'/') && expression[close + 2..].starts_with(step) {
            return Some((step, close + 2 + step.len()));
        }
    }
    None
}
