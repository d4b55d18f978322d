//! Document optimizer
//!
//! Runs after parsing and after any rewrite hooks, in three ordered steps:
//! 1. guard-rule severity forcing: the document's guard pattern (the first
//!    pattern holding exactly one rule) carries a single structural
//!    precondition assert whose role is unconditionally forced to "error",
//!    whatever the source declared
//! 2. optional role filtering: keep only asserts/reports with the requested
//!    role; the filter is type-based, so every `let` and `extends` child is
//!    dropped too, and inherited content is lost before the writer can
//!    resolve it
//! 3. path rewriting: every rule context and every assert test goes through
//!    the XPath rewriter; report tests are left untouched
//!
//! The role filter's interaction with 'extends' and the assert/report
//! rewrite asymmetry are deliberate reproductions of the dialect's
//! established behavior; see DESIGN.md.

use crate::error::PreconditionError;
use crate::model::{Definition, RuleChild};
use crate::xpath;

/// Optimizes a parsed definition in place
///
/// # Errors
///
/// Returns a `PreconditionError` if the guard rule cannot be located or its
/// first child is not an assert.
pub fn optimize(
    definition: &mut Definition,
    role_to_keep: Option<&str>,
) -> Result<(), PreconditionError> {
    force_guard_role(definition)?;
    if let Some(role) = role_to_keep {
        filter_by_role(definition, role);
    }
    rewrite_paths(definition);
    Ok(())
}

/// Forces the guard rule's first assertion to role "error"
fn force_guard_role(definition: &mut Definition) -> Result<(), PreconditionError> {
    let (pattern_id, rule_id) = definition
        .patterns
        .iter()
        .find_map(|pattern| {
            let rule_ids = definition.rules_per_pattern.get(&pattern.id)?;
            match rule_ids.as_slice() {
                [rule_id] => Some((pattern.id.clone(), rule_id.clone())),
                _ => None,
            }
        })
        .ok_or(PreconditionError::NoGuardPattern)?;

    let rule = definition.defined_rules.get_mut(&rule_id).ok_or_else(|| {
        PreconditionError::MissingGuardRule {
            pattern: pattern_id.clone(),
            rule: rule_id.clone(),
        }
    })?;

    match rule.children.first_mut() {
        Some(RuleChild::Assert(assertion)) => {
            assertion.role = Some("error".to_string());
            Ok(())
        }
        _ => Err(PreconditionError::GuardChildNotAssert {
            pattern: pattern_id,
            rule: rule_id,
        }),
    }
}

/// Keeps only asserts and reports carrying the given role
///
/// Filtering is type-based: `let` and `extends` children never match and are
/// always dropped.
fn filter_by_role(definition: &mut Definition, role: &str) {
    for rule in definition.defined_rules.values_mut() {
        rule.children.retain(|child| match child {
            RuleChild::Assert(assertion) => assertion.role.as_deref() == Some(role),
            RuleChild::Report(report) => report.role.as_deref() == Some(role),
            RuleChild::Let(_) | RuleChild::Extends(_) => false,
        });
    }
}

/// Rewrites every rule context and every assert test
fn rewrite_paths(definition: &mut Definition) {
    for rule in definition.defined_rules.values_mut() {
        if let Some(context) = &rule.context {
            rule.context = Some(xpath::rewrite(context));
        }
        for child in rule.children.iter_mut() {
            // Report tests are deliberately not rewritten
            if let RuleChild::Assert(assertion) = child {
                assertion.test = xpath::rewrite(&assertion.test);
            }
        }
    }
}
