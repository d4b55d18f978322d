//! The root aggregate of a parsed Schematron document

use crate::error::ReferenceError;
use crate::model::pattern::Pattern;
use crate::model::rule::{Rule, RuleChild};
use std::collections::{BTreeMap, HashMap};

/// Data structure of a parsed Schematron document
///
/// Built once by the parser, mutated in place by rewrite hooks and the
/// optimizer, and consumed exactly once by the writer.
#[derive(Debug, Clone, Default)]
pub struct Definition {
    /// All defined rules, abstract or not, keyed by rule id
    pub defined_rules: HashMap<String, Rule>,

    /// The patterns in document order; see [`Definition::push_pattern`] for
    /// the deduplication behavior
    pub patterns: Vec<Pattern>,

    /// The ids of enabled top-level rules, in document order
    ///
    /// Populated for non-abstract pattern-less rules but not consumed by the
    /// optimizer or the writer; reserved for a phase/activation feature.
    pub enabled_rules: Vec<String>,

    /// Non-abstract rule ids per pattern id, in document order; an entry
    /// exists for every registered pattern, even when empty
    pub rules_per_pattern: HashMap<String, Vec<String>>,

    /// Declared namespaces, prefix to URI; ordered by prefix so the written
    /// output is deterministic
    pub namespaces: BTreeMap<String, String>,

    /// The document title, empty when absent
    pub title: String,

    /// The expression dialect tag (e.g. "xslt2"), opaque here
    pub query_binding: String,
}

impl Definition {
    /// Creates an empty definition
    pub fn new() -> Self {
        Definition::default()
    }

    /// Appends a pattern, keeping document order
    ///
    /// Two patterns with identical id, abstractness and title collapse into
    /// one even if they came from distinct source elements. This mirrors the
    /// dialect's set semantics; see DESIGN.md before changing it.
    pub fn push_pattern(&mut self, pattern: Pattern) {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }

    /// Records a top-level rule id as enabled, keeping insertion order and
    /// ignoring duplicates
    pub fn enable_rule(&mut self, rule_id: &str) {
        if !self.enabled_rules.iter().any(|id| id == rule_id) {
            self.enabled_rules.push(rule_id.to_string());
        }
    }

    /// Removes a rule wholesale: from the defined rules, the enabled set and
    /// every per-pattern listing
    pub fn remove_rule(&mut self, rule_id: &str) {
        self.defined_rules.remove(rule_id);
        self.enabled_rules.retain(|id| id != rule_id);
        for rule_ids in self.rules_per_pattern.values_mut() {
            rule_ids.retain(|id| id != rule_id);
        }
    }

    /// Gets a rule by id and resolves it: all extended rules are inlined, so
    /// the returned rule no longer carries 'extends' references
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::UndefinedRule` if the id is unknown,
    /// `ReferenceError::UnknownRule` if an 'extends' target does not exist,
    /// and `ReferenceError::CircularExtends` if the extends chain loops.
    pub fn resolved_rule(&self, rule_id: &str) -> Result<Rule, ReferenceError> {
        let rule = self
            .defined_rules
            .get(rule_id)
            .ok_or_else(|| ReferenceError::UndefinedRule(rule_id.to_string()))?;
        let mut active_chain = vec![rule.id.clone()];
        let mut resolved = rule.clone();
        resolved.children = self.resolve_children(rule, &mut active_chain)?;
        Ok(resolved)
    }

    /// Resolves the children of a rule recursively
    ///
    /// Only the first 'extends' child of each rule is processed; the
    /// inherited children are spliced at the position it occupied, preserving
    /// their order and the order of the surrounding children. The active
    /// chain turns a cyclic reference into an error instead of infinite
    /// recursion.
    fn resolve_children(
        &self,
        rule: &Rule,
        active_chain: &mut Vec<String>,
    ) -> Result<Vec<RuleChild>, ReferenceError> {
        let mut children = rule.children.clone();
        let extends_entry = children.iter().enumerate().find_map(|(index, child)| {
            match child {
                RuleChild::Extends(extends) => Some((index, extends.rule.clone())),
                _ => None,
            }
        });

        if let Some((index, target_id)) = extends_entry {
            children.remove(index);
            let target =
                self.defined_rules
                    .get(&target_id)
                    .ok_or_else(|| ReferenceError::UnknownRule {
                        from: rule.id.clone(),
                        target: target_id.clone(),
                    })?;
            if active_chain.iter().any(|id| *id == target_id) {
                return Err(ReferenceError::CircularExtends(target_id));
            }
            active_chain.push(target_id);
            let inherited = self.resolve_children(target, active_chain)?;
            active_chain.pop();
            children.splice(index..index, inherited);
        }
        Ok(children)
    }
}
