//! Ordered, first-match-wins rule evaluation.
//!
//! Every lookup table in the crate (year estimation, aircraft category, OEM)
//! is a [`RuleSet`]: an explicit ordered list of `(field, pattern) -> outcome`
//! entries. Evaluation walks the list and returns the outcome of the first
//! rule whose pattern matches. Rule order is part of the table's contract.

pub mod table;

use regex::Regex;

/// Which input field a rule is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ModelKey,
    Manufacturer,
}

/// The text a rule set is evaluated over.
///
/// Callers prepare the text (trimming, upper-casing) before building a
/// subject; patterns compare against it as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct Subject<'a> {
    pub model_key: Option<&'a str>,
    pub manufacturer: Option<&'a str>,
}

impl<'a> Subject<'a> {
    pub fn model(model_key: Option<&'a str>) -> Self {
        Self {
            model_key,
            manufacturer: None,
        }
    }

    pub fn manufacturer(manufacturer: Option<&'a str>) -> Self {
        Self {
            model_key: None,
            manufacturer,
        }
    }

    fn field(&self, field: Field) -> Option<&'a str> {
        match field {
            Field::ModelKey => self.model_key,
            Field::Manufacturer => self.manufacturer,
        }
    }
}

/// A single matcher. Literal patterns are case-sensitive.
#[derive(Debug, Clone)]
pub enum Pattern {
    Prefix(String),
    Exact(String),
    Contains(String),
    Regex(Regex),
}

impl Pattern {
    pub fn prefix(s: impl Into<String>) -> Self {
        Pattern::Prefix(s.into())
    }

    pub fn exact(s: impl Into<String>) -> Self {
        Pattern::Exact(s.into())
    }

    pub fn contains(s: impl Into<String>) -> Self {
        Pattern::Contains(s.into())
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Pattern::Prefix(p) => text.starts_with(p.as_str()),
            Pattern::Exact(p) => text == p,
            Pattern::Contains(p) => text.contains(p.as_str()),
            Pattern::Regex(re) => re.is_match(text),
        }
    }

    /// Short human-readable form, used by the `rules` listing.
    pub fn describe(&self) -> String {
        match self {
            Pattern::Prefix(p) => format!("prefix {p:?}"),
            Pattern::Exact(p) => format!("exact {p:?}"),
            Pattern::Contains(p) => format!("contains {p:?}"),
            Pattern::Regex(re) => format!("regex /{}/", re.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule<T> {
    pub field: Field,
    pub pattern: Pattern,
    pub outcome: T,
}

impl<T> Rule<T> {
    pub fn new(field: Field, pattern: Pattern, outcome: T) -> Self {
        Self {
            field,
            pattern,
            outcome,
        }
    }

    fn matches(&self, subject: &Subject<'_>) -> bool {
        subject
            .field(self.field)
            .is_some_and(|text| self.pattern.matches(text))
    }
}

/// A later rule that can never fire because an earlier rule on the same
/// field catches every input it would match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadowed {
    pub earlier: usize,
    pub later: usize,
}

/// An ordered rule list evaluated first-match-wins.
#[derive(Debug, Clone)]
pub struct RuleSet<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Default for RuleSet<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> RuleSet<T> {
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: Rule<T>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    /// Returns the index and outcome of the first matching rule.
    pub fn first_match(&self, subject: &Subject<'_>) -> Option<(usize, &T)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(subject))
            .map(|(idx, rule)| (idx, &rule.outcome))
    }

    pub fn evaluate(&self, subject: &Subject<'_>) -> Option<&T> {
        self.first_match(subject).map(|(_, outcome)| outcome)
    }

    /// Lists rules made unreachable by an earlier rule.
    ///
    /// Only literal patterns are compared: an earlier prefix shadows any later
    /// prefix/exact literal it starts, equal exact literals shadow each other,
    /// and an earlier contains-literal shadows any later contains, prefix or
    /// exact literal that includes it. Regex rules are never reported.
    pub fn shadowed(&self) -> Vec<Shadowed> {
        let mut found = Vec::new();

        for (later, rule) in self.rules.iter().enumerate() {
            let earlier = self.rules[..later].iter().position(|prev| {
                prev.field == rule.field && literal_covers(&prev.pattern, &rule.pattern)
            });
            if let Some(earlier) = earlier {
                found.push(Shadowed { earlier, later });
            }
        }

        found
    }
}

fn literal_covers(earlier: &Pattern, later: &Pattern) -> bool {
    match (earlier, later) {
        (Pattern::Prefix(a), Pattern::Prefix(b) | Pattern::Exact(b)) => b.starts_with(a.as_str()),
        (Pattern::Exact(a), Pattern::Exact(b)) => a == b,
        (Pattern::Contains(a), Pattern::Contains(b) | Pattern::Prefix(b) | Pattern::Exact(b)) => {
            b.contains(a.as_str())
        }
        _ => false,
    }
}
