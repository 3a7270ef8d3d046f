//! Manufacturer normalization to the tracked commercial OEMs.

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::rules::{Field, Pattern, Rule, RuleSet, Subject};

/// Label used for manufacturers outside the tracked set.
pub const UNTRACKED_OEM: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Oem {
    Airbus,
    Boeing,
    Embraer,
    Bombardier,
    #[serde(rename = "ATR")]
    Atr,
}

impl Oem {
    pub fn label(&self) -> &'static str {
        match self {
            Oem::Airbus => "Airbus",
            Oem::Boeing => "Boeing",
            Oem::Embraer => "Embraer",
            Oem::Bombardier => "Bombardier",
            Oem::Atr => "ATR",
        }
    }

    /// Label for an optional OEM, `"none"` when untracked.
    pub fn label_or_none(oem: Option<Oem>) -> &'static str {
        oem.as_ref().map_or(UNTRACKED_OEM, Oem::label)
    }
}

impl fmt::Display for Oem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// A prefix rule also covers the exact name ("EMBRAER", "ATR").
static BUILTIN_OEM_RULES: LazyLock<RuleSet<Oem>> = LazyLock::new(|| {
    RuleSet::new(
        [
            ("AIRBUS", Oem::Airbus),
            ("BOEING", Oem::Boeing),
            ("EMBRAER", Oem::Embraer),
            ("BOMBARDIER", Oem::Bombardier),
            ("ATR", Oem::Atr),
        ]
        .into_iter()
        .map(|(prefix, oem)| Rule::new(Field::Manufacturer, Pattern::prefix(prefix), oem))
        .collect(),
    )
});

#[derive(Debug, Clone)]
pub struct OemNormalizer {
    rules: RuleSet<Oem>,
}

impl Default for OemNormalizer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OemNormalizer {
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_OEM_RULES.clone(),
        }
    }

    pub fn rules(&self) -> &RuleSet<Oem> {
        &self.rules
    }

    /// Matches the trimmed manufacturer text case-insensitively.
    pub fn normalize(&self, manufacturer: Option<&str>) -> Option<Oem> {
        let text = manufacturer.map(|s| s.trim().to_uppercase());
        self.rules
            .evaluate(&Subject::manufacturer(text.as_deref()))
            .copied()
    }
}
