//! Aircraft category classification.
//!
//! Rules run against the upper-cased, trimmed model key (and manufacturer for
//! the helicopter rule) in this order, first match wins:
//!
//! | # | Category             | Test                                              |
//! |---|----------------------|---------------------------------------------------|
//! | 1 | Helicopter           | rotorcraft family prefix, or manufacturer contains `HELICOPTER` |
//! | 2 | Military/State       | explicit type list, or fighter/cargo letter+digits |
//! | 3 | Commercial Jet       | Airbus, Boeing or Embraer E-jet numeric prefix    |
//! | 4 | Commercial Turboprop | ATR, de Havilland / Dash 8, Saab                  |
//! | 5 | General Aviation     | light-aircraft and business-jet prefixes          |
//! | - | Other                | nothing matched                                   |

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::rules::{Field, Pattern, Rule, RuleSet, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AircraftCategory {
    Helicopter,
    #[serde(rename = "Military/State")]
    MilitaryState,
    #[serde(rename = "Commercial Jet")]
    CommercialJet,
    #[serde(rename = "Commercial Turboprop")]
    CommercialTurboprop,
    #[serde(rename = "General Aviation")]
    GeneralAviation,
    Other,
}

impl AircraftCategory {
    pub fn label(&self) -> &'static str {
        match self {
            AircraftCategory::Helicopter => "Helicopter",
            AircraftCategory::MilitaryState => "Military/State",
            AircraftCategory::CommercialJet => "Commercial Jet",
            AircraftCategory::CommercialTurboprop => "Commercial Turboprop",
            AircraftCategory::GeneralAviation => "General Aviation",
            AircraftCategory::Other => "Other",
        }
    }
}

impl fmt::Display for AircraftCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const MILITARY_TYPES: &[&str] = &[
    "C130", "C30J", "A400", "K35R", "KC10", "E3TF", "E3CF", "P3", "P8", "TEX2", "U2", "B52",
    "B1", "B2", "A10",
];

fn regex(pattern: &str) -> Pattern {
    Pattern::Regex(Regex::new(pattern).expect("Invalid category regex"))
}

static BUILTIN_CATEGORY_RULES: LazyLock<RuleSet<AircraftCategory>> = LazyLock::new(|| {
    use AircraftCategory as C;

    let mut rules = RuleSet::new(vec![
        Rule::new(
            Field::ModelKey,
            regex(concat!(
                r"^(AS\d{2}|EC\d{2}|H1\d{2}|R22|R44|R66|B06|B47G|B4[0-2]\d|S61|S76|S92",
                r"|AW\d{3}|A1\d{2}|MI\d|KA\d{2}|UH\d|BK17|EH10|NH90",
                r"|EUROCOPTER|ROBINSON|SIKORSKY)",
            )),
            C::Helicopter,
        ),
        Rule::new(Field::Manufacturer, Pattern::contains("HELICOPTER"), C::Helicopter),
    ]);

    for code in MILITARY_TYPES {
        rules.push(Rule::new(Field::ModelKey, Pattern::exact(*code), C::MilitaryState));
    }

    for rule in [
        Rule::new(
            Field::ModelKey,
            regex(r"^(F(14|15|16|18|22|35)|C(5|17)|KC\d{2,3})[A-Z]?$"),
            C::MilitaryState,
        ),
        Rule::new(
            Field::ModelKey,
            regex(r"^(AIRBUS )?A(3\d|[12]\dN|22\d)|^BCS[13]$"),
            C::CommercialJet,
        ),
        Rule::new(
            Field::ModelKey,
            regex(r"^B7\d[0-9A-Z]$|^B3[789X]M$|^BOEING 7\d7"),
            C::CommercialJet,
        ),
        Rule::new(
            Field::ModelKey,
            regex(r"^(EMBRAER )?E(1[3-9]\d|29\d|75[LS]?$)"),
            C::CommercialJet,
        ),
        Rule::new(
            Field::ModelKey,
            regex(r"^(ATR|AT[4-7]\d|DH8|DHC|DE HAVILLAND|DASH|BOMBARDIER (DASH|Q)|SF3|SB20|SAAB)"),
            C::CommercialTurboprop,
        ),
        Rule::new(
            Field::ModelKey,
            regex(concat!(
                r"^(C1\d{2}|C2\d[0-9A-Z]|C3\d{2}|C4\d{2}|C5\d[0-9A-Z]|C6\d{2}|C7\d{2}",
                r"|P28|P32|P46|PA\d{2}|BE\d{1,2}|SR2\d|DA[2-6]\d|PC\d{1,2}|TBM|M20",
                r"|CL[36]\d|GLF|GLEX|LJ\d{2}|F2TH|FA\d{1,2}|F900|E5[05]P|PRM1|H25|HA4T",
                r"|CESSNA|PIPER|BEECH|CIRRUS|DIAMOND)",
            )),
            C::GeneralAviation,
        ),
    ] {
        rules.push(rule);
    }

    rules
});

#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: RuleSet<AircraftCategory>,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryClassifier {
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_CATEGORY_RULES.clone(),
        }
    }

    pub fn rules(&self) -> &RuleSet<AircraftCategory> {
        &self.rules
    }

    /// Total: every input gets exactly one category, `Other` by default.
    pub fn classify(
        &self,
        model_key: Option<&str>,
        manufacturer: Option<&str>,
    ) -> AircraftCategory {
        let model_key = model_key.map(|s| s.trim().to_uppercase());
        let manufacturer = manufacturer.map(|s| s.trim().to_uppercase());
        let subject = Subject {
            model_key: model_key.as_deref(),
            manufacturer: manufacturer.as_deref(),
        };

        self.rules
            .evaluate(&subject)
            .copied()
            .unwrap_or(AircraftCategory::Other)
    }
}
