use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An amount written as it would be in a recipe, e.g. `1 cup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAmount {
    pub magnitude: f64,
    pub unit: String,
}

/// "For ingredients whose name contains the word `matcher`, `from` is about `to`."
///
/// The two sides must belong to different dimension classes (count, mass,
/// volume). A reversible rule also converts from `to` back to `from`. The
/// matcher may be plural in the name ("eggs") but not part of a longer
/// word ("eggplant"). An empty matcher applies to every ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRule {
    pub matcher: String,
    pub from: RuleAmount,
    pub to: RuleAmount,
    #[serde(default = "default_reversible")]
    pub reversible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn default_reversible() -> bool {
    true
}

impl ReconciliationRule {
    pub fn new(matcher: &str, from: (f64, &str), to: (f64, &str)) -> Self {
        Self {
            matcher: matcher.to_string(),
            from: RuleAmount { magnitude: from.0, unit: from.1.to_string() },
            to: RuleAmount { magnitude: to.0, unit: to.1.to_string() },
            reversible: true,
            note: None,
        }
    }

    pub fn one_way(mut self) -> Self {
        self.reversible = false;
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }
}

/// Built-in culinary approximations, most specific first. These are rough
/// kitchen conversions, not measured densities; override them with a rules
/// file where better numbers exist.
pub fn default_rules() -> Vec<ReconciliationRule> {
    vec![
        ReconciliationRule::new("garlic", (1.0, "each"), (100.0, "milliliter")),
        ReconciliationRule::new("garlic", (1.0, "each"), (5.0, "gram")),
        ReconciliationRule::new("lemon", (1.0, "each"), (1.0, "tablespoon")).with_note("a third of 3 tablespoons of juice"),
        ReconciliationRule::new("lime", (1.0, "each"), (2.0, "tablespoon")),
        ReconciliationRule::new("onion", (1.0, "cup"), (200.0, "gram")),
        ReconciliationRule::new("onion", (1.0, "each"), (200.0, "gram")),
        ReconciliationRule::new("onion", (1.0, "each"), (1.0, "cup")),
        ReconciliationRule::new("eggplant", (1.0, "each"), (450.0, "gram")),
        ReconciliationRule::new("egg", (1.0, "each"), (50.0, "gram")),
        ReconciliationRule::new("egg", (1.0, "each"), (3.0, "tablespoon")),
        ReconciliationRule::new("tomato", (1.0, "each"), (120.0, "gram")),
        ReconciliationRule::new("potato", (1.0, "each"), (200.0, "gram")),
        ReconciliationRule::new("carrot", (1.0, "each"), (60.0, "gram")),
        ReconciliationRule::new("celery", (1.0, "each"), (40.0, "gram")),
        ReconciliationRule::new("apple", (1.0, "each"), (180.0, "gram")),
        ReconciliationRule::new("banana", (1.0, "each"), (120.0, "gram")),
        ReconciliationRule::new("butter", (1.0, "cup"), (227.0, "gram")),
        ReconciliationRule::new("flour", (1.0, "cup"), (125.0, "gram")),
        ReconciliationRule::new("sugar", (1.0, "cup"), (200.0, "gram")),
        ReconciliationRule::new("", (1.0, "milliliter"), (1.0, "gram")).with_note("density of water"),
    ]
}

/// Reads a JSON array of rules.
pub fn load_rules(path: &Path) -> Result<Vec<ReconciliationRule>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read reconciliation rules from {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse reconciliation rules in {:?}", path))
}
