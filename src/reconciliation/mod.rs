//! # Dimensional Reconciliation
//!
//! When a recipe measures an ingredient in one dimension (a cup of onion)
//! and the store sells it in another (onions by the kilogram), the line
//! can only be costed after converting across dimensions. That takes
//! ingredient knowledge, kept here as an ordered table of rules.

pub mod rules;

use std::collections::HashMap;

use log::debug;

use crate::error::{LineError, RuleError};
use crate::units::{DimensionClass, PhysicalQuantity, UnitRegistry};
pub use rules::{default_rules, load_rules, ReconciliationRule, RuleAmount};

#[derive(Debug, Clone)]
struct DirectedRule {
    matcher: String,
    from: PhysicalQuantity,
    to: PhysicalQuantity,
}

impl DirectedRule {
    fn matches(&self, name: &str) -> bool {
        contains_word(name, &self.matcher)
    }

    fn apply(&self, quantity: &PhysicalQuantity) -> PhysicalQuantity {
        let scale = quantity.base_magnitude() / self.from.base_magnitude();
        PhysicalQuantity::new(self.to.magnitude * scale, self.to.unit.clone())
    }
}

/// Rules compiled against a registry and grouped by the directed
/// (recipe class, product class) pair they convert between. Each branch
/// keeps table order.
#[derive(Debug, Clone)]
pub struct ReconciliationTable {
    branches: HashMap<(DimensionClass, DimensionClass), Vec<DirectedRule>>,
}

impl ReconciliationTable {
    pub fn new(registry: &UnitRegistry, rules: &[ReconciliationRule]) -> Result<Self, RuleError> {
        let mut branches: HashMap<(DimensionClass, DimensionClass), Vec<DirectedRule>> = HashMap::new();

        for (index, rule) in rules.iter().enumerate() {
            let (from, from_class) = compile_amount(registry, index, rule, &rule.from)?;
            let (to, to_class) = compile_amount(registry, index, rule, &rule.to)?;
            if from_class == to_class {
                return Err(RuleError::SameDimension { index, matcher: rule.matcher.clone(), class: from_class });
            }

            let matcher = rule.matcher.trim().to_lowercase();
            branches.entry((from_class, to_class)).or_default().push(DirectedRule {
                matcher: matcher.clone(),
                from: from.clone(),
                to: to.clone(),
            });
            if rule.reversible {
                branches.entry((to_class, from_class)).or_default().push(DirectedRule { matcher, from: to, to: from });
            }
        }

        Ok(Self { branches })
    }

    pub fn with_defaults(registry: &UnitRegistry) -> Result<Self, RuleError> {
        Self::new(registry, &default_rules())
    }

    /// `overrides` are consulted before the built-in rules.
    pub fn with_overrides(registry: &UnitRegistry, overrides: Vec<ReconciliationRule>) -> Result<Self, RuleError> {
        let mut rules = overrides;
        rules.extend(default_rules());
        Self::new(registry, &rules)
    }

    /// Brings `quantity` into the dimension of `product`.
    ///
    /// Compatible quantities come back unchanged. Otherwise the first rule in
    /// the matching branch whose matcher appears as a word of the ingredient
    /// name converts it. Symbolic quantities (`to_taste`) never convert.
    pub fn reconcile(
        &self,
        ingredient: &str,
        quantity: &PhysicalQuantity,
        product: &PhysicalQuantity,
    ) -> Result<PhysicalQuantity, LineError> {
        if quantity.is_compatible_with(product) {
            return Ok(quantity.clone());
        }

        let unresolved = || LineError::Unreconciled {
            ingredient: ingredient.to_string(),
            quantity: quantity.to_string(),
            quantity_dimensionality: quantity.dimensionality(),
            product: product.to_string(),
            product_dimensionality: product.dimensionality(),
        };

        if quantity.unit.symbolic {
            return Err(unresolved());
        }
        let (Some(source), Some(target)) = (quantity.class(), product.class()) else {
            return Err(unresolved());
        };

        let name = ingredient.to_lowercase();
        let rule = self
            .branches
            .get(&(source, target))
            .and_then(|branch| branch.iter().find(|rule| rule.matches(&name)))
            .ok_or_else(unresolved)?;

        let converted = rule.apply(quantity);
        debug!(
            "Reconciled '{}': {} -> {} (rule '{}': {} = {})",
            ingredient, quantity, converted, rule.matcher, rule.from, rule.to
        );
        Ok(converted)
    }
}

/// Whether `word` occurs in `name` as a whole word, allowing a plural
/// `s`/`es`. `egg` matches "eggs" and "egg whites" but not "eggplant".
/// An empty word matches everything.
fn contains_word(name: &str, word: &str) -> bool {
    if word.is_empty() {
        return true;
    }
    let is_boundary = |c: Option<char>| c.map_or(true, |c| !c.is_alphanumeric());

    name.match_indices(word).any(|(start, _)| {
        if !is_boundary(name[..start].chars().next_back()) {
            return false;
        }
        let rest = &name[start + word.len()..];
        [Some(rest), rest.strip_prefix("es"), rest.strip_prefix('s')]
            .into_iter()
            .flatten()
            .any(|tail| is_boundary(tail.chars().next()))
    })
}

fn compile_amount(
    registry: &UnitRegistry,
    index: usize,
    rule: &ReconciliationRule,
    amount: &RuleAmount,
) -> Result<(PhysicalQuantity, DimensionClass), RuleError> {
    if !(amount.magnitude.is_finite() && amount.magnitude > 0.0) {
        return Err(RuleError::NonPositive { index, matcher: rule.matcher.clone() });
    }
    let quantity = registry.quantity(amount.magnitude, &amount.unit).ok_or_else(|| RuleError::UnknownUnit {
        index,
        matcher: rule.matcher.clone(),
        unit: amount.unit.clone(),
    })?;
    match quantity.class() {
        Some(class) => Ok((quantity, class)),
        None => Err(RuleError::InvalidUnit { index, matcher: rule.matcher.clone(), unit: amount.unit.clone() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Dimensionality;

    fn registry() -> UnitRegistry {
        UnitRegistry::with_custom_units().unwrap()
    }

    fn q(r: &UnitRegistry, magnitude: f64, unit: &str) -> PhysicalQuantity {
        r.quantity(magnitude, unit).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
    }

    #[test]
    fn test_compatible_quantities_pass_through() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();
        let recipe = q(&r, 2.0, "cup");
        let out = table.reconcile("milk", &recipe, &q(&r, 1.0, "liter")).unwrap();
        assert_eq!(out, recipe);
    }

    #[test]
    fn test_onion_cup_to_mass_uses_ingredient_rule() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();
        let out = table.reconcile("onion", &q(&r, 1.0, "cup"), &q(&r, 1.0, "kilogram")).unwrap();
        assert_eq!(out.unit.name, "gram");
        assert_close(out.magnitude, 200.0);
    }

    #[test]
    fn test_onion_count_depends_on_target_dimension() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();

        let by_mass = table.reconcile("red onion", &q(&r, 2.0, "each"), &q(&r, 1.0, "kilogram")).unwrap();
        assert_close(by_mass.magnitude, 400.0);
        assert_eq!(by_mass.unit.name, "gram");

        let by_volume = table.reconcile("red onion", &q(&r, 2.0, "each"), &q(&r, 1.0, "liter")).unwrap();
        assert_close(by_volume.magnitude, 2.0);
        assert_eq!(by_volume.unit.name, "cup");
    }

    #[test]
    fn test_reverse_direction_divides() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();
        // Recipe asks for 400 g of tomatoes, store sells them individually.
        let out = table.reconcile("tomato", &q(&r, 0.4, "kilogram"), &q(&r, 1.0, "each")).unwrap();
        assert_eq!(out.unit.name, "each");
        assert_close(out.magnitude, 400.0 / 120.0);
    }

    #[test]
    fn test_lemon_and_garlic_constants() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();

        let lemon = table.reconcile("lemon juice", &q(&r, 3.0, "each"), &q(&r, 500.0, "milliliter")).unwrap();
        assert_eq!(lemon.unit.name, "tablespoon");
        assert_close(lemon.magnitude, 3.0);

        let garlic = table.reconcile("garlic", &q(&r, 1.0, "each"), &q(&r, 200.0, "milliliter")).unwrap();
        assert_close(garlic.magnitude, 100.0);
    }

    #[test]
    fn test_more_specific_rule_wins() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();
        let out = table.reconcile("eggplant", &q(&r, 1.0, "each"), &q(&r, 1.0, "kilogram")).unwrap();
        assert_close(out.magnitude, 450.0);
        let out = table.reconcile("egg", &q(&r, 1.0, "each"), &q(&r, 1.0, "kilogram")).unwrap();
        assert_close(out.magnitude, 50.0);
    }

    #[test]
    fn test_short_matchers_do_not_catch_longer_names() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();

        let pineapple = table.reconcile("pineapple", &q(&r, 1.0, "each"), &q(&r, 1.0, "kilogram"));
        assert!(matches!(pineapple, Err(LineError::Unreconciled { .. })));

        let eggplant = table.reconcile("eggplant", &q(&r, 1.0, "each"), &q(&r, 1.0, "liter"));
        assert!(matches!(eggplant, Err(LineError::Unreconciled { .. })));

        let lemongrass = table.reconcile("lemongrass", &q(&r, 1.0, "each"), &q(&r, 500.0, "milliliter"));
        assert!(matches!(lemongrass, Err(LineError::Unreconciled { .. })));

        // Falls through to water density, not 227 g per cup of butter.
        let squash = table.reconcile("butternut squash", &q(&r, 1.0, "cup"), &q(&r, 1.0, "kilogram")).unwrap();
        let cup_ml = q(&r, 1.0, "cup").base_magnitude() * 1e6;
        assert_close(squash.magnitude, cup_ml);
    }

    #[test]
    fn test_matchers_accept_plurals_and_other_words() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();

        let eggs = table.reconcile("eggs", &q(&r, 2.0, "each"), &q(&r, 1.0, "kilogram")).unwrap();
        assert_close(eggs.magnitude, 100.0);
        let tomatoes = table.reconcile("cherry tomatoes", &q(&r, 2.0, "each"), &q(&r, 1.0, "kilogram")).unwrap();
        assert_close(tomatoes.magnitude, 240.0);
        let butter = table.reconcile("unsalted butter", &q(&r, 1.0, "cup"), &q(&r, 1.0, "kilogram")).unwrap();
        assert_close(butter.magnitude, 227.0);
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("red onion", "onion"));
        assert!(contains_word("onions, sliced", "onion"));
        assert!(contains_word("egg whites", "egg"));
        assert!(contains_word("anything", ""));
        assert!(!contains_word("eggplant", "egg"));
        assert!(!contains_word("eggshell", "egg"));
        assert!(!contains_word("pineapple", "apple"));
        assert!(!contains_word("butternut squash", "butter"));
    }

    #[test]
    fn test_water_density_for_unknown_volume_to_mass() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();
        let out = table.reconcile("soy sauce", &q(&r, 2.0, "tablespoon"), &q(&r, 1.0, "kilogram")).unwrap();
        assert_eq!(out.unit.name, "gram");
        let tbsp_ml = q(&r, 1.0, "tablespoon").base_magnitude() * 1e6;
        assert_close(out.magnitude, 2.0 * tbsp_ml);

        let back = table.reconcile("soy sauce", &q(&r, 250.0, "gram"), &q(&r, 1.0, "liter")).unwrap();
        assert_eq!(back.unit.name, "milliliter");
        assert_close(back.magnitude, 250.0);
    }

    #[test]
    fn test_unknown_count_is_unresolvable() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();
        let err = table.reconcile("vanilla bean", &q(&r, 1.0, "each"), &q(&r, 100.0, "gram")).unwrap_err();
        assert_eq!(
            err,
            LineError::Unreconciled {
                ingredient: "vanilla bean".to_string(),
                quantity: "1 each".to_string(),
                quantity_dimensionality: Dimensionality::DIMENSIONLESS,
                product: "100 gram".to_string(),
                product_dimensionality: Dimensionality::MASS,
            }
        );
    }

    #[test]
    fn test_to_taste_never_converts() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();
        let err = table.reconcile("salt", &q(&r, 1.0, "to_taste"), &q(&r, 500.0, "gram")).unwrap_err();
        assert!(matches!(err, LineError::Unreconciled { .. }));

        // Same dimension needs no conversion, so it still passes.
        assert!(table.reconcile("salt", &q(&r, 1.0, "to_taste"), &q(&r, 1.0, "liter")).is_ok());
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let r = registry();
        let table = ReconciliationTable::with_defaults(&r).unwrap();
        let cases = [
            ("onion", q(&r, 1.5, "cup"), q(&r, 1.0, "kilogram")),
            ("vanilla bean", q(&r, 1.0, "each"), q(&r, 100.0, "gram")),
            ("carrot", q(&r, 3.0, "each"), q(&r, 1.0, "pound")),
        ];
        for (name, recipe, product) in cases.iter() {
            assert_eq!(table.reconcile(name, recipe, product), table.reconcile(name, recipe, product));
        }
    }

    #[test]
    fn test_overrides_take_priority() {
        let r = registry();
        let overrides = vec![ReconciliationRule::new("onion", (1.0, "cup"), (160.0, "gram"))];
        let table = ReconciliationTable::with_overrides(&r, overrides).unwrap();
        let out = table.reconcile("onion", &q(&r, 1.0, "cup"), &q(&r, 1.0, "kilogram")).unwrap();
        assert_close(out.magnitude, 160.0);
    }

    #[test]
    fn test_one_way_rule_has_no_reverse() {
        let r = registry();
        let rules = vec![ReconciliationRule::new("fig", (1.0, "each"), (50.0, "gram")).one_way()];
        let table = ReconciliationTable::new(&r, &rules).unwrap();
        assert!(table.reconcile("fig", &q(&r, 1.0, "each"), &q(&r, 1.0, "kilogram")).is_ok());
        assert!(table.reconcile("fig", &q(&r, 100.0, "gram"), &q(&r, 1.0, "each")).is_err());
    }

    #[test]
    fn test_bad_rules_are_rejected() {
        let r = registry();
        let same = vec![ReconciliationRule::new("oil", (1.0, "cup"), (1.0, "liter"))];
        assert!(matches!(ReconciliationTable::new(&r, &same), Err(RuleError::SameDimension { .. })));

        let unknown = vec![ReconciliationRule::new("oil", (1.0, "glug"), (10.0, "gram"))];
        assert!(matches!(ReconciliationTable::new(&r, &unknown), Err(RuleError::UnknownUnit { .. })));

        let invalid = vec![ReconciliationRule::new("ginger", (1.0, "inch"), (10.0, "gram"))];
        assert!(matches!(ReconciliationTable::new(&r, &invalid), Err(RuleError::InvalidUnit { .. })));

        let zero = vec![ReconciliationRule::new("oil", (0.0, "cup"), (10.0, "gram"))];
        assert!(matches!(ReconciliationTable::new(&r, &zero), Err(RuleError::NonPositive { .. })));
    }
}
