use log::{debug, warn};
use serde::Serialize;

use crate::catalog::ProductCatalog;
use crate::data::recipe_loader::RecipeRecord;
use crate::error::LineError;
use crate::quantity_parser::{ParsedLabel, QuantityParser};
use crate::units::{validate_units, PhysicalQuantity, UnitRegistry};

/// One label attributed to an ingredient, parsed and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelQuantity {
    pub label: String,
    pub parsed: ParsedLabel,
    /// The parsed quantity after unit validation, or why it was rejected.
    pub validated: Result<PhysicalQuantity, LineError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientLabels {
    pub name: String,
    pub labels: Vec<LabelQuantity>,
}

/// Per recipe: canonical ingredient name → the labels that mention it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeIngredientMap {
    pub recipe_id: i64,
    pub ingredients: Vec<IngredientLabels>,
}

/// A line of the ingredient–recipe association table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientRecipeRow {
    pub recipe_id: i64,
    pub ingredient_id: usize,
    pub label: String,
    pub quantity: f64,
    pub unit: String,
}

impl RecipeIngredientMap {
    /// Every (ingredient name, label) pair in input order.
    pub fn lines(&self) -> impl Iterator<Item = (&str, &LabelQuantity)> {
        self.ingredients
            .iter()
            .flat_map(|ingredient| ingredient.labels.iter().map(move |label| (ingredient.name.as_str(), label)))
    }

    pub fn line_count(&self) -> usize {
        self.ingredients.iter().map(|i| i.labels.len()).sum()
    }

    /// Labels attributed to more than one ingredient, with every name they
    /// count for, in first-seen order. Each of those names costs the label.
    pub fn shared_labels(&self) -> Vec<(&str, Vec<&str>)> {
        let mut shared: Vec<(&str, Vec<&str>)> = Vec::new();
        for (name, line) in self.lines() {
            match shared.iter_mut().find(|(label, _)| *label == line.label) {
                Some((_, names)) => names.push(name),
                None => shared.push((line.label.as_str(), vec![name])),
            }
        }
        shared.retain(|(_, names)| names.len() > 1);
        shared
    }
}

/// Attributes each label to every canonical name it contains and parses it.
pub fn build_ingredient_map(
    registry: &UnitRegistry,
    parser: &QuantityParser<'_>,
    record: &RecipeRecord,
) -> RecipeIngredientMap {
    let lowered: Vec<String> = record.labels.iter().map(|(label, _)| label.to_lowercase()).collect();

    let ingredients = record
        .ingredient_names
        .iter()
        .map(|name| {
            let needle = name.to_lowercase();
            let labels = record
                .labels
                .iter()
                .zip(lowered.iter())
                .filter(|(_, lower)| !needle.is_empty() && lower.contains(&needle))
                .map(|((label, magnitude), _)| {
                    let parsed = parser.parse(label, *magnitude);
                    let validated = validate_units(registry, parsed.quantity.clone());
                    LabelQuantity { label: label.clone(), parsed, validated }
                })
                .collect::<Vec<_>>();

            if labels.is_empty() {
                warn!("Recipe {}: no label mentions ingredient '{}'", record.recipe_id, name);
            }
            IngredientLabels { name: name.clone(), labels }
        })
        .collect();

    let map = RecipeIngredientMap { recipe_id: record.recipe_id, ingredients };
    for (label, names) in map.shared_labels() {
        debug!("Recipe {}: label '{}' is costed once for each of {:?}", map.recipe_id, label, names);
    }
    map
}

/// Rows for the association table. Ingredients missing from the catalog
/// have no id and are left out.
pub fn association_rows(map: &RecipeIngredientMap, catalog: &ProductCatalog) -> Vec<IngredientRecipeRow> {
    let mut rows = Vec::new();
    for ingredient in &map.ingredients {
        let Some(ingredient_id) = catalog.alias_id(&ingredient.name) else {
            if !ingredient.labels.is_empty() {
                warn!("Recipe {}: ingredient '{}' is not in the price list", map.recipe_id, ingredient.name);
            }
            continue;
        };
        rows.extend(ingredient.labels.iter().map(|label| IngredientRecipeRow {
            recipe_id: map.recipe_id,
            ingredient_id,
            label: label.label.clone(),
            quantity: label.parsed.quantity.magnitude,
            unit: label.parsed.quantity.unit.name.clone(),
        }));
    }
    rows
}
