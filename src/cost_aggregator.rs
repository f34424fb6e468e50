use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

use crate::catalog::ProductCatalog;
use crate::error::LineError;
use crate::reconciliation::ReconciliationTable;
use crate::recipe_mapper::RecipeIngredientMap;
use crate::units::PhysicalQuantity;

/// How a recipe's lines fared.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub costed: usize,
    pub invalid_units: usize,
    pub unreconciled: usize,
    pub missing_product: usize,
}

impl LineStats {
    pub fn skipped(&self) -> usize {
        self.invalid_units + self.unreconciled + self.missing_product
    }

    fn record_skip(&mut self, error: &LineError) {
        match error {
            LineError::MissingProduct(_) => self.missing_product += 1,
            LineError::Unreconciled { .. } => self.unreconciled += 1,
            LineError::InvalidUnits { .. } | LineError::UnknownUnit(_) | LineError::UnparseableQuantity { .. } => {
                self.invalid_units += 1
            }
        }
    }
}

impl AddAssign for LineStats {
    fn add_assign(&mut self, other: Self) {
        self.costed += other.costed;
        self.invalid_units += other.invalid_units;
        self.unreconciled += other.unreconciled;
        self.missing_product += other.missing_product;
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeCost {
    pub recipe_id: i64,
    pub total: f64,
    pub stats: LineStats,
}

/// Prices a recipe's lines against the catalog, reconciling units where the
/// recipe and the product disagree.
pub struct CostAggregator<'a> {
    catalog: &'a ProductCatalog,
    table: &'a ReconciliationTable,
}

impl<'a> CostAggregator<'a> {
    pub fn new(catalog: &'a ProductCatalog, table: &'a ReconciliationTable) -> Self {
        Self { catalog, table }
    }

    /// `(quantity / product quantity) × product price` for one validated line.
    pub fn line_cost(&self, ingredient: &str, quantity: &PhysicalQuantity) -> Result<f64, LineError> {
        let product = self
            .catalog
            .get(ingredient)
            .ok_or_else(|| LineError::MissingProduct(ingredient.to_string()))?;

        let resolved = self.table.reconcile(ingredient, quantity, &product.quantity)?;
        let ratio = resolved.ratio(&product.quantity);
        if !ratio.is_dimensionless() {
            return Err(LineError::Unreconciled {
                ingredient: ingredient.to_string(),
                quantity: resolved.to_string(),
                quantity_dimensionality: resolved.dimensionality(),
                product: product.quantity.to_string(),
                product_dimensionality: product.quantity.dimensionality(),
            });
        }

        Ok(ratio.value * product.price)
    }

    /// Sums the cost of every line it can price. Lines it cannot price are
    /// logged with their position and contribute nothing.
    pub fn recipe_cost(&self, map: &RecipeIngredientMap) -> RecipeCost {
        let mut total = 0.0;
        let mut stats = LineStats::default();

        for (position, (ingredient, line)) in map.lines().enumerate() {
            let cost = line
                .validated
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|quantity| self.line_cost(ingredient, quantity));

            match cost {
                Ok(cost) => {
                    debug!("Recipe {} line {} '{}': {:.4}", map.recipe_id, position, line.label, cost);
                    total += cost;
                    stats.costed += 1;
                }
                Err(e) => {
                    warn!("Recipe {} line {} '{}' skipped: {}", map.recipe_id, position, line.label, e);
                    stats.record_skip(&e);
                }
            }
        }

        RecipeCost { recipe_id: map.recipe_id, total, stats }
    }

    /// Costs every recipe on the rayon pool. Output order follows input order.
    pub fn cost_all(&self, maps: &[RecipeIngredientMap]) -> Vec<RecipeCost> {
        maps.par_iter().map(|map| self.recipe_cost(map)).collect()
    }
}
