use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;

use crate::catalog::ProductCatalog;
use crate::config::PipelineConfig;
use crate::cost_aggregator::{CostAggregator, LineStats, RecipeCost};
use crate::data::price_list::load_price_list;
use crate::data::recipe_loader::load_recipe_records;
use crate::data::writer::{write_ingredient_recipe, write_ingredients, write_recipe_costs};
use crate::quantity_parser::QuantityParser;
use crate::recipe_mapper::{association_rows, build_ingredient_map, IngredientRecipeRow, RecipeIngredientMap};
use crate::reconciliation::{load_rules, ReconciliationTable};
use crate::units::UnitRegistry;

/// What a run did, for the log and for callers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub products: usize,
    pub aliases: usize,
    pub recipes_costed: usize,
    pub recipes_updated: usize,
    pub association_rows: usize,
    pub lines: LineStats,
    pub costs: Vec<RecipeCost>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} recipes costed ({} rows updated), {} lines costed, {} skipped \
             ({} invalid units, {} unreconciled, {} missing product)",
            self.recipes_costed,
            self.recipes_updated,
            self.lines.costed,
            self.lines.skipped(),
            self.lines.invalid_units,
            self.lines.unreconciled,
            self.lines.missing_product
        )
    }
}

fn build_table(registry: &UnitRegistry, config: &PipelineConfig) -> Result<ReconciliationTable> {
    let table = match &config.rules_file {
        Some(path) => {
            let overrides = load_rules(path)?;
            info!("Loaded {} reconciliation rule overrides from {:?}", overrides.len(), path);
            ReconciliationTable::with_overrides(registry, overrides)
        }
        None => ReconciliationTable::with_defaults(registry),
    };
    table.context("Invalid reconciliation rule")
}

/// One batch run: load the price list and recipes, cost every recipe and
/// write the three output tables.
///
/// Only setup problems (unreadable inputs, an empty catalog, bad rules)
/// fail the run. Anything wrong with an individual line is logged and the
/// line is left out of its recipe's total.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let registry = UnitRegistry::with_custom_units().context("Failed to build the unit registry")?;

    let rows = load_price_list(&config.price_list_path)?;
    let catalog = ProductCatalog::from_rows(&registry, rows);
    if catalog.is_empty() {
        return Err(anyhow::anyhow!("Price list {:?} has no usable products", config.price_list_path));
    }

    let table = build_table(&registry, config)?;
    let records = load_recipe_records(&config.recipes_path, &config.labels_path)?;

    let parser = QuantityParser::new(&registry);
    let maps: Vec<RecipeIngredientMap> =
        records.par_iter().map(|record| build_ingredient_map(&registry, &parser, record)).collect();

    let aggregator = CostAggregator::new(&catalog, &table);
    let costs = aggregator.cost_all(&maps);

    let rows: Vec<IngredientRecipeRow> = maps.iter().flat_map(|map| association_rows(map, &catalog)).collect();
    write_ingredients(&config.ingredients_out, &catalog)?;
    write_ingredient_recipe(&config.ingredient_recipe_out, &rows)?;

    let by_id: HashMap<i64, f64> = costs.iter().map(|cost| (cost.recipe_id, cost.total)).collect();
    let recipes_updated = write_recipe_costs(&config.recipes_path, &config.recipes_out, &by_id)?;

    let mut lines = LineStats::default();
    for cost in &costs {
        lines += cost.stats;
    }

    let summary = RunSummary {
        products: catalog.product_count(),
        aliases: catalog.aliases().count(),
        recipes_costed: costs.len(),
        recipes_updated,
        association_rows: rows.len(),
        lines,
        costs,
    };
    info!("Run complete: {}", summary);
    Ok(summary)
}
