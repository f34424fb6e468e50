use clap::Parser;
use std::path::PathBuf;

use crate::config::{
    PipelineConfig, DEFAULT_INGREDIENTS_OUT_PATH, DEFAULT_INGREDIENT_RECIPE_OUT_PATH, DEFAULT_LABELS_PATH,
    DEFAULT_PRICE_LIST_PATH, DEFAULT_RECIPES_OUT_PATH, DEFAULT_RECIPES_PATH,
};

/// Prices every recipe against an ingredient price list.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Recipe ingredient labels with their magnitudes
    #[arg(long, env = "RECIPE_COST_LABELS", default_value = DEFAULT_LABELS_PATH)]
    pub labels: PathBuf,

    /// Recipe table holding the canonical ingredient names
    #[arg(short, long, env = "RECIPE_COST_RECIPES", default_value = DEFAULT_RECIPES_PATH)]
    pub recipes: PathBuf,

    /// Price list of purchasable products
    #[arg(short, long, env = "RECIPE_COST_PRICE_LIST", default_value = DEFAULT_PRICE_LIST_PATH)]
    pub price_list: PathBuf,

    /// Output: ingredient id table
    #[arg(long, env = "RECIPE_COST_INGREDIENTS_OUT", default_value = DEFAULT_INGREDIENTS_OUT_PATH)]
    pub ingredients_out: PathBuf,

    /// Output: ingredient-recipe association table
    #[arg(long, env = "RECIPE_COST_INGREDIENT_RECIPE_OUT", default_value = DEFAULT_INGREDIENT_RECIPE_OUT_PATH)]
    pub ingredient_recipe_out: PathBuf,

    /// Output: recipe table with the cost column filled in
    #[arg(short, long, env = "RECIPE_COST_RECIPES_OUT", default_value = DEFAULT_RECIPES_OUT_PATH)]
    pub output: PathBuf,

    /// JSON file of reconciliation rules tried before the built-in ones
    #[arg(long, env = "RECIPE_COST_RULES")]
    pub rules: Option<PathBuf>,

    /// Worker threads for costing (defaults to one per core)
    #[arg(short, long, env = "RECIPE_COST_JOBS")]
    pub jobs: Option<usize>,
}

impl From<&Cli> for PipelineConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            labels_path: cli.labels.clone(),
            recipes_path: cli.recipes.clone(),
            price_list_path: cli.price_list.clone(),
            ingredients_out: cli.ingredients_out.clone(),
            ingredient_recipe_out: cli.ingredient_recipe_out.clone(),
            recipes_out: cli.output.clone(),
            rules_file: cli.rules.clone(),
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_config() {
        let cli = Cli::try_parse_from(["recipe_cost"]).unwrap();
        assert_eq!(PipelineConfig::from(&cli), PipelineConfig::default());
        assert_eq!(cli.jobs, None);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "recipe_cost",
            "--price-list",
            "prices.csv",
            "-o",
            "out/recipes.csv",
            "--rules",
            "rules.json",
            "--jobs",
            "4",
        ])
        .unwrap();
        let config = PipelineConfig::from(&cli);
        assert_eq!(config.price_list_path, PathBuf::from("prices.csv"));
        assert_eq!(config.recipes_out, PathBuf::from("out/recipes.csv"));
        assert_eq!(config.rules_file, Some(PathBuf::from("rules.json")));
        assert_eq!(cli.jobs, Some(4));
    }
}
