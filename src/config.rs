use std::path::PathBuf;

pub const DEFAULT_LABELS_PATH: &str = "data/ingredients-1.csv";
pub const DEFAULT_RECIPES_PATH: &str = "data/recipes-1.csv";
pub const DEFAULT_PRICE_LIST_PATH: &str = "data/ingredient-pricelist.csv";
pub const DEFAULT_INGREDIENTS_OUT_PATH: &str = "data/ingredients-2.csv";
pub const DEFAULT_INGREDIENT_RECIPE_OUT_PATH: &str = "data/ingredient-recipe-2.csv";
pub const DEFAULT_RECIPES_OUT_PATH: &str = "data/recipes-2.csv";

/// Everything one batch run needs to know about its files.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// `id,ingredients` where `ingredients` maps each label to its magnitude.
    pub labels_path: PathBuf,
    /// Recipe table with an `id` column and a list literal of ingredient names.
    pub recipes_path: PathBuf,
    pub price_list_path: PathBuf,
    pub ingredients_out: PathBuf,
    pub ingredient_recipe_out: PathBuf,
    pub recipes_out: PathBuf,
    /// JSON reconciliation rules consulted before the built-in ones.
    pub rules_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            labels_path: PathBuf::from(DEFAULT_LABELS_PATH),
            recipes_path: PathBuf::from(DEFAULT_RECIPES_PATH),
            price_list_path: PathBuf::from(DEFAULT_PRICE_LIST_PATH),
            ingredients_out: PathBuf::from(DEFAULT_INGREDIENTS_OUT_PATH),
            ingredient_recipe_out: PathBuf::from(DEFAULT_INGREDIENT_RECIPE_OUT_PATH),
            recipes_out: PathBuf::from(DEFAULT_RECIPES_OUT_PATH),
            rules_file: None,
        }
    }
}
