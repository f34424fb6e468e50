use anyhow::{Context, Result};
use csv::ReaderBuilder;
use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::quantity_parser::parse_magnitude;

const ID_COL: &str = "id";
const INGREDIENTS_COL: &str = "ingredients";

lazy_static! {
    static ref QUOTED: Regex =
        Regex::new(r#"'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)""#).expect("quoted string pattern should be valid");
}

/// One recipe's joined inputs: the labels with the magnitudes upstream
/// attributed to them, and the canonical ingredient names.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRecord {
    pub recipe_id: i64,
    /// In the order they appear in the source JSON object.
    pub labels: Vec<(String, Option<f64>)>,
    pub ingredient_names: Vec<String>,
}

/// Reads a JSON number, numeric string or null as a magnitude.
pub fn magnitude_from_json(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_magnitude(s),
        _ => None,
    }
}

fn parse_label_magnitudes(text: &str) -> Result<Vec<(String, Option<f64>)>> {
    let map: Map<String, Value> = serde_json::from_str(text)?;
    Ok(map.into_iter().map(|(label, value)| {
        let magnitude = magnitude_from_json(&value);
        (label, magnitude)
    }).collect())
}

/// Parses a list literal such as `['onion', "baker's yeast"]`.
pub fn parse_literal_list(text: &str) -> Option<Vec<String>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;

    let mut items = Vec::new();
    let mut rest_is_separators = true;
    let mut last_end = 0;
    for captures in QUOTED.captures_iter(inner) {
        let whole = captures.get(0)?;
        rest_is_separators &= inner[last_end..whole.start()].chars().all(|c| c == ',' || c.is_whitespace());
        last_end = whole.end();

        let body = captures.get(1).or_else(|| captures.get(2))?.as_str();
        items.push(unescape(body));
    }
    rest_is_separators &= inner[last_end..].chars().all(|c| c == ',' || c.is_whitespace());

    if rest_is_separators {
        Some(items)
    } else {
        None
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn read_id_column(csv_path: &Path, what: &str) -> Result<Vec<(i64, String)>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("{} CSV file not found at: {:?}", what, csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open {} CSV file at {:?}", what, csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    let id_idx = headers.iter().position(|h| h == ID_COL).ok_or_else(|| anyhow::anyhow!("Column '{}' not found", ID_COL))?;
    let ingredients_idx = headers
        .iter()
        .position(|h| h == INGREDIENTS_COL)
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", INGREDIENTS_COL))?;

    let mut rows = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read {} record at row index {}", what, row_index))?;
        let raw_id = record.get(id_idx).unwrap_or("").trim();
        let Ok(id) = raw_id.parse::<i64>() else {
            warn!("Skipping {} row {}: invalid id '{}'", what, row_index, raw_id);
            continue;
        };
        rows.push((id, record.get(ingredients_idx).unwrap_or("").to_string()));
    }
    Ok(rows)
}

/// Joins the recipe table (ingredient names) with the ingredient table
/// (label magnitudes) on recipe id. Only recipes present in both survive;
/// rows whose encoded columns do not parse are skipped with a warning.
pub fn load_recipe_records(recipes_path: &Path, ingredients_path: &Path) -> Result<Vec<RecipeRecord>> {
    let mut labels_by_id: HashMap<i64, Vec<(String, Option<f64>)>> = HashMap::new();
    for (id, raw) in read_id_column(ingredients_path, "Ingredient labels")? {
        match parse_label_magnitudes(&raw) {
            Ok(labels) => {
                labels_by_id.insert(id, labels);
            }
            Err(e) => warn!("Skipping labels of recipe {}: not a JSON object of magnitudes ({})", id, e),
        }
    }

    let recipe_rows = read_id_column(recipes_path, "Recipes")?;
    let total = recipe_rows.len();
    let mut records = Vec::new();
    for (id, raw) in recipe_rows {
        let Some(ingredient_names) = parse_literal_list(&raw) else {
            warn!("Skipping recipe {}: ingredient names are not a list literal", id);
            continue;
        };
        let Some(labels) = labels_by_id.remove(&id) else {
            warn!("Skipping recipe {}: no ingredient labels", id);
            continue;
        };
        records.push(RecipeRecord { recipe_id: id, labels, ingredient_names });
    }

    info!("Loaded {} of {} recipes with ingredient labels", records.len(), total);
    Ok(records)
}
