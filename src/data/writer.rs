use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::catalog::ProductCatalog;
use crate::recipe_mapper::IngredientRecipeRow;

const ID_COL: &str = "id";
const COST_COL: &str = "cost";

#[derive(Debug, Serialize)]
struct IngredientRow<'a> {
    id: usize,
    name: &'a str,
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    Ok(())
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<usize> {
    create_parent_dir(path)?;
    let mut wtr = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file at {:?}", path))?;
    let mut count = 0;
    for row in rows {
        wtr.serialize(row).with_context(|| format!("Failed to write row {} to {:?}", count, path))?;
        count += 1;
    }
    wtr.flush().with_context(|| format!("Failed to flush {:?}", path))?;
    Ok(count)
}

/// Writes the `id,name` table, one row per catalog alias.
pub fn write_ingredients(path: &Path, catalog: &ProductCatalog) -> Result<usize> {
    let count = write_rows(path, catalog.aliases().map(|(id, name)| IngredientRow { id, name }))?;
    info!("Wrote {} ingredients to {:?}", count, path);
    Ok(count)
}

/// Writes the `recipe_id,ingredient_id,label,quantity,unit` table.
pub fn write_ingredient_recipe(path: &Path, rows: &[IngredientRecipeRow]) -> Result<usize> {
    let count = write_rows(path, rows)?;
    info!("Wrote {} ingredient-recipe rows to {:?}", count, path);
    Ok(count)
}

pub fn format_cost(cost: f64) -> String {
    format!("{:.2}", cost)
}

/// Copies the recipe table from `input` to `output`, replacing the `cost`
/// of each recipe present in `costs` and leaving every other row as it
/// was. A missing `cost` column is appended. Returns the number of rows
/// updated.
pub fn write_recipe_costs(input: &Path, output: &Path, costs: &HashMap<i64, f64>) -> Result<usize> {
    if !input.exists() {
        return Err(anyhow::anyhow!("Recipes CSV file not found at: {:?}", input));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(input)
        .with_context(|| format!("Failed to open recipes CSV file at {:?}", input))?;
    let mut headers = rdr.headers()?.clone();
    let id_idx = headers.iter().position(|h| h == ID_COL).ok_or_else(|| anyhow::anyhow!("Column '{}' not found", ID_COL))?;
    let cost_idx = match headers.iter().position(|h| h == COST_COL) {
        Some(idx) => idx,
        None => {
            headers.push_field(COST_COL);
            headers.len() - 1
        }
    };

    create_parent_dir(output)?;
    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .from_path(output)
        .with_context(|| format!("Failed to create CSV file at {:?}", output))?;
    wtr.write_record(&headers)?;

    let mut updated = 0;
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read recipe record at row index {}", row_index))?;

        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        if fields.len() <= cost_idx {
            fields.resize(cost_idx + 1, String::new());
        }

        let cost = record.get(id_idx).and_then(|raw| raw.trim().parse::<i64>().ok()).and_then(|id| costs.get(&id));
        match cost {
            Some(cost) => {
                fields[cost_idx] = format_cost(*cost);
                updated += 1;
            }
            None => debug!("Recipe row {} has no computed cost; keeping '{}'", row_index, fields[cost_idx]),
        }

        wtr.write_record(&StringRecord::from(fields))
            .with_context(|| format!("Failed to write recipe row {} to {:?}", row_index, output))?;
    }
    wtr.flush().with_context(|| format!("Failed to flush {:?}", output))?;

    info!("Wrote recipe table to {:?} ({} costs updated)", output, updated);
    Ok(updated)
}
