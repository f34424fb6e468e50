use anyhow::{Context, Result};
use csv::ReaderBuilder;
use log::warn;
use std::path::Path;

const INGREDIENT_COL: &str = "ingredient";
const QUANTITY_COL: &str = "quantity";
const UNIT_COL: &str = "unit";
const PRICE_COL: &str = "price";

/// Pipe-separated alias list in the `ingredient` column.
pub const ALIAS_SEPARATOR: char = '|';

/// One purchasable product as it appears in the price list.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceListRow {
    pub row_index: usize,
    pub ingredient: String,
    pub quantity: f64,
    pub unit: String,
    pub price: f64,
}

impl PriceListRow {
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.ingredient.split(ALIAS_SEPARATOR)
    }
}

fn parse_optional_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn load_price_list(csv_path: &Path) -> Result<Vec<PriceListRow>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Price list CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open price list CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::Headers).from_reader(file);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", name))
    };
    let ingredient_idx = column(INGREDIENT_COL)?;
    let quantity_idx = column(QUANTITY_COL)?;
    let unit_idx = column(UNIT_COL)?;
    let price_idx = column(PRICE_COL)?;

    let mut rows = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read price list record at row index {}", row_index))?;

        let ingredient = record.get(ingredient_idx).unwrap_or("").trim().to_string();
        if ingredient.is_empty() {
            warn!("Skipping price list row {}: empty ingredient", row_index);
            continue;
        }

        let quantity = record.get(quantity_idx).and_then(parse_optional_f64);
        let price = record.get(price_idx).and_then(parse_optional_f64);
        let (Some(quantity), Some(price)) = (quantity, price) else {
            warn!("Skipping price list row {} ('{}'): quantity or price is not a number", row_index, ingredient);
            continue;
        };

        rows.push(PriceListRow {
            row_index,
            ingredient,
            quantity,
            unit: record.get(unit_idx).unwrap_or("").trim().to_string(),
            price,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv_file() -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{},{},{},{}", INGREDIENT_COL, QUANTITY_COL, UNIT_COL, PRICE_COL)?;
        writeln!(file, "onion|yellow onion,1,kilogram,2.00")?;
        writeln!(file, "salt,500,gram,1.50")?;
        writeln!(file, ",1,each,0.10")?; // Empty ingredient
        writeln!(file, "saffron,text,gram,9.99")?; // Invalid quantity
        writeln!(file, "garlic clove|garlic,1,each,0.10")?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_price_list_success() -> Result<()> {
        let file = create_test_csv_file()?;
        let rows = load_price_list(file.path())?;

        assert_eq!(rows.len(), 3); // empty ingredient and bad quantity skipped

        let onion = &rows[0];
        assert_eq!(onion.ingredient, "onion|yellow onion");
        assert_eq!(onion.aliases().collect::<Vec<_>>(), vec!["onion", "yellow onion"]);
        assert_eq!(onion.quantity, 1.0);
        assert_eq!(onion.unit, "kilogram");
        assert_eq!(onion.price, 2.0);

        let garlic = rows.iter().find(|r| r.ingredient.starts_with("garlic")).unwrap();
        assert_eq!(garlic.row_index, 4);
        Ok(())
    }

    #[test]
    fn test_load_price_list_missing_column() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{},{},{}", INGREDIENT_COL, QUANTITY_COL, PRICE_COL)?;
        writeln!(file, "salt,500,1.50")?;
        file.flush()?;

        let result = load_price_list(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains(&format!("Column '{}' not found", UNIT_COL)));
        Ok(())
    }

    #[test]
    fn test_load_price_list_file_not_found() {
        let path = Path::new("this_price_list_does_not_exist.csv");
        let result = load_price_list(path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Price list CSV file not found"));
    }
}
