use std::collections::HashMap;

use log::{info, warn};

use crate::data::price_list::PriceListRow;
use crate::units::{validate_units, PhysicalQuantity, UnitRegistry};

/// A priced product: the package size and what it costs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductEntry {
    /// The price list's `ingredient` field, aliases and all.
    pub name: String,
    pub quantity: PhysicalQuantity,
    pub price: f64,
}

#[derive(Debug, Clone, Copy)]
struct AliasSlot {
    id: usize,
    entry: usize,
}

/// Ingredient name → product lookup built once from the price list.
///
/// Every alias of a row points at the same entry. Alias ids are handed out
/// in first-seen order and never change; a later row reusing an alias takes
/// over the entry but keeps the id.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    entries: Vec<ProductEntry>,
    aliases: HashMap<String, AliasSlot>,
    alias_order: Vec<String>,
}

/// Trims whitespace and stray single quotes, and lowercases.
pub fn normalize_alias(name: &str) -> String {
    name.trim().trim_matches('\'').trim().to_lowercase()
}

impl ProductCatalog {
    pub fn from_rows(registry: &UnitRegistry, rows: impl IntoIterator<Item = PriceListRow>) -> Self {
        let mut catalog = Self::default();
        let mut rejected = 0usize;

        for row in rows {
            match Self::product_quantity(registry, &row) {
                Some(quantity) => catalog.insert(&row, quantity),
                None => rejected += 1,
            }
        }

        info!(
            "Product catalog loaded: {} products, {} aliases, {} rows rejected",
            catalog.entries.len(),
            catalog.alias_order.len(),
            rejected
        );
        catalog
    }

    fn product_quantity(registry: &UnitRegistry, row: &PriceListRow) -> Option<PhysicalQuantity> {
        if row.quantity <= 0.0 || row.price < 0.0 {
            warn!(
                "Rejecting price list row {} ('{}'): quantity {} / price {} out of range",
                row.row_index, row.ingredient, row.quantity, row.price
            );
            return None;
        }

        let Some(quantity) = registry.quantity(row.quantity, &row.unit) else {
            warn!("Rejecting price list row {} ('{}'): unknown unit '{}'", row.row_index, row.ingredient, row.unit);
            return None;
        };

        match validate_units(registry, quantity) {
            Ok(quantity) => Some(quantity),
            Err(e) => {
                warn!("Rejecting price list row {} ('{}'): {}", row.row_index, row.ingredient, e);
                None
            }
        }
    }

    fn insert(&mut self, row: &PriceListRow, quantity: PhysicalQuantity) {
        let aliases: Vec<String> = row.aliases().map(normalize_alias).filter(|a| !a.is_empty()).collect();
        if aliases.is_empty() {
            warn!("Rejecting price list row {} ('{}'): no usable alias", row.row_index, row.ingredient);
            return;
        }

        let entry = self.entries.len();
        self.entries.push(ProductEntry { name: row.ingredient.clone(), quantity, price: row.price });

        for alias in aliases {
            match self.aliases.get_mut(&alias) {
                Some(slot) => {
                    warn!(
                        "Alias '{}' from price list row {} replaces an earlier product",
                        alias, row.row_index
                    );
                    slot.entry = entry;
                }
                None => {
                    let id = self.alias_order.len();
                    self.alias_order.push(alias.clone());
                    self.aliases.insert(alias, AliasSlot { id, entry });
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ProductEntry> {
        self.aliases.get(&normalize_alias(name)).map(|slot| &self.entries[slot.entry])
    }

    pub fn alias_id(&self, name: &str) -> Option<usize> {
        self.aliases.get(&normalize_alias(name)).map(|slot| slot.id)
    }

    /// `(id, alias)` pairs in id order.
    pub fn aliases(&self) -> impl Iterator<Item = (usize, &str)> {
        self.alias_order.iter().enumerate().map(|(id, alias)| (id, alias.as_str()))
    }

    pub fn product_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(row_index: usize, ingredient: &str, quantity: f64, unit: &str, price: f64) -> PriceListRow {
        PriceListRow { row_index, ingredient: ingredient.to_string(), quantity, unit: unit.to_string(), price }
    }

    fn registry() -> UnitRegistry {
        UnitRegistry::with_custom_units().unwrap()
    }

    #[test]
    fn test_aliases_share_one_entry() {
        let r = registry();
        let catalog = ProductCatalog::from_rows(&r, vec![row(0, "onion|'yellow onion' | Brown Onion", 1.0, "kilogram", 2.0)]);

        let onion = catalog.get("onion").unwrap();
        for alias in ["yellow onion", "brown onion", "  Yellow Onion "] {
            let other = catalog.get(alias).unwrap();
            assert_eq!(other.quantity, onion.quantity, "{}", alias);
            assert_eq!(other.price, onion.price, "{}", alias);
        }
        assert_eq!(catalog.product_count(), 1);
        assert_eq!(
            catalog.aliases().collect::<Vec<_>>(),
            vec![(0, "onion"), (1, "yellow onion"), (2, "brown onion")]
        );
    }

    #[test]
    fn test_invalid_rows_are_rejected() {
        let r = registry();
        let catalog = ProductCatalog::from_rows(
            &r,
            vec![
                row(0, "ginger", 2.0, "inch", 0.50),
                row(1, "saffron", 1.0, "smidgen", 9.99),
                row(2, "water", 0.0, "liter", 0.10),
                row(3, "salt", 500.0, "gram", 1.50),
                row(4, "|", 1.0, "each", 1.0),
            ],
        );
        assert_eq!(catalog.product_count(), 1);
        assert!(catalog.get("ginger").is_none());
        assert!(catalog.get("saffron").is_none());
        assert!(catalog.get("water").is_none());
        assert!(catalog.get("salt").is_some());
    }

    #[test]
    fn test_gauss_unit_in_price_list_becomes_grams() {
        let r = registry();
        let catalog = ProductCatalog::from_rows(&r, vec![row(0, "flour", 500.0, "G", 1.0)]);
        assert_eq!(catalog.get("flour").unwrap().quantity.unit.name, "gram");
    }

    #[test]
    fn test_duplicate_alias_keeps_id_and_takes_later_row() {
        let r = registry();
        let catalog = ProductCatalog::from_rows(
            &r,
            vec![row(0, "butter", 250.0, "gram", 3.0), row(1, "margarine|butter", 500.0, "gram", 2.0)],
        );
        assert_eq!(catalog.alias_id("butter"), Some(0));
        assert_eq!(catalog.alias_id("margarine"), Some(1));
        assert_eq!(catalog.get("butter").unwrap().price, 2.0);
        assert_eq!(catalog.aliases().count(), 2);
    }
}
