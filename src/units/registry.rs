use std::collections::HashMap;

use log::debug;

use super::dimension::Dimensionality;
use super::quantity::{PhysicalQuantity, Unit};
use crate::error::RegistryError;

const TEASPOON_M3: f64 = 4.928_921_593_75e-6;
const CUP_M3: f64 = 48.0 * TEASPOON_M3;

/// A unit defined in terms of another registry unit, e.g. `bunch = 150 gram`.
#[derive(Debug, Clone, Copy)]
pub struct CustomUnit {
    pub name: &'static str,
    pub amount: f64,
    /// `None` defines a new dimensionless count unit.
    pub of: Option<&'static str>,
    pub aliases: &'static [&'static str],
    pub symbolic: bool,
}

/// Kitchen units layered on top of the physical ones. Order matters: each
/// definition may only refer to units defined before it.
pub const CUSTOM_UNITS: &[CustomUnit] = &[
    CustomUnit {
        name: "each",
        amount: 1.0,
        of: None,
        aliases: &["ea", "piece", "clove", "whole", "slice", "stalk", "sprig", "can", "item", "count"],
        symbolic: false,
    },
    CustomUnit { name: "dozen", amount: 12.0, of: Some("each"), aliases: &["doz"], symbolic: false },
    CustomUnit { name: "bunch", amount: 150.0, of: Some("gram"), aliases: &[], symbolic: false },
    CustomUnit { name: "pinch", amount: 1.0 / 16.0, of: Some("teaspoon"), aliases: &["sprinkle"], symbolic: false },
    CustomUnit { name: "dash", amount: 1.0 / 8.0, of: Some("teaspoon"), aliases: &[], symbolic: false },
    CustomUnit { name: "to_taste", amount: 1.0, of: Some("dash"), aliases: &["to taste"], symbolic: true },
    CustomUnit { name: "handful", amount: 0.5, of: Some("cup"), aliases: &[], symbolic: false },
    CustomUnit { name: "splash", amount: 2.0, of: Some("tablespoon"), aliases: &[], symbolic: false },
];

/// Name → unit lookup shared by the parser, the validator and the rule table.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: HashMap<String, Unit>,
    aliases: HashMap<String, String>,
}

impl UnitRegistry {
    /// A registry holding only the built-in physical units.
    pub fn new() -> Self {
        let mut registry = Self { units: HashMap::new(), aliases: HashMap::new() };

        let mass = Dimensionality::MASS;
        registry.builtin("milligram", mass, 1e-6, &["mg", "milligramme"]);
        registry.builtin("gram", mass, 1e-3, &["g", "gm", "gramme"]);
        registry.builtin("kilogram", mass, 1.0, &["kg", "kilo", "kilogramme"]);
        registry.builtin("ounce", mass, 0.028_349_523_125, &["oz"]);
        registry.builtin("pound", mass, 0.453_592_37, &["lb", "lbs"]);

        let volume = Dimensionality::VOLUME;
        registry.builtin("milliliter", volume, 1e-6, &["ml", "mL", "millilitre"]);
        registry.builtin("centiliter", volume, 1e-5, &["cl", "centilitre"]);
        registry.builtin("deciliter", volume, 1e-4, &["dl", "decilitre"]);
        registry.builtin("liter", volume, 1e-3, &["l", "L", "litre"]);
        registry.builtin("cubic_centimeter", volume, 1e-6, &["cc", "cm3", "cubic centimeter"]);
        registry.builtin("teaspoon", volume, TEASPOON_M3, &["tsp", "tspn"]);
        registry.builtin("tablespoon", volume, 3.0 * TEASPOON_M3, &["tbsp", "tbs", "tbl", "tblsp"]);
        registry.builtin("fluid_ounce", volume, 6.0 * TEASPOON_M3, &["fl oz", "fl. oz", "floz", "fluid ounce"]);
        registry.builtin("cup", volume, CUP_M3, &["c"]);
        registry.builtin("pint", volume, 2.0 * CUP_M3, &["pt"]);
        registry.builtin("quart", volume, 4.0 * CUP_M3, &["qt"]);
        registry.builtin("gallon", volume, 16.0 * CUP_M3, &["gal"]);

        let length = Dimensionality::LENGTH;
        registry.builtin("millimeter", length, 1e-3, &["mm", "millimetre"]);
        registry.builtin("centimeter", length, 1e-2, &["cm", "centimetre"]);
        registry.builtin("meter", length, 1.0, &["m", "metre"]);
        registry.builtin("inch", length, 0.0254, &[]);
        registry.builtin("foot", length, 0.3048, &["ft", "feet"]);

        let time = Dimensionality::TIME;
        registry.builtin("second", time, 1.0, &["sec"]);
        registry.builtin("minute", time, 60.0, &["min"]);
        registry.builtin("hour", time, 3600.0, &["hr"]);

        let flux = Dimensionality::MAGNETIC_FLUX_DENSITY;
        registry.builtin("gauss", flux, 1e-4, &["G"]);
        registry.builtin("kilogauss", flux, 0.1, &["kG"]);
        registry.builtin("tesla", flux, 1.0, &[]);

        registry
    }

    /// The built-in units plus every entry of [`CUSTOM_UNITS`].
    pub fn with_custom_units() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for custom in CUSTOM_UNITS {
            registry.define(custom)?;
        }
        debug!("Unit registry ready with {} units", registry.units.len());
        Ok(registry)
    }

    fn builtin(&mut self, name: &str, dimensionality: Dimensionality, factor: f64, aliases: &[&str]) {
        self.units.insert(
            name.to_string(),
            Unit { name: name.to_string(), dimensionality, factor, symbolic: false },
        );
        for alias in aliases {
            self.aliases.insert(alias.to_string(), name.to_string());
        }
    }

    /// Adds a unit defined in terms of an existing one.
    pub fn define(&mut self, custom: &CustomUnit) -> Result<(), RegistryError> {
        if self.units.contains_key(custom.name) || self.aliases.contains_key(custom.name) {
            return Err(RegistryError::Duplicate(custom.name.to_string()));
        }

        let (dimensionality, factor) = match custom.of {
            None => (Dimensionality::DIMENSIONLESS, custom.amount),
            Some(base) => {
                let base_unit = self.parse_unit(base).ok_or_else(|| RegistryError::UnknownBase {
                    name: custom.name.to_string(),
                    base: base.to_string(),
                })?;
                (base_unit.dimensionality, custom.amount * base_unit.factor)
            }
        };

        self.units.insert(
            custom.name.to_string(),
            Unit { name: custom.name.to_string(), dimensionality, factor, symbolic: custom.symbolic },
        );
        for alias in custom.aliases {
            self.aliases.insert(alias.to_string(), custom.name.to_string());
        }
        Ok(())
    }

    fn lookup(&self, key: &str) -> Option<&Unit> {
        self.units
            .get(key)
            .or_else(|| self.aliases.get(key).and_then(|name| self.units.get(name)))
    }

    /// Every canonical unit name and alias, in no particular order.
    pub fn unit_names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().chain(self.aliases.keys()).map(String::as_str)
    }

    /// Resolves a unit name, symbol or plural.
    ///
    /// Exact spelling is tried before lowercase so that `G` (gauss) and `g`
    /// (gram) stay distinct.
    pub fn parse_unit(&self, text: &str) -> Option<Unit> {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return None;
        }
        if let Some(unit) = self.lookup(&collapsed) {
            return Some(unit.clone());
        }

        let lower = collapsed.to_lowercase();
        let trimmed = lower.trim_end_matches('.');
        let mut candidates = vec![lower.as_str(), trimmed];
        if let Some(stem) = trimmed.strip_suffix("es") {
            candidates.push(stem);
        }
        if let Some(stem) = trimmed.strip_suffix('s') {
            candidates.push(stem);
        }

        candidates
            .into_iter()
            .filter(|c| !c.is_empty())
            .find_map(|c| self.lookup(c))
            .cloned()
    }

    /// Builds a quantity from a magnitude and a unit name.
    pub fn quantity(&self, magnitude: f64, unit: &str) -> Option<PhysicalQuantity> {
        self.parse_unit(unit).map(|u| PhysicalQuantity::new(magnitude, u))
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}
