use log::debug;

use super::quantity::PhysicalQuantity;
use super::registry::UnitRegistry;
use crate::error::LineError;

const MAGNETIC_FLUX_SYMBOL: &str = "gauss";
const MASS_SYMBOL: &str = "gram";

/// Accepts quantities whose unit is a count, a mass or a volume.
///
/// Units whose name contains `gauss` are first rewritten to the matching gram
/// unit: an upper-case `G` in a label means grams, never magnetic flux.
pub fn validate_units(registry: &UnitRegistry, quantity: PhysicalQuantity) -> Result<PhysicalQuantity, LineError> {
    let quantity = if quantity.unit.name.contains(MAGNETIC_FLUX_SYMBOL) {
        let renamed = quantity.unit.name.replace(MAGNETIC_FLUX_SYMBOL, MASS_SYMBOL);
        let unit = registry.parse_unit(&renamed).ok_or_else(|| LineError::UnknownUnit(renamed.clone()))?;
        debug!("Rewrote unit '{}' to '{}'", quantity.unit.name, unit.name);
        PhysicalQuantity::new(quantity.magnitude, unit)
    } else {
        quantity
    };

    match quantity.class() {
        Some(_) => Ok(quantity),
        None => Err(LineError::InvalidUnits {
            unit: quantity.unit.name.clone(),
            dimensionality: quantity.dimensionality(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{DimensionClass, Dimensionality};

    fn registry() -> UnitRegistry {
        UnitRegistry::with_custom_units().unwrap()
    }

    #[test]
    fn test_accepts_mass_volume_and_count() {
        let r = registry();
        for unit in ["gram", "cup", "each", "bunch", "to_taste"] {
            let q = r.quantity(3.0, unit).unwrap();
            let validated = validate_units(&r, q.clone()).unwrap();
            assert_eq!(validated, q, "{}", unit);
        }
    }

    #[test]
    fn test_rejects_length_and_time() {
        let r = registry();
        let err = validate_units(&r, r.quantity(2.0, "inch").unwrap()).unwrap_err();
        assert_eq!(
            err,
            LineError::InvalidUnits { unit: "inch".to_string(), dimensionality: Dimensionality::LENGTH }
        );
        assert!(validate_units(&r, r.quantity(5.0, "minutes").unwrap()).is_err());
    }

    #[test]
    fn test_gauss_is_rewritten_to_gram() {
        let r = registry();
        let q = r.quantity(500.0, "G").unwrap();
        assert_eq!(q.unit.name, "gauss");

        let validated = validate_units(&r, q).unwrap();
        assert_eq!(validated.unit.name, "gram");
        assert_eq!(validated.magnitude, 500.0);
        assert_eq!(validated.class(), Some(DimensionClass::Mass));

        let kilo = validate_units(&r, r.quantity(1.0, "kG").unwrap()).unwrap();
        assert_eq!(kilo.unit.name, "kilogram");
    }

    #[test]
    fn test_tesla_is_still_invalid() {
        let r = registry();
        let err = validate_units(&r, r.quantity(1.0, "tesla").unwrap()).unwrap_err();
        assert!(matches!(err, LineError::InvalidUnits { .. }));
    }
}
