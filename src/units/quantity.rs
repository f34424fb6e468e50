use std::fmt;

use super::dimension::{DimensionClass, Dimensionality};

/// A resolved unit: its name in the registry, its dimensionality and the
/// factor that converts one of it into base units (kilogram, meter, second,
/// ampere and their products).
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub name: String,
    pub dimensionality: Dimensionality,
    pub factor: f64,
    /// Placeholder units like `to_taste` that stand in for "some amount".
    pub symbolic: bool,
}

impl Unit {
    pub fn class(&self) -> Option<DimensionClass> {
        self.dimensionality.class()
    }
}

/// A magnitude paired with a registry unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalQuantity {
    pub magnitude: f64,
    pub unit: Unit,
}

/// The result of dividing one quantity by another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratio {
    pub value: f64,
    pub dimensionality: Dimensionality,
}

impl Ratio {
    pub fn is_dimensionless(&self) -> bool {
        self.dimensionality.is_dimensionless()
    }
}

impl PhysicalQuantity {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    pub fn dimensionality(&self) -> Dimensionality {
        self.unit.dimensionality
    }

    pub fn class(&self) -> Option<DimensionClass> {
        self.unit.class()
    }

    /// Magnitude expressed in base units.
    pub fn base_magnitude(&self) -> f64 {
        self.magnitude * self.unit.factor
    }

    pub fn is_compatible_with(&self, other: &PhysicalQuantity) -> bool {
        self.dimensionality() == other.dimensionality()
    }

    /// Re-express this quantity in `unit`. Returns `None` if the dimensions differ.
    pub fn to_unit(&self, unit: &Unit) -> Option<PhysicalQuantity> {
        if self.unit.dimensionality != unit.dimensionality || unit.factor == 0.0 {
            return None;
        }
        Some(PhysicalQuantity::new(self.base_magnitude() / unit.factor, unit.clone()))
    }

    /// `self / other`, reduced to base units.
    pub fn ratio(&self, other: &PhysicalQuantity) -> Ratio {
        Ratio {
            value: self.base_magnitude() / other.base_magnitude(),
            dimensionality: self.dimensionality().divide(&other.dimensionality()),
        }
    }
}

impl fmt::Display for PhysicalQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit.name)
    }
}
