use std::fmt;

/// Exponents over the base dimensions a unit can carry.
///
/// Only the dimensions the registry actually defines units for are modelled:
/// mass, length, time and electric current. Magnetic flux density
/// (`[mass] / [current] / [time] ** 2`) is there so the gauss collision with
/// grams is representable and can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensionality {
    pub mass: i8,
    pub length: i8,
    pub time: i8,
    pub current: i8,
}

impl Dimensionality {
    pub const DIMENSIONLESS: Dimensionality = Dimensionality { mass: 0, length: 0, time: 0, current: 0 };
    pub const MASS: Dimensionality = Dimensionality { mass: 1, length: 0, time: 0, current: 0 };
    pub const LENGTH: Dimensionality = Dimensionality { mass: 0, length: 1, time: 0, current: 0 };
    pub const VOLUME: Dimensionality = Dimensionality { mass: 0, length: 3, time: 0, current: 0 };
    pub const TIME: Dimensionality = Dimensionality { mass: 0, length: 0, time: 1, current: 0 };
    pub const MAGNETIC_FLUX_DENSITY: Dimensionality = Dimensionality { mass: 1, length: 0, time: -2, current: -1 };

    pub fn is_dimensionless(&self) -> bool {
        *self == Self::DIMENSIONLESS
    }

    /// The dimensionality of `self / other`.
    pub fn divide(&self, other: &Dimensionality) -> Dimensionality {
        Dimensionality {
            mass: self.mass - other.mass,
            length: self.length - other.length,
            time: self.time - other.time,
            current: self.current - other.current,
        }
    }

    /// Which of the three costable classes this dimensionality belongs to, if any.
    pub fn class(&self) -> Option<DimensionClass> {
        match *self {
            Self::DIMENSIONLESS => Some(DimensionClass::Count),
            Self::MASS => Some(DimensionClass::Mass),
            Self::VOLUME => Some(DimensionClass::Volume),
            _ => None,
        }
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }

        let terms = [
            ("[mass]", self.mass),
            ("[length]", self.length),
            ("[time]", self.time),
            ("[current]", self.current),
        ];
        let render = |name: &str, exp: i8| {
            if exp == 1 {
                name.to_string()
            } else {
                format!("{} ** {}", name, exp)
            }
        };

        let numerator: Vec<String> = terms.iter().filter(|(_, e)| *e > 0).map(|(n, e)| render(n, *e)).collect();
        let denominator: Vec<String> = terms.iter().filter(|(_, e)| *e < 0).map(|(n, e)| render(n, -*e)).collect();

        let mut out = if numerator.is_empty() { "1".to_string() } else { numerator.join(" * ") };
        for term in denominator {
            out.push_str(" / ");
            out.push_str(&term);
        }
        write!(f, "{}", out)
    }
}

/// The dimensions a costable quantity may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DimensionClass {
    Count,
    Mass,
    Volume,
}

impl fmt::Display for DimensionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DimensionClass::Count => "count",
            DimensionClass::Mass => "mass",
            DimensionClass::Volume => "volume",
        };
        write!(f, "{}", name)
    }
}
