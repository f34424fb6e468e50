pub mod dimension;
pub mod quantity;
pub mod registry;
pub mod validator;

pub use dimension::{DimensionClass, Dimensionality};
pub use quantity::{PhysicalQuantity, Ratio, Unit};
pub use registry::{CustomUnit, UnitRegistry, CUSTOM_UNITS};
pub use validator::validate_units;
