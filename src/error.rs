use thiserror::Error;

use crate::units::{DimensionClass, Dimensionality};

/// Why a single ingredient line could not be costed.
///
/// None of these stop a recipe: the line contributes nothing and the
/// condition is logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineError {
    #[error("could not parse a quantity from '{text}'")]
    UnparseableQuantity { text: String },

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("invalid units: '{unit}' has dimensionality {dimensionality}")]
    InvalidUnits { unit: String, dimensionality: Dimensionality },

    #[error(
        "unable to reconcile '{ingredient}': {quantity} ({quantity_dimensionality}) against product {product} ({product_dimensionality})"
    )]
    Unreconciled {
        ingredient: String,
        quantity: String,
        quantity_dimensionality: Dimensionality,
        product: String,
        product_dimensionality: Dimensionality,
    },

    #[error("no product entry for ingredient '{0}'")]
    MissingProduct(String),
}

/// Failures while building the unit registry or compiling rules against it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("unit '{0}' is already defined")]
    Duplicate(String),

    #[error("unit '{name}' is defined in terms of unknown unit '{base}'")]
    UnknownBase { name: String, base: String },
}

/// A reconciliation rule that cannot be compiled against the registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("rule {index} ('{matcher}'): unknown unit '{unit}'")]
    UnknownUnit { index: usize, matcher: String, unit: String },

    #[error("rule {index} ('{matcher}'): '{unit}' is not a count, mass or volume unit")]
    InvalidUnit { index: usize, matcher: String, unit: String },

    #[error("rule {index} ('{matcher}'): both sides are {class}, nothing to reconcile")]
    SameDimension { index: usize, matcher: String, class: DimensionClass },

    #[error("rule {index} ('{matcher}'): amounts must be positive")]
    NonPositive { index: usize, matcher: String },
}
