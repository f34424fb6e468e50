//! # Quantity Parser
//!
//! Turns a free-text ingredient label ("2 1/2 cups chopped onion",
//! "(400g) canned tomatoes", "salt to taste") into a [`PhysicalQuantity`].
//!
//! Labels are tried against an ordered list of strategies, first success
//! wins. Nothing here fails: a label nothing recognises becomes
//! `<magnitude> each` and is logged.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::error::LineError;
use crate::units::{Dimensionality, PhysicalQuantity, Unit, UnitRegistry};

const DEFAULT_MAGNITUDE: f64 = 1.0;
const FALLBACK_UNIT: &str = "each";
const TO_TASTE_UNIT: &str = "to_taste";

/// Whole labels that mean "season to taste".
const TO_TASTE_LABELS: &[&str] = &["salt", "pepper", "salt and pepper", "salt & pepper"];
/// Fragments that mark a label as unmeasured.
const TO_TASTE_MARKERS: &[&str] = &["to taste", "spray"];

lazy_static! {
    static ref PARENTHETICAL: Regex = Regex::new(r"\(([^()]*)\)").expect("parenthetical pattern should be valid");
    static ref QUANTITY_TEXT: Regex = Regex::new(
        r"^\s*(?P<num>[\d½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞.][\d½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞./\s-]*?)\s*(?P<unit>[^\W\d_].*?)\s*$"
    )
    .expect("quantity pattern should be valid");
    static ref RANGE_WORD: Regex =
        Regex::new(r"(\d)\s+(?:to|or)\s+(\d)").expect("range pattern should be valid");
}

/// Which strategy produced a label's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Parenthetical,
    SpecialCase,
    TokenScan,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLabel {
    pub quantity: PhysicalQuantity,
    pub strategy: ParseStrategy,
}

type Strategy = fn(&UnitRegistry, &str, f64) -> Option<PhysicalQuantity>;

const STRATEGIES: [(ParseStrategy, Strategy); 3] = [
    (ParseStrategy::Parenthetical, parenthetical),
    (ParseStrategy::SpecialCase, special_case),
    (ParseStrategy::TokenScan, token_scan),
];

pub struct QuantityParser<'a> {
    registry: &'a UnitRegistry,
}

impl<'a> QuantityParser<'a> {
    pub fn new(registry: &'a UnitRegistry) -> Self {
        Self { registry }
    }

    /// Parses `label`, using `magnitude` (the number upstream attributed to
    /// this label) wherever the label itself does not carry one.
    pub fn parse(&self, label: &str, magnitude: Option<f64>) -> ParsedLabel {
        let magnitude = sanitize_magnitude(magnitude);

        for (strategy, attempt) in STRATEGIES.iter() {
            if let Some(quantity) = attempt(self.registry, label, magnitude) {
                debug!("Parsed '{}' as {} via {:?}", label, quantity, strategy);
                return ParsedLabel { quantity, strategy: *strategy };
            }
        }

        warn!("Unresolved label '{}', assuming {} {}", label, magnitude, FALLBACK_UNIT);
        ParsedLabel {
            quantity: PhysicalQuantity::new(magnitude, self.fallback_unit()),
            strategy: ParseStrategy::Fallback,
        }
    }

    fn fallback_unit(&self) -> Unit {
        self.registry.parse_unit(FALLBACK_UNIT).unwrap_or_else(|| Unit {
            name: FALLBACK_UNIT.to_string(),
            dimensionality: Dimensionality::DIMENSIONLESS,
            factor: 1.0,
            symbolic: false,
        })
    }
}

fn sanitize_magnitude(magnitude: Option<f64>) -> f64 {
    match magnitude {
        Some(m) if m.is_finite() && m >= 0.0 => m,
        Some(m) => {
            warn!("Discarding unusable magnitude {}, using {}", m, DEFAULT_MAGNITUDE);
            DEFAULT_MAGNITUDE
        }
        None => DEFAULT_MAGNITUDE,
    }
}

fn parenthetical(registry: &UnitRegistry, label: &str, _magnitude: f64) -> Option<PhysicalQuantity> {
    PARENTHETICAL
        .captures_iter(label)
        .filter_map(|c| c.get(1))
        .filter(|m| m.as_str().chars().any(|ch| ch.is_ascii_digit() || vulgar_fraction(ch).is_some()))
        .find_map(|m| parse_quantity_text(registry, m.as_str()).ok())
}

fn special_case(registry: &UnitRegistry, label: &str, magnitude: f64) -> Option<PhysicalQuantity> {
    let lower = label.trim().to_lowercase();
    let unmeasured = TO_TASTE_LABELS.contains(&lower.as_str())
        || TO_TASTE_MARKERS.iter().any(|marker| lower.contains(marker));
    if unmeasured {
        registry.quantity(magnitude, TO_TASTE_UNIT)
    } else {
        None
    }
}

fn token_scan(registry: &UnitRegistry, label: &str, magnitude: f64) -> Option<PhysicalQuantity> {
    let tokens: Vec<&str> = label
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '.'))
        .map(|t| t.trim_start_matches('.'))
        .collect();

    for (i, token) in tokens.iter().enumerate() {
        if token.is_empty() {
            continue;
        }
        if token.chars().any(|c| c.is_ascii_digit()) {
            // "400g", "2tbsp": a unit glued to its number
            if let Some(unit) = attached_unit(registry, token) {
                return Some(PhysicalQuantity::new(magnitude, unit));
            }
            continue;
        }
        // Two-word units like "fl oz" take precedence over their first word.
        if let Some(next) = tokens.get(i + 1) {
            if let Some(unit) = registry.parse_unit(&format!("{} {}", token, next)) {
                return Some(PhysicalQuantity::new(magnitude, unit));
            }
        }
        if let Some(unit) = registry.parse_unit(token) {
            return Some(PhysicalQuantity::new(magnitude, unit));
        }
    }
    None
}

fn attached_unit(registry: &UnitRegistry, token: &str) -> Option<Unit> {
    let captures = QUANTITY_TEXT.captures(token)?;
    registry.parse_unit(&captures["unit"])
}

/// Parses text of the form `<magnitude> <unit>`, e.g. `1 1/2 cups` or `400g`.
pub fn parse_quantity_text(registry: &UnitRegistry, text: &str) -> Result<PhysicalQuantity, LineError> {
    let normalized = RANGE_WORD.replace_all(text.trim(), "$1-$2");
    let unparseable = || LineError::UnparseableQuantity { text: text.to_string() };

    let captures = QUANTITY_TEXT.captures(&normalized).ok_or_else(unparseable)?;
    let magnitude = parse_magnitude(&captures["num"]).ok_or_else(unparseable)?;
    let unit_text = &captures["unit"];
    let unit = registry
        .parse_unit(unit_text)
        .ok_or_else(|| LineError::UnknownUnit(unit_text.to_string()))?;

    Ok(PhysicalQuantity::new(magnitude, unit))
}

/// Parses a magnitude: integers, decimals, `a/b`, unicode fractions, mixed
/// numbers (`2 1/2`, `1½`) and ranges (`1-2`, `1 to 2`), which yield their
/// midpoint.
pub fn parse_magnitude(text: &str) -> Option<f64> {
    let normalized = RANGE_WORD.replace_all(text.trim(), "$1-$2").replace('⁄', "/");

    if let Some((low, high)) = normalized.split_once('-') {
        let low = parse_magnitude(low)?;
        let high = parse_magnitude(high)?;
        return Some((low + high) / 2.0);
    }

    let mut parts = normalized.split_whitespace().peekable();
    parts.peek()?;
    parts.map(parse_simple_magnitude).sum()
}

fn parse_simple_magnitude(part: &str) -> Option<f64> {
    if let Some(last) = part.chars().last() {
        if let Some(fraction) = vulgar_fraction(last) {
            let whole = &part[..part.len() - last.len_utf8()];
            let whole = if whole.is_empty() { 0.0 } else { parse_decimal(whole)? };
            return Some(whole + fraction);
        }
    }

    if let Some((numerator, denominator)) = part.split_once('/') {
        let numerator = parse_decimal(numerator)?;
        let denominator = parse_decimal(denominator)?;
        if denominator == 0.0 {
            return None;
        }
        return Some(numerator / denominator);
    }

    parse_decimal(part)
}

fn parse_decimal(text: &str) -> Option<f64> {
    let valid = !text.is_empty()
        && text.chars().all(|c| c.is_ascii_digit() || c == '.')
        && text.chars().any(|c| c.is_ascii_digit());
    if valid {
        text.parse::<f64>().ok()
    } else {
        None
    }
}

fn vulgar_fraction(c: char) -> Option<f64> {
    let value = match c {
        '½' => 1.0 / 2.0,
        '⅓' => 1.0 / 3.0,
        '⅔' => 2.0 / 3.0,
        '¼' => 1.0 / 4.0,
        '¾' => 3.0 / 4.0,
        '⅕' => 1.0 / 5.0,
        '⅖' => 2.0 / 5.0,
        '⅗' => 3.0 / 5.0,
        '⅘' => 4.0 / 5.0,
        '⅙' => 1.0 / 6.0,
        '⅚' => 5.0 / 6.0,
        '⅛' => 1.0 / 8.0,
        '⅜' => 3.0 / 8.0,
        '⅝' => 5.0 / 8.0,
        '⅞' => 7.0 / 8.0,
        _ => return None,
    };
    Some(value)
}
