//! Static reference data: per-parameter bands and limits, the safety policy,
//! and the product catalog.
//!
//! A `ReferenceTable` is built once at startup and never mutated afterwards;
//! every calculation borrows it.

use std::collections::BTreeMap;

use crate::error::{DoseError, Result};
use crate::parameter::ChemicalParameter;
use crate::units::LITERS_PER_GALLON;

/// Reference values for one parameter, all in its canonical unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    /// Ideal value.
    pub target: f64,
    /// Recommended band. Readings outside it only produce an advisory.
    pub safe_low: f64,
    pub safe_high: f64,
    /// Critical band. Readings outside it refuse dosing.
    pub critical_low: f64,
    pub critical_high: f64,
    /// Largest change allowed per 24 h.
    pub max_daily_change: f64,
}

impl ParameterSpec {
    pub const fn new(
        target: f64,
        (safe_low, safe_high): (f64, f64),
        (critical_low, critical_high): (f64, f64),
        max_daily_change: f64,
    ) -> Self {
        Self {
            target,
            safe_low,
            safe_high,
            critical_low,
            critical_high,
            max_daily_change,
        }
    }

    #[inline]
    pub fn in_critical_band(&self, value: f64) -> bool {
        value >= self.critical_low && value <= self.critical_high
    }

    #[inline]
    pub fn in_safe_band(&self, value: f64) -> bool {
        value >= self.safe_low && value <= self.safe_high
    }

    /// Check band ordering and limits. Mirrors `reef_config::Config::validate`
    /// so that tables assembled in code get the same guarantees.
    pub fn validate(&self, parameter: ChemicalParameter) -> Result<()> {
        let all = [
            self.target,
            self.safe_low,
            self.safe_high,
            self.critical_low,
            self.critical_high,
            self.max_daily_change,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(DoseError::config(format!(
                "{parameter}: reference values must be finite"
            )));
        }
        if !(self.critical_low >= 0.0
            && self.critical_low <= self.safe_low
            && self.safe_low < self.safe_high
            && self.safe_high <= self.critical_high)
        {
            return Err(DoseError::config(format!(
                "{parameter}: bands must satisfy 0 <= critical_low <= safe_low < safe_high <= critical_high"
            )));
        }
        if !self.in_safe_band(self.target) {
            return Err(DoseError::config(format!(
                "{parameter}: target {} outside safe band [{}, {}]",
                self.target, self.safe_low, self.safe_high
            )));
        }
        if self.max_daily_change <= 0.0 {
            return Err(DoseError::config(format!(
                "{parameter}: max_daily_change must be > 0"
            )));
        }
        Ok(())
    }
}

/// pH guard applied to alkalinity dosing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyPolicy {
    /// At or above this pH the schedule is widened by `ph_caution_factor`.
    pub ph_caution: f64,
    /// `days = max(days, ceil(days * factor))` when the caution trips.
    pub ph_caution_factor: f64,
    /// At or above this pH alkalinity dosing is refused outright.
    pub ph_abort: f64,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            ph_caution: 8.35,
            ph_caution_factor: 1.5,
            ph_abort: 8.6,
        }
    }
}

impl SafetyPolicy {
    pub fn validate(&self) -> Result<()> {
        if !(self.ph_caution > 0.0 && self.ph_caution <= 14.0) {
            return Err(DoseError::config("ph_caution must be in (0, 14]"));
        }
        if !(self.ph_caution_factor.is_finite() && self.ph_caution_factor >= 1.0) {
            return Err(DoseError::config("ph_caution_factor must be >= 1"));
        }
        if !(self.ph_abort.is_finite() && self.ph_abort >= self.ph_caution) {
            return Err(DoseError::config("ph_abort must be >= ph_caution"));
        }
        Ok(())
    }
}

/// Water volume a potency figure was measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PotencyBasis {
    #[default]
    PerLiter,
    PerGallon,
    Per100Liters,
    Per100Gallons,
}

impl PotencyBasis {
    pub fn reference_liters(self) -> f64 {
        match self {
            Self::PerLiter => 1.0,
            Self::PerGallon => LITERS_PER_GALLON,
            Self::Per100Liters => 100.0,
            Self::Per100Gallons => 100.0 * LITERS_PER_GALLON,
        }
    }
}

/// Strength of an additive.
///
/// Stored in a single convention: the canonical-unit rise produced by
/// dosing **1 mL into 1 liter** of water. Figures declared against another
/// reference volume are converted on construction (1 mL into a larger
/// volume raises it proportionally less, so per-liter = declared ×
/// reference liters). Always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Potency {
    per_liter: f64,
}

impl Potency {
    /// `None` unless `value` is finite and > 0.
    pub fn declared(value: f64, basis: PotencyBasis) -> Option<Self> {
        if !(value.is_finite() && value > 0.0) {
            return None;
        }
        let per_liter = value * basis.reference_liters();
        per_liter.is_finite().then_some(Self { per_liter })
    }

    pub fn per_liter(value: f64) -> Option<Self> {
        Self::declared(value, PotencyBasis::PerLiter)
    }

    /// Canonical-unit rise per mL per liter.
    #[inline]
    pub fn value(self) -> f64 {
        self.per_liter
    }
}

/// A named catalog additive.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub parameter: ChemicalParameter,
    pub potency: Potency,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        parameter: ChemicalParameter,
        potency: f64,
        basis: PotencyBasis,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DoseError::config("product name must not be empty"));
        }
        if !(potency.is_finite() && potency > 0.0) {
            return Err(DoseError::config(format!(
                "product '{name}': potency must be finite and > 0"
            )));
        }
        let potency = Potency::declared(potency, basis).ok_or_else(|| {
            DoseError::config(format!(
                "product '{name}': potency {potency} overflows when converted to per liter"
            ))
        })?;
        Ok(Self {
            name,
            parameter,
            potency,
        })
    }
}

/// Immutable reference data handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    parameters: BTreeMap<ChemicalParameter, ParameterSpec>,
    products: Vec<Product>,
    safety: SafetyPolicy,
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ReferenceTable {
    /// A table with no parameters and no products.
    pub fn empty(safety: SafetyPolicy) -> Self {
        Self {
            parameters: BTreeMap::new(),
            products: Vec::new(),
            safety,
        }
    }

    /// Built-in reef defaults and starter catalog.
    pub fn standard() -> Self {
        use ChemicalParameter::*;
        let parameters = BTreeMap::from([
            (Alkalinity, ParameterSpec::new(8.5, (7.0, 11.0), (5.0, 14.0), 1.4)),
            (
                Calcium,
                ParameterSpec::new(430.0, (400.0, 450.0), (350.0, 550.0), 20.0),
            ),
            (
                Magnesium,
                ParameterSpec::new(1350.0, (1250.0, 1450.0), (1000.0, 1700.0), 100.0),
            ),
            (Nitrate, ParameterSpec::new(5.0, (2.0, 10.0), (0.0, 50.0), 2.0)),
            (Phosphate, ParameterSpec::new(0.05, (0.03, 0.10), (0.0, 1.0), 0.02)),
        ]);
        let per_l = |name: &str, p: ChemicalParameter, v: f64, basis: PotencyBasis| Product {
            name: name.to_string(),
            parameter: p,
            potency: Potency {
                per_liter: v * basis.reference_liters(),
            },
        };
        let products = vec![
            per_l("Two-Part Alkalinity", Alkalinity, 1.4, PotencyBasis::PerGallon),
            per_l("Two-Part Calcium", Calcium, 20.0, PotencyBasis::PerGallon),
            per_l("Liquid Magnesium", Magnesium, 25.0, PotencyBasis::PerGallon),
            per_l("Nitrate Supplement", Nitrate, 1.0, PotencyBasis::Per100Liters),
            per_l("Phosphate Supplement", Phosphate, 0.01, PotencyBasis::Per100Liters),
        ];
        Self {
            parameters,
            products,
            safety: SafetyPolicy::default(),
        }
    }

    /// Insert or replace the spec for `parameter` after validating it.
    pub fn with_parameter(mut self, parameter: ChemicalParameter, spec: ParameterSpec) -> Result<Self> {
        spec.validate(parameter)?;
        self.parameters.insert(parameter, spec);
        Ok(self)
    }

    pub fn with_safety(mut self, safety: SafetyPolicy) -> Result<Self> {
        safety.validate()?;
        self.safety = safety;
        Ok(self)
    }

    /// Append a product; names are unique case-insensitively.
    pub fn with_product(mut self, product: Product) -> Result<Self> {
        if self.find_product(&product.name).is_some() {
            return Err(DoseError::config(format!(
                "duplicate product name '{}'",
                product.name
            )));
        }
        self.products.push(product);
        Ok(self)
    }

    /// Replace the whole catalog.
    pub fn with_products(mut self, products: Vec<Product>) -> Result<Self> {
        self.products.clear();
        products.into_iter().try_fold(self, Self::with_product)
    }

    /// Reference spec for `parameter`; a miss is a configuration error.
    pub fn spec(&self, parameter: ChemicalParameter) -> Result<&ParameterSpec> {
        self.parameters.get(&parameter).ok_or_else(|| {
            DoseError::config(format!("no reference data for parameter {parameter}"))
        })
    }

    /// Catalog product by name (case-insensitive); a miss is a configuration error.
    pub fn product(&self, name: &str) -> Result<&Product> {
        self.find_product(name).ok_or_else(|| {
            DoseError::config(format!("product '{}' not found in catalog", name.trim()))
        })
    }

    fn find_product(&self, name: &str) -> Option<&Product> {
        let needle = name.trim();
        self.products
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(needle))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn products_for(&self, parameter: ChemicalParameter) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.parameter == parameter)
    }

    pub fn parameters(&self) -> impl Iterator<Item = (ChemicalParameter, &ParameterSpec)> {
        self.parameters.iter().map(|(k, v)| (*k, v))
    }

    pub fn safety(&self) -> &SafetyPolicy {
        &self.safety
    }
}
