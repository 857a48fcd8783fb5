//! `From`/`TryFrom` implementations bridging `reef_config` types to `reef_core` types.
//!
//! All potency conversion to the per-liter convention happens here, once,
//! when the catalog is loaded.

use crate::error::{DoseError, Result};
use crate::parameter::ChemicalParameter;
use crate::reference::{ParameterSpec, PotencyBasis, Product, ReferenceTable, SafetyPolicy};

// ── ParameterName ────────────────────────────────────────────────────────────

impl From<reef_config::ParameterName> for ChemicalParameter {
    fn from(p: reef_config::ParameterName) -> Self {
        use reef_config::ParameterName as N;
        match p {
            N::Alkalinity => Self::Alkalinity,
            N::Calcium => Self::Calcium,
            N::Magnesium => Self::Magnesium,
            N::Nitrate => Self::Nitrate,
            N::Phosphate => Self::Phosphate,
        }
    }
}

// ── Basis ────────────────────────────────────────────────────────────────────

impl From<reef_config::Basis> for PotencyBasis {
    fn from(b: reef_config::Basis) -> Self {
        use reef_config::Basis as B;
        match b {
            B::Liter => Self::PerLiter,
            B::Gallon => Self::PerGallon,
            B::HundredLiters => Self::Per100Liters,
            B::HundredGallons => Self::Per100Gallons,
        }
    }
}

// ── ParameterCfg ─────────────────────────────────────────────────────────────

impl From<&reef_config::ParameterCfg> for ParameterSpec {
    fn from(c: &reef_config::ParameterCfg) -> Self {
        Self {
            target: c.target,
            safe_low: c.safe_low,
            safe_high: c.safe_high,
            critical_low: c.critical_low,
            critical_high: c.critical_high,
            max_daily_change: c.max_daily_change,
        }
    }
}

// ── Safety ───────────────────────────────────────────────────────────────────

impl From<&reef_config::Safety> for SafetyPolicy {
    fn from(c: &reef_config::Safety) -> Self {
        Self {
            ph_caution: c.ph_caution,
            ph_caution_factor: c.ph_caution_factor,
            ph_abort: c.ph_abort,
        }
    }
}

// ── ProductRow ───────────────────────────────────────────────────────────────

impl TryFrom<&reef_config::ProductRow> for Product {
    type Error = DoseError;

    fn try_from(row: &reef_config::ProductRow) -> Result<Self> {
        Product::new(
            row.name.as_str(),
            row.parameter.into(),
            row.potency,
            row.basis.into(),
        )
    }
}

/// Convert a whole catalog, failing on the first bad row.
pub fn products_from_rows(rows: &[reef_config::ProductRow]) -> Result<Vec<Product>> {
    rows.iter().map(Product::try_from).collect()
}

// ── Config ───────────────────────────────────────────────────────────────────

/// Start from the built-in table and layer the config on top: parameter
/// overrides replace individual specs, a non-empty `[[products]]` list
/// replaces the catalog.
impl TryFrom<&reef_config::Config> for ReferenceTable {
    type Error = DoseError;

    fn try_from(cfg: &reef_config::Config) -> Result<Self> {
        let mut table = ReferenceTable::standard().with_safety((&cfg.safety).into())?;
        for name in reef_config::ParameterName::ALL {
            if let Some(p) = cfg.parameters.get(name) {
                table = table.with_parameter(name.into(), p.into())?;
            }
        }
        if !cfg.products.is_empty() {
            table = table.with_products(products_from_rows(&cfg.products)?)?;
        }
        tracing::debug!(
            products = table.products().len(),
            "reference table loaded from config"
        );
        Ok(table)
    }
}
