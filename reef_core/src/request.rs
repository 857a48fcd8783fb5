//! Calculation inputs: the typed `DoseRequest` and the raw, text-typed
//! `DoseForm` a UI hands over before anything has been parsed.

use crate::builder::{DoseRequestBuilder, Missing};
use crate::error::{DoseError, Result};
use crate::parameter::ChemicalParameter;
use crate::reference::{Potency, PotencyBasis};
use crate::units::{MeasurementUnit, VolumeUnit};

/// Which additive to dose with.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductChoice {
    /// Look the product up in the reference catalog by name.
    Catalog(String),
    /// User-supplied potency, already converted to per-liter.
    Custom(Potency),
}

impl ProductChoice {
    pub fn catalog(name: impl Into<String>) -> Self {
        Self::Catalog(name.into())
    }

    /// Custom potency declared against `basis`; must be finite and > 0.
    pub fn custom(potency: f64, basis: PotencyBasis) -> Result<Self> {
        Potency::declared(potency, basis)
            .map(Self::Custom)
            .ok_or_else(|| DoseError::invalid("potency", "must be a finite number > 0"))
    }
}

/// One dosing calculation request.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseRequest {
    pub parameter: ChemicalParameter,
    pub current_value: f64,
    pub current_unit: MeasurementUnit,
    pub target_value: f64,
    pub target_unit: MeasurementUnit,
    pub tank_volume: f64,
    pub volume_unit: VolumeUnit,
    pub product: ProductChoice,
    pub ph: Option<f64>,
}

impl DoseRequest {
    pub fn builder() -> DoseRequestBuilder<Missing, Missing, Missing, Missing> {
        DoseRequestBuilder::default()
    }

    /// Domain checks that do not need reference data.
    pub fn validate(&self) -> Result<()> {
        reading("current_value", self.current_value)?;
        reading("target_value", self.target_value)?;
        if !self.parameter.accepts(self.current_unit) {
            return Err(DoseError::invalid(
                "current_unit",
                format!("{} cannot be measured in {}", self.parameter, self.current_unit),
            ));
        }
        if !self.parameter.accepts(self.target_unit) {
            return Err(DoseError::invalid(
                "target_unit",
                format!("{} cannot be measured in {}", self.parameter, self.target_unit),
            ));
        }
        if !(self.tank_volume.is_finite() && self.tank_volume > 0.0) {
            return Err(DoseError::invalid("tank_volume", "must be a finite number > 0"));
        }
        if let Some(ph) = self.ph
            && !(ph.is_finite() && (0.0..=14.0).contains(&ph))
        {
            return Err(DoseError::invalid("ph", "must be within 0..=14"));
        }
        Ok(())
    }
}

fn reading(field: &'static str, v: f64) -> Result<()> {
    if !v.is_finite() {
        return Err(DoseError::invalid(field, "must be a finite number"));
    }
    if v < 0.0 {
        return Err(DoseError::invalid(field, "must be >= 0"));
    }
    Ok(())
}

/// A dosing request exactly as typed into a form. Blank strings count as missing.
///
/// Defaults applied by [`DoseForm::parse`]:
/// - reading units default to the parameter's canonical unit,
/// - the volume unit defaults to gallons,
/// - a custom potency basis defaults to per-liter.
#[derive(Debug, Clone, Default)]
pub struct DoseForm {
    pub parameter: Option<String>,
    pub current_value: Option<String>,
    pub current_unit: Option<String>,
    pub target_value: Option<String>,
    pub target_unit: Option<String>,
    pub tank_volume: Option<String>,
    pub volume_unit: Option<String>,
    /// Catalog product name; takes precedence over `custom_potency`.
    pub product: Option<String>,
    pub custom_potency: Option<String>,
    pub potency_basis: Option<String>,
    pub ph: Option<String>,
}

impl DoseForm {
    pub fn parse(&self) -> Result<DoseRequest> {
        let parameter: ChemicalParameter = required("parameter", &self.parameter)?.parse()?;
        let current_value = number("current_value", required("current_value", &self.current_value)?)?;
        let target_value = number("target_value", required("target_value", &self.target_value)?)?;
        let tank_volume = number("tank_volume", required("tank_volume", &self.tank_volume)?)?;

        let current_unit = unit("current_unit", &self.current_unit, parameter)?;
        let target_unit = unit("target_unit", &self.target_unit, parameter)?;
        let volume_unit = match present(&self.volume_unit) {
            Some(s) => s.parse()?,
            None => VolumeUnit::Gallons,
        };

        let product = match (present(&self.product), present(&self.custom_potency)) {
            (Some(name), _) => ProductChoice::catalog(name),
            (None, Some(p)) => {
                let basis = match present(&self.potency_basis) {
                    Some(b) => parse_basis(b)?,
                    None => PotencyBasis::PerLiter,
                };
                ProductChoice::custom(number("potency", p)?, basis)?
            }
            (None, None) => return Err(DoseError::missing("product")),
        };

        let ph = present(&self.ph).map(|s| number("ph", s)).transpose()?;

        let request = DoseRequest {
            parameter,
            current_value,
            current_unit,
            target_value,
            target_unit,
            tank_volume,
            volume_unit,
            product,
            ph,
        };
        request.validate()?;
        Ok(request)
    }
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required<'a>(field: &'static str, v: &'a Option<String>) -> Result<&'a str> {
    present(v).ok_or_else(|| DoseError::missing(field))
}

fn number(field: &'static str, s: &str) -> Result<f64> {
    let v: f64 = s
        .parse()
        .map_err(|_| DoseError::invalid(field, format!("'{s}' is not a number")))?;
    if !v.is_finite() {
        return Err(DoseError::invalid(field, format!("'{s}' is not a finite number")));
    }
    Ok(v)
}

fn unit(
    field: &'static str,
    v: &Option<String>,
    parameter: ChemicalParameter,
) -> Result<MeasurementUnit> {
    match present(v) {
        Some(s) => s.parse::<MeasurementUnit>().map_err(|e| match e {
            DoseError::InvalidInput { reason, .. } => DoseError::InvalidInput { field, reason },
            other => other,
        }),
        None => Ok(parameter.canonical_unit()),
    }
}

/// Parse a potency basis: `liter`, `gallon`, `100l`, `100gal` (plus common spellings).
pub fn parse_basis(s: &str) -> Result<PotencyBasis> {
    match s.trim().to_ascii_lowercase().as_str() {
        "l" | "liter" | "litre" => Ok(PotencyBasis::PerLiter),
        "gal" | "gallon" => Ok(PotencyBasis::PerGallon),
        "100l" | "100_liters" => Ok(PotencyBasis::Per100Liters),
        "100gal" | "100_gallons" => Ok(PotencyBasis::Per100Gallons),
        other => Err(DoseError::invalid(
            "potency_basis",
            format!("unknown basis '{other}' (expected liter, gallon, 100l or 100gal)"),
        )),
    }
}
