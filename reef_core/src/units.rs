//! Unit normalization.
//!
//! All internal math runs in each parameter's canonical unit: dKH for
//! alkalinity, ppm for everything else. Tank volumes run in liters.

use std::fmt;
use std::str::FromStr;

use crate::error::{DoseError, Result};
use crate::parameter::ChemicalParameter;

/// ppm (as CaCO3) per 1 dKH.
pub const PPM_PER_DKH: f64 = 17.86;
/// Liters per US gallon.
pub const LITERS_PER_GALLON: f64 = 3.78541;
/// Alkalinity readings above this are almost certainly ppm, not dKH.
pub const ALK_PPM_SUGGEST_ABOVE: f64 = 25.0;

/// Unit a chemistry reading is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementUnit {
    Dkh,
    Ppm,
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dkh => "dKH",
            Self::Ppm => "ppm",
        })
    }
}

impl FromStr for MeasurementUnit {
    type Err = DoseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dkh" | "kh" => Ok(Self::Dkh),
            "ppm" | "mg/l" => Ok(Self::Ppm),
            other => Err(DoseError::invalid(
                "unit",
                format!("unknown unit '{other}' (expected dKH or ppm)"),
            )),
        }
    }
}

/// Unit a tank volume is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeUnit {
    Gallons,
    Liters,
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gallons => "gal",
            Self::Liters => "L",
        })
    }
}

impl FromStr for VolumeUnit {
    type Err = DoseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gal" | "gallon" | "gallons" => Ok(Self::Gallons),
            "l" | "liter" | "liters" | "litre" | "litres" => Ok(Self::Liters),
            other => Err(DoseError::invalid(
                "volume_unit",
                format!("unknown volume unit '{other}' (expected gal or L)"),
            )),
        }
    }
}

/// Express `value` (given in `unit`) in the canonical unit of `parameter`.
pub fn normalize(value: f64, unit: MeasurementUnit, parameter: ChemicalParameter) -> Result<f64> {
    match (parameter, unit) {
        (ChemicalParameter::Alkalinity, MeasurementUnit::Ppm) => Ok(value / PPM_PER_DKH),
        (ChemicalParameter::Alkalinity, MeasurementUnit::Dkh) => Ok(value),
        (_, MeasurementUnit::Ppm) => Ok(value),
        (p, u) => Err(unsupported(p, u)),
    }
}

/// Inverse of [`normalize`]: express a canonical value in `unit`.
pub fn to_unit(canonical: f64, unit: MeasurementUnit, parameter: ChemicalParameter) -> Result<f64> {
    match (parameter, unit) {
        (ChemicalParameter::Alkalinity, MeasurementUnit::Ppm) => Ok(canonical * PPM_PER_DKH),
        (ChemicalParameter::Alkalinity, MeasurementUnit::Dkh) => Ok(canonical),
        (_, MeasurementUnit::Ppm) => Ok(canonical),
        (p, u) => Err(unsupported(p, u)),
    }
}

fn unsupported(parameter: ChemicalParameter, unit: MeasurementUnit) -> DoseError {
    DoseError::invalid(
        "unit",
        format!("{parameter} cannot be measured in {unit}"),
    )
}

/// Convert a tank volume to liters.
#[inline]
pub fn to_liters(volume: f64, unit: VolumeUnit) -> f64 {
    match unit {
        VolumeUnit::Gallons => volume * LITERS_PER_GALLON,
        VolumeUnit::Liters => volume,
    }
}

/// Guess which unit a raw reading was taken in.
///
/// Only alkalinity has two units. A reading above
/// [`ALK_PPM_SUGGEST_ABOVE`] is treated as ppm, anything else positive as
/// dKH. Non-finite or non-positive readings carry no signal, so the
/// declared unit is returned unchanged. The engine never calls this; UI
/// collaborators may apply it before building a request.
pub fn suggest_unit(
    parameter: ChemicalParameter,
    value: f64,
    declared: MeasurementUnit,
) -> MeasurementUnit {
    if parameter != ChemicalParameter::Alkalinity {
        return parameter.canonical_unit();
    }
    if !value.is_finite() || value <= 0.0 {
        return declared;
    }
    if value > ALK_PPM_SUGGEST_ABOVE {
        MeasurementUnit::Ppm
    } else {
        MeasurementUnit::Dkh
    }
}
