//! The five dosable water parameters.

use std::fmt;
use std::str::FromStr;

use crate::error::{DoseError, Result};
use crate::units::MeasurementUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChemicalParameter {
    Alkalinity,
    Calcium,
    Magnesium,
    Nitrate,
    Phosphate,
}

impl ChemicalParameter {
    pub const ALL: [Self; 5] = [
        Self::Alkalinity,
        Self::Calcium,
        Self::Magnesium,
        Self::Nitrate,
        Self::Phosphate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Alkalinity => "Alkalinity",
            Self::Calcium => "Calcium",
            Self::Magnesium => "Magnesium",
            Self::Nitrate => "Nitrate",
            Self::Phosphate => "Phosphate",
        }
    }

    /// Unit all engine math for this parameter runs in.
    pub fn canonical_unit(self) -> MeasurementUnit {
        match self {
            Self::Alkalinity => MeasurementUnit::Dkh,
            _ => MeasurementUnit::Ppm,
        }
    }

    /// Second accepted unit, if any (alkalinity only).
    pub fn alternate_unit(self) -> Option<MeasurementUnit> {
        match self {
            Self::Alkalinity => Some(MeasurementUnit::Ppm),
            _ => None,
        }
    }

    pub fn accepts(self, unit: MeasurementUnit) -> bool {
        unit == self.canonical_unit() || Some(unit) == self.alternate_unit()
    }
}

impl fmt::Display for ChemicalParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChemicalParameter {
    type Err = DoseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alkalinity" | "alk" | "kh" => Ok(Self::Alkalinity),
            "calcium" | "ca" => Ok(Self::Calcium),
            "magnesium" | "mg" => Ok(Self::Magnesium),
            "nitrate" | "no3" => Ok(Self::Nitrate),
            "phosphate" | "po4" => Ok(Self::Phosphate),
            other => Err(DoseError::invalid(
                "parameter",
                format!("unknown parameter '{other}'"),
            )),
        }
    }
}
