//! Calculation outcome returned from each engine call.

use std::fmt;

use crate::parameter::ChemicalParameter;
use crate::units::MeasurementUnit;

/// Overall verdict of one calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseStatus {
    /// Already at or above target; nothing to dose.
    Optimal,
    /// A dose was computed.
    CorrectionNeeded,
    /// Current reading (or pH) is critical; dosing refused.
    OutOfSafeRange,
}

impl DoseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::CorrectionNeeded => "CorrectionNeeded",
            Self::OutOfSafeRange => "OutOfSafeRange",
        }
    }
}

impl fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the caller should show next to the numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Current reading is outside the critical band.
    CriticalReading {
        parameter: ChemicalParameter,
        current: f64,
        low: f64,
        high: f64,
        unit: MeasurementUnit,
    },
    /// pH is too high to add alkalinity at all.
    PhAbort { ph: f64, limit: f64 },
    /// pH is elevated; the schedule was widened.
    HighPhCaution { ph: f64, threshold: f64, factor: f64 },
    /// Correction exceeds the daily limit and is split.
    SpreadOverDays {
        days: u32,
        max_daily_change: f64,
        unit: MeasurementUnit,
    },
    /// Current reading outside the recommended band (advisory).
    CurrentOutsideSafeBand {
        current: f64,
        low: f64,
        high: f64,
        unit: MeasurementUnit,
    },
    /// Requested target outside the recommended band (advisory).
    TargetOutsideSafeBand {
        target: f64,
        low: f64,
        high: f64,
        unit: MeasurementUnit,
    },
    /// Requested target beyond the critical band; the dose is still computed.
    TargetOutsideCriticalBand {
        target: f64,
        low: f64,
        high: f64,
        unit: MeasurementUnit,
    },
}

impl Warning {
    /// Stable machine-readable name.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CriticalReading { .. } => "critical_reading",
            Self::PhAbort { .. } => "ph_abort",
            Self::HighPhCaution { .. } => "high_ph_caution",
            Self::SpreadOverDays { .. } => "spread_over_days",
            Self::CurrentOutsideSafeBand { .. } => "current_outside_safe_band",
            Self::TargetOutsideSafeBand { .. } => "target_outside_safe_band",
            Self::TargetOutsideCriticalBand { .. } => "target_outside_critical_band",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CriticalReading {
                parameter,
                current,
                low,
                high,
                unit,
            } => write!(
                f,
                "{parameter} reading {current:.2} {unit} is outside the critical range {low}-{high} {unit}; do not dose, retest and investigate"
            ),
            Self::PhAbort { ph, limit } => write!(
                f,
                "pH {ph:.2} is at or above {limit:.2}; adding alkalinity now risks precipitation, wait for pH to drop"
            ),
            Self::HighPhCaution {
                ph,
                threshold,
                factor,
            } => write!(
                f,
                "pH {ph:.2} is at or above {threshold:.2}; schedule stretched {factor}x to limit pH swings"
            ),
            Self::SpreadOverDays {
                days,
                max_daily_change,
                unit,
            } => write!(
                f,
                "correction exceeds the safe daily change of {max_daily_change} {unit}; split the dose over {days} days"
            ),
            Self::CurrentOutsideSafeBand {
                current,
                low,
                high,
                unit,
            } => write!(
                f,
                "current reading {current:.2} {unit} is outside the recommended range {low}-{high} {unit}"
            ),
            Self::TargetOutsideSafeBand {
                target,
                low,
                high,
                unit,
            } => write!(
                f,
                "target {target:.2} {unit} is outside the recommended range {low}-{high} {unit}"
            ),
            Self::TargetOutsideCriticalBand {
                target,
                low,
                high,
                unit,
            } => write!(
                f,
                "target {target:.2} {unit} is outside the critical range {low}-{high} {unit}; reaching it would harm livestock, pick a target in the recommended range"
            ),
        }
    }
}

/// Result of one engine call. All chemistry values are canonical.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseResult {
    pub parameter: ChemicalParameter,
    /// Resolved catalog product name; `None` for a custom potency.
    pub product: Option<String>,
    pub current: f64,
    pub target: f64,
    /// `target - current`.
    pub gap: f64,
    pub total_volume_ml: f64,
    /// 0 when nothing is dosed, otherwise >= 1.
    pub day_count: u32,
    pub daily_volume_ml: f64,
    pub status: DoseStatus,
    pub warnings: Vec<Warning>,
}

impl DoseResult {
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    pub fn is_refused(&self) -> bool {
        self.status == DoseStatus::OutOfSafeRange
    }

    pub fn canonical_unit(&self) -> MeasurementUnit {
        self.parameter.canonical_unit()
    }
}
