//! Safety scheduler: critical-band refusal, daily-limit splitting and the
//! alkalinity pH guard.

use crate::parameter::ChemicalParameter;
use crate::reference::{ParameterSpec, SafetyPolicy};
use crate::status::Warning;

/// Slack for ratios that land a hair above an integer (2.8 / 1.4 = 2.0000000000000004).
const RATIO_EPSILON: f64 = 1e-9;

/// Dosing schedule for a positive gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    /// Always >= 1.
    pub day_count: u32,
    pub daily_volume_ml: f64,
    pub ph_widened: bool,
    pub warnings: Vec<Warning>,
}

#[inline]
fn ceil_days(x: f64) -> u32 {
    // `as` saturates, so absurd ratios clamp to u32::MAX instead of wrapping.
    (x - RATIO_EPSILON).ceil().max(1.0) as u32
}

/// Days needed to move `|gap|` without exceeding `max_daily_change` per day. Minimum 1.
pub fn base_days(gap: f64, max_daily_change: f64) -> u32 {
    ceil_days(gap.abs() / max_daily_change)
}

/// `max(days, ceil(days * factor))`.
pub fn widen_days(days: u32, factor: f64) -> u32 {
    days.max(ceil_days(f64::from(days) * factor))
}

/// Decide whether dosing must be refused before any dose is computed.
///
/// Returns the warning to surface when the current reading sits outside the
/// critical band, or when pH is at or above the abort limit for alkalinity.
pub fn check_safe_range(
    parameter: ChemicalParameter,
    current: f64,
    spec: &ParameterSpec,
    ph: Option<f64>,
    policy: &SafetyPolicy,
) -> Option<Warning> {
    if !spec.in_critical_band(current) {
        return Some(Warning::CriticalReading {
            parameter,
            current,
            low: spec.critical_low,
            high: spec.critical_high,
            unit: parameter.canonical_unit(),
        });
    }
    match ph {
        Some(ph) if parameter == ChemicalParameter::Alkalinity && ph >= policy.ph_abort => {
            Some(Warning::PhAbort {
                ph,
                limit: policy.ph_abort,
            })
        }
        _ => None,
    }
}

/// Spread `total_ml` over enough days to respect the daily limit, widening
/// further for alkalinity at elevated pH.
pub fn schedule(
    parameter: ChemicalParameter,
    gap: f64,
    total_ml: f64,
    spec: &ParameterSpec,
    ph: Option<f64>,
    policy: &SafetyPolicy,
) -> Schedule {
    let mut days = base_days(gap, spec.max_daily_change);
    let mut warnings = Vec::new();

    let ph_widened = match ph {
        Some(ph) if parameter == ChemicalParameter::Alkalinity && ph >= policy.ph_caution => {
            days = widen_days(days, policy.ph_caution_factor);
            warnings.push(Warning::HighPhCaution {
                ph,
                threshold: policy.ph_caution,
                factor: policy.ph_caution_factor,
            });
            true
        }
        _ => false,
    };

    if days > 1 {
        warnings.push(Warning::SpreadOverDays {
            days,
            max_daily_change: spec.max_daily_change,
            unit: parameter.canonical_unit(),
        });
    }

    Schedule {
        day_count: days,
        daily_volume_ml: total_ml / f64::from(days),
        ph_widened,
        warnings,
    }
}
