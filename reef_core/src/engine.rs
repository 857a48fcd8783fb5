//! The dosing engine: normalize → check safe range → gap → dose → schedule.
//!
//! Every call is a pure function of the request and the borrowed
//! `ReferenceTable`; the engine keeps no per-call state.

use crate::calculator::{self, dose_volume_ml};
use crate::error::{DoseError, Result};
use crate::reference::{ParameterSpec, Potency, ReferenceTable};
use crate::request::{DoseForm, DoseRequest, ProductChoice};
use crate::scheduler::{check_safe_range, schedule};
use crate::status::{DoseResult, DoseStatus, Warning};
use crate::units::{normalize, to_liters};

/// Stateless calculator bound to one reference table.
#[derive(Debug, Clone, Default)]
pub struct DosingEngine {
    table: ReferenceTable,
}

impl DosingEngine {
    pub fn new(table: ReferenceTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    pub fn calculate(&self, request: &DoseRequest) -> Result<DoseResult> {
        calculate(&self.table, request)
    }

    /// Parse a raw form, then calculate. Parse failures are `InvalidInput`.
    pub fn calculate_form(&self, form: &DoseForm) -> Result<DoseResult> {
        let request = form.parse()?;
        self.calculate(&request)
    }
}

/// Resolve the additive: catalog lookup (a miss is a configuration error,
/// never a default potency) or the user's custom figure.
fn resolve_product<'a>(
    table: &'a ReferenceTable,
    request: &DoseRequest,
) -> Result<(Option<&'a str>, Potency)> {
    match &request.product {
        ProductChoice::Catalog(name) => {
            let product = table.product(name)?;
            if product.parameter != request.parameter {
                return Err(DoseError::invalid(
                    "product",
                    format!(
                        "'{}' doses {}, not {}",
                        product.name, product.parameter, request.parameter
                    ),
                ));
            }
            Ok((Some(product.name.as_str()), product.potency))
        }
        ProductChoice::Custom(potency) => Ok((None, *potency)),
    }
}

fn advisories(request: &DoseRequest, spec: &ParameterSpec, current: f64, target: f64) -> Vec<Warning> {
    let unit = request.parameter.canonical_unit();
    let mut out = Vec::new();
    if !spec.in_safe_band(current) {
        out.push(Warning::CurrentOutsideSafeBand {
            current,
            low: spec.safe_low,
            high: spec.safe_high,
            unit,
        });
    }
    if !spec.in_critical_band(target) {
        out.push(Warning::TargetOutsideCriticalBand {
            target,
            low: spec.critical_low,
            high: spec.critical_high,
            unit,
        });
    } else if !spec.in_safe_band(target) {
        out.push(Warning::TargetOutsideSafeBand {
            target,
            low: spec.safe_low,
            high: spec.safe_high,
            unit,
        });
    }
    out
}

/// Run one calculation against `table`.
pub fn calculate(table: &ReferenceTable, request: &DoseRequest) -> Result<DoseResult> {
    request.validate()?;
    let parameter = request.parameter;
    let spec = table.spec(parameter)?;
    let (product, potency) = resolve_product(table, request)?;

    // Normalize
    let current = normalize(request.current_value, request.current_unit, parameter)?;
    let target = normalize(request.target_value, request.target_unit, parameter)?;
    let volume_liters = to_liters(request.tank_volume, request.volume_unit);
    let gap = calculator::gap(current, target);

    let mut result = DoseResult {
        parameter,
        product: product.map(str::to_string),
        current,
        target,
        gap,
        total_volume_ml: 0.0,
        day_count: 0,
        daily_volume_ml: 0.0,
        status: DoseStatus::Optimal,
        warnings: Vec::new(),
    };

    // Check safe range
    if let Some(w) = check_safe_range(parameter, current, spec, request.ph, table.safety()) {
        tracing::warn!(
            parameter = parameter.name(),
            current,
            ph = request.ph,
            reason = w.code(),
            "dosing refused"
        );
        result.status = DoseStatus::OutOfSafeRange;
        result.warnings.push(w);
        return Ok(result);
    }

    result.warnings = advisories(request, spec, current, target);

    // Gap
    if gap <= 0.0 {
        tracing::debug!(parameter = parameter.name(), current, target, "already at target");
        return Ok(result);
    }

    // Dose + schedule
    let total = dose_volume_ml(gap, volume_liters, potency);
    if !total.is_finite() {
        return Err(DoseError::invalid(
            "tank_volume",
            "dose volume overflows; check tank volume and potency",
        ));
    }
    let plan = schedule(parameter, gap, total, spec, request.ph, table.safety());
    tracing::debug!(
        parameter = parameter.name(),
        gap,
        volume_liters,
        potency = potency.value(),
        total_ml = total,
        days = plan.day_count,
        ph_widened = plan.ph_widened,
        "dose computed"
    );

    result.status = DoseStatus::CorrectionNeeded;
    result.total_volume_ml = total;
    result.day_count = plan.day_count;
    result.daily_volume_ml = plan.daily_volume_ml;
    result.warnings.extend(plan.warnings);
    Ok(result)
}
