//! Table loading, command handlers, and result rendering.

use std::path::Path;

use eyre::WrapErr;
use reef_core::{
    ChemicalParameter, DoseError, DoseForm, DoseResult, DoseStatus, DosingEngine, MeasurementUnit,
    ReferenceTable, suggest_unit,
};
use serde_json::json;

use crate::cli::DoseArgs;

/// Exit code for a dose the engine refused to schedule.
pub const EXIT_REFUSED: u8 = 5;

fn config_error(e: &eyre::Report) -> eyre::Report {
    DoseError::config(format!("{e:#}")).into()
}

/// Read and validate the TOML config; no path means built-in defaults.
pub fn load_config(path: Option<&Path>) -> eyre::Result<reef_config::Config> {
    let Some(path) = path else {
        return Ok(reef_config::Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))
        .map_err(|e| config_error(&e))?;
    let cfg = reef_config::load_toml(&text)
        .map_err(|e| DoseError::config(format!("parse {}: {e}", path.display())))?;
    cfg.validate().map_err(|e| config_error(&e))?;
    Ok(cfg)
}

/// Layer config and catalog CSV over the built-in table.
pub fn build_table(
    cfg: &reef_config::Config,
    products_csv: Option<&Path>,
) -> eyre::Result<ReferenceTable> {
    let mut table = ReferenceTable::try_from(cfg)?;
    if let Some(path) = products_csv {
        let rows = reef_config::load_products_csv(path).map_err(|e| config_error(&e))?;
        let products = reef_core::conversions::products_from_rows(&rows)?;
        table = table.with_products(products)?;
        tracing::info!(path = %path.display(), count = rows.len(), "product catalog loaded");
    }
    Ok(table)
}

fn form_from_args(args: &DoseArgs) -> DoseForm {
    DoseForm {
        parameter: Some(args.parameter.clone()),
        current_value: Some(args.current.clone()),
        current_unit: args.current_unit.clone(),
        target_value: Some(args.target.clone()),
        target_unit: args.target_unit.clone(),
        tank_volume: Some(args.volume.clone()),
        volume_unit: args.volume_unit.clone(),
        product: args.product.clone(),
        custom_potency: args.potency.clone(),
        potency_basis: args.potency_basis.clone(),
        ph: args.ph.clone(),
    }
}

/// Swap reading units for the suggested ones. Anything unparsable is left
/// for `DoseForm::parse` to report.
fn apply_auto_unit(form: &mut DoseForm) {
    let Some(parameter) = form
        .parameter
        .as_deref()
        .and_then(|p| p.parse::<ChemicalParameter>().ok())
    else {
        return;
    };
    let readings = [
        ("current", &form.current_value, &mut form.current_unit),
        ("target", &form.target_value, &mut form.target_unit),
    ];
    for (which, value, unit) in readings {
        let Some(v) = value.as_deref().and_then(|v| v.trim().parse::<f64>().ok()) else {
            continue;
        };
        let declared = unit
            .as_deref()
            .and_then(|u| u.parse::<MeasurementUnit>().ok())
            .unwrap_or_else(|| parameter.canonical_unit());
        let suggested = suggest_unit(parameter, v, declared);
        if suggested != declared {
            tracing::info!(reading = which, value = v, from = %declared, to = %suggested, "auto-unit applied");
        }
        *unit = Some(suggested.to_string());
    }
}

pub fn run_dose(engine: &DosingEngine, args: &DoseArgs, json_mode: bool) -> eyre::Result<u8> {
    let mut form = form_from_args(args);
    if args.auto_unit {
        apply_auto_unit(&mut form);
    }
    let result = engine.calculate_form(&form)?;
    tracing::info!(
        parameter = result.parameter.name(),
        status = result.status.as_str(),
        total_ml = result.total_volume_ml,
        days = result.day_count,
        "dose calculated"
    );

    let tank = args.tank_name.as_deref();
    if json_mode {
        println!("{}", result_json(&result, tank));
    } else {
        print!("{}", render_text(&result, tank));
    }
    Ok(if result.is_refused() { EXIT_REFUSED } else { 0 })
}

pub fn run_products(engine: &DosingEngine, json_mode: bool) {
    let products = engine.table().products();
    if json_mode {
        let items: Vec<_> = products
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "parameter": p.parameter.name(),
                    "unit": p.parameter.canonical_unit().to_string(),
                    "potency_per_liter": p.potency.value(),
                })
            })
            .collect();
        println!("{}", json!({ "products": items }));
        return;
    }
    println!("{:<24} {:<12} potency (1 mL in 1 L)", "name", "parameter");
    for p in products {
        println!(
            "{:<24} {:<12} {:.4} {}",
            p.name,
            p.parameter.name(),
            p.potency.value(),
            p.parameter.canonical_unit()
        );
    }
}

pub fn run_suggest_unit(
    parameter: &str,
    value: &str,
    unit: Option<&str>,
    json_mode: bool,
) -> eyre::Result<()> {
    let parameter: ChemicalParameter = parameter.parse()?;
    let raw = value.trim();
    let value = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DoseError::invalid("value", format!("'{raw}' is not a finite number")))?;
    let declared = match unit {
        Some(u) => u.parse::<MeasurementUnit>().map_err(|e| match e {
            DoseError::InvalidInput { reason, .. } => DoseError::invalid("unit", reason),
            other => other,
        })?,
        None => parameter.canonical_unit(),
    };
    let suggested = suggest_unit(parameter, value, declared);
    if json_mode {
        println!(
            "{}",
            json!({
                "parameter": parameter.name(),
                "value": value,
                "declared_unit": declared.to_string(),
                "suggested_unit": suggested.to_string(),
            })
        );
    } else {
        println!("{suggested}");
    }
    Ok(())
}

pub fn run_check(engine: &DosingEngine, json_mode: bool) {
    let table = engine.table();
    let safety = table.safety();
    let parameters = table.parameters().count();
    if json_mode {
        println!(
            "{}",
            json!({
                "ok": true,
                "parameters": parameters,
                "products": table.products().len(),
                "safety": {
                    "ph_caution": safety.ph_caution,
                    "ph_caution_factor": safety.ph_caution_factor,
                    "ph_abort": safety.ph_abort,
                },
            })
        );
        return;
    }
    println!(
        "config OK: {parameters} parameters, {} products",
        table.products().len()
    );
    for (p, spec) in table.parameters() {
        println!(
            "  {:<11} target {} {}, safe {}..{}, critical {}..{}, max {}/day",
            p.name(),
            spec.target,
            p.canonical_unit(),
            spec.safe_low,
            spec.safe_high,
            spec.critical_low,
            spec.critical_high,
            spec.max_daily_change
        );
    }
    println!(
        "  pH caution at {} (x{}), abort at {}",
        safety.ph_caution, safety.ph_caution_factor, safety.ph_abort
    );
}

pub fn result_json(res: &DoseResult, tank: Option<&str>) -> serde_json::Value {
    let warnings: Vec<_> = res
        .warnings
        .iter()
        .map(|w| json!({ "code": w.code(), "message": w.to_string() }))
        .collect();
    json!({
        "status": res.status.as_str(),
        "parameter": res.parameter.name(),
        "unit": res.canonical_unit().to_string(),
        "tank": tank,
        "product": res.product,
        "current": res.current,
        "target": res.target,
        "gap": res.gap,
        "total_volume_ml": res.total_volume_ml,
        "daily_volume_ml": res.daily_volume_ml,
        "day_count": res.day_count,
        "warnings": warnings,
    })
}

pub fn render_text(res: &DoseResult, tank: Option<&str>) -> String {
    let name = res.parameter.name();
    let unit = res.canonical_unit();
    let rule = "-".repeat(30);
    let mut lines = vec![rule.clone()];
    if let Some(t) = tank {
        lines.push(format!("RESULTS FOR {}:", t.to_uppercase()));
    }
    match res.status {
        DoseStatus::Optimal => lines.push(format!(
            "Status: {name} is already at or above target ({:.2} / {:.2} {unit}).",
            res.current, res.target
        )),
        DoseStatus::OutOfSafeRange => {
            lines.push(format!("Status: dosing refused ({:.2} {unit}).", res.current));
        }
        DoseStatus::CorrectionNeeded => {
            if let Some(p) = &res.product {
                lines.push(format!("Product:           {p}"));
            }
            lines.push(format!("Total {name} to add: {:.1} mL", res.total_volume_ml));
            lines.push(format!("Daily safety dose: {:.1} mL", res.daily_volume_ml));
            lines.push(format!("Duration:          {} day(s)", res.day_count));
        }
    }
    lines.extend(res.warnings.iter().map(|w| format!("Warning: {w}")));
    lines.push(rule);
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
