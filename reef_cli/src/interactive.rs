//! Prompt-driven console session.
//!
//! Reads the tank once, then loops over a parameter menu. A bad or blank
//! answer is reported and the menu comes back; only the tank volume is
//! required up front.

use std::io::{BufRead, Write};

use reef_core::{ChemicalParameter, DoseError, DoseForm, DosingEngine, MeasurementUnit};

use crate::dose::render_text;
use crate::error_fmt::humanize;

const DEFAULT_TANK: &str = "My Reef";

/// `None` on end of input, otherwise the trimmed line (possibly empty).
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> eyre::Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn non_empty(answer: Option<String>) -> Option<String> {
    answer.filter(|s| !s.is_empty())
}

pub fn run<R: BufRead, W: Write>(
    engine: &DosingEngine,
    input: &mut R,
    out: &mut W,
) -> eyre::Result<()> {
    writeln!(out, "==========================================")?;
    writeln!(out, "         REEF DOSING CALCULATOR           ")?;
    writeln!(out, "==========================================\n")?;

    let tank = non_empty(ask(input, out, "Tank name (e.g., Wraith): ")?)
        .unwrap_or_else(|| DEFAULT_TANK.to_string());
    let gallons = non_empty(ask(
        input,
        out,
        &format!("Total water volume for {tank} (gallons): "),
    )?)
    .ok_or_else(|| DoseError::missing("tank_volume"))?;
    match gallons.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => {}
        _ => {
            return Err(DoseError::invalid(
                "tank_volume",
                format!("'{gallons}' is not a positive number of gallons"),
            )
            .into());
        }
    }
    tracing::info!(tank = %tank, gallons = %gallons, "interactive session started");

    let exit_choice = ChemicalParameter::ALL.len() + 1;
    loop {
        writeln!(out, "\nWhat would you like to calculate?")?;
        for (i, p) in ChemicalParameter::ALL.iter().enumerate() {
            writeln!(out, "{}. {p}", i + 1)?;
        }
        writeln!(out, "{exit_choice}. Exit")?;
        let Some(choice) = ask(input, out, &format!("Select (1-{exit_choice}): "))? else {
            break;
        };
        let parameter = match choice.parse::<usize>() {
            Ok(n) if n == exit_choice => break,
            Ok(n) if (1..exit_choice).contains(&n) => ChemicalParameter::ALL[n - 1],
            _ => {
                writeln!(out, "Unknown choice '{choice}'.")?;
                continue;
            }
        };

        let form = prompt_form(engine, input, out, parameter, &gallons)?;
        match engine.calculate_form(&form) {
            Ok(res) => write!(out, "\n{}", render_text(&res, Some(&tank)))?,
            Err(e) => {
                tracing::warn!(error = %e, "interactive calculation rejected");
                writeln!(out, "\nError: {}", humanize(&eyre::Report::new(e)))?;
            }
        }
    }

    writeln!(out, "\nHappy reefing! Remember: stability is key.")?;
    Ok(())
}

fn prompt_form<R: BufRead, W: Write>(
    engine: &DosingEngine,
    input: &mut R,
    out: &mut W,
    parameter: ChemicalParameter,
    gallons: &str,
) -> eyre::Result<DoseForm> {
    let unit = parameter.canonical_unit();
    writeln!(out, "\n--- {parameter} Adjustment ---")?;

    let current = non_empty(ask(input, out, &format!("Current {parameter} level: "))?);
    let mut current_unit = None;
    if parameter == ChemicalParameter::Alkalinity {
        let answer = ask(input, out, "Is that (1) ppm or (2) dKH? ")?;
        if answer.as_deref() == Some("1") {
            current_unit = Some(MeasurementUnit::Ppm.to_string());
            if let Some(v) = current.as_deref().and_then(|c| c.parse::<f64>().ok()) {
                let dkh = reef_core::units::normalize(v, MeasurementUnit::Ppm, parameter)?;
                writeln!(out, "  > Converted to {dkh:.2} dKH")?;
            }
        }
    }
    let target = non_empty(ask(input, out, &format!("Target {parameter} ({unit}): "))?);

    let catalog: Vec<&str> = engine
        .table()
        .products_for(parameter)
        .map(|p| p.name.as_str())
        .collect();
    let mut product = None;
    if !catalog.is_empty() {
        writeln!(out, "Catalog products:")?;
        for (i, name) in catalog.iter().enumerate() {
            writeln!(out, "  {}. {name}", i + 1)?;
        }
        product = non_empty(ask(
            input,
            out,
            "Product (number or name, blank for the bottle's strength): ",
        )?)
        .map(|answer| match answer.parse::<usize>() {
            Ok(n) if (1..=catalog.len()).contains(&n) => catalog[n - 1].to_string(),
            _ => answer,
        });
    }

    let mut custom_potency = None;
    if product.is_none() {
        writeln!(out, "\nFind the 'Product Strength' on your bottle.")?;
        custom_potency = non_empty(ask(
            input,
            out,
            &format!("How many {unit} does 1 mL add to 1 gallon of water?: "),
        )?);
    }

    let ph = if parameter == ChemicalParameter::Alkalinity {
        non_empty(ask(input, out, "Current pH (blank to skip): ")?)
    } else {
        None
    };

    Ok(DoseForm {
        parameter: Some(parameter.name().to_string()),
        current_value: current,
        current_unit,
        target_value: target,
        target_unit: None,
        tank_volume: Some(gallons.to_string()),
        volume_unit: Some("gal".to_string()),
        product,
        custom_potency,
        // bottle strengths are quoted per gallon
        potency_basis: Some("gallon".to_string()),
        ph,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(script: &str) -> (eyre::Result<()>, String) {
        let engine = DosingEngine::default();
        let mut input = script.as_bytes();
        let mut out = Vec::new();
        let res = run(&engine, &mut input, &mut out);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn custom_strength_alkalinity_round() {
        // 40 gal, 7.0 -> 8.0 dKH, 1.4 dKH per mL per gallon, no pH.
        let (res, out) = session("Wraith\n40\n1\n7\n2\n8\n\n1.4\n\n6\n");
        res.unwrap();
        assert!(out.contains("RESULTS FOR WRAITH:"), "{out}");
        assert!(out.contains("28.6 mL"), "{out}");
        assert!(out.contains("1 day(s)"), "{out}");
        assert!(out.contains("Happy reefing"));
    }

    #[test]
    fn blank_answer_reports_and_loops() {
        let (res, out) = session("\n50\n2\n\n430\n\n20\n6\n");
        res.unwrap();
        assert!(out.contains("Error:"), "{out}");
        assert!(out.contains("Invalid value for current_value"), "{out}");
        assert!(out.contains("Happy reefing"));
    }

    #[test]
    fn missing_volume_is_invalid_input() {
        let (res, _) = session("Nano\n\n");
        let err = res.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DoseError>(),
            Some(DoseError::InvalidInput { field: "tank_volume", .. })
        ));
    }

    #[test]
    fn catalog_pick_by_number() {
        // Calcium 400 -> 420 ppm in 50 gal with Two-Part Calcium (20 ppm per mL per gallon).
        let (res, out) = session("Reef\n50\n2\n400\n420\n1\n6\n");
        res.unwrap();
        assert!(out.contains("Product:           Two-Part Calcium"), "{out}");
        assert!(out.contains("50.0 mL"), "{out}");
    }
}
