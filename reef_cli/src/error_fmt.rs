//! Human-readable error descriptions and structured JSON error formatting.

use reef_core::DoseError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(de) = err.downcast_ref::<DoseError>() {
        return match de {
            DoseError::InvalidInput { field, reason } => format!(
                "What happened: Invalid value for {field} ({reason}).\nLikely causes: A typo, a missing value, or a unit that does not fit the parameter.\nHow to fix: Correct {field} and run again. Alkalinity takes dKH or ppm; everything else takes ppm."
            ),
            DoseError::Configuration(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("product catalog csv must have headers") {
                    "Invalid headers in product catalog CSV. Expected 'name,parameter,potency,basis'."
                        .to_string()
                } else if lower.contains("not found in catalog") {
                    format!(
                        "What happened: {msg}.\nLikely causes: Misspelled product name, or a --products catalog that does not list it.\nHow to fix: Run `reef products` to see the catalog, or pass --potency with the bottle's strength."
                    )
                } else {
                    format!(
                        "What happened: Invalid reference data ({msg}).\nLikely causes: Out-of-range values in the config TOML or catalog CSV.\nHow to fix: Run `reef check` against the file, edit it, then rerun."
                    )
                }
            }
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 invalid input, 4 configuration, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> u8 {
    match err.downcast_ref::<DoseError>() {
        Some(DoseError::InvalidInput { .. }) => 3,
        Some(DoseError::Configuration(_)) => 4,
        None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    match err.downcast_ref::<DoseError>() {
        Some(de @ DoseError::InvalidInput { field, .. }) => {
            json!({ "reason": de.kind(), "field": field, "message": humanize(err) }).to_string()
        }
        Some(de) => json!({ "reason": de.kind(), "message": humanize(err) }).to_string(),
        None => json!({ "reason": "Error", "message": humanize(err) }).to_string(),
    }
}
