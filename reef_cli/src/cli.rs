//! CLI argument definitions and the JSON-mode flag.

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "reef", version, about = "Reef aquarium dosing calculator")]
pub struct Cli {
    /// Path to config TOML (reference table overrides); built-in table when absent
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Product catalog CSV (strict header); replaces the configured catalog
    #[arg(long, value_name = "FILE")]
    pub products: Option<PathBuf>,

    /// Emit results and errors as single-line JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the additive volume and daily schedule for one reading
    Dose(DoseArgs),
    /// List the product catalog with per-liter potencies
    Products,
    /// Suggest the unit a raw reading was most likely taken in
    SuggestUnit {
        /// Chemical parameter (alkalinity|calcium|magnesium|nitrate|phosphate)
        #[arg(long)]
        parameter: String,
        /// Raw reading
        #[arg(long, allow_hyphen_values = true)]
        value: String,
        /// Unit the reading was declared in (defaults to the canonical unit)
        #[arg(long)]
        unit: Option<String>,
    },
    /// Load and validate config and catalog, then print a summary
    Check,
    /// Prompt-driven console session
    Interactive,
}

/// Values are taken as text so malformed numbers surface as input errors, not usage errors.
#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("product_source")
        .required(true)
        .args(["product", "potency"])
))]
pub struct DoseArgs {
    /// Chemical parameter (alkalinity|calcium|magnesium|nitrate|phosphate, or alk/ca/mg/no3/po4)
    #[arg(long)]
    pub parameter: String,
    /// Current reading
    #[arg(long, allow_hyphen_values = true)]
    pub current: String,
    /// Unit of the current reading (dKH|ppm)
    #[arg(long, value_name = "UNIT")]
    pub current_unit: Option<String>,
    /// Target reading
    #[arg(long, allow_hyphen_values = true)]
    pub target: String,
    /// Unit of the target reading (dKH|ppm)
    #[arg(long, value_name = "UNIT")]
    pub target_unit: Option<String>,
    /// Tank water volume
    #[arg(long, allow_hyphen_values = true)]
    pub volume: String,
    /// Unit of the tank volume (gal|L); gallons when omitted
    #[arg(long, value_name = "UNIT")]
    pub volume_unit: Option<String>,
    /// Catalog product name
    #[arg(long)]
    pub product: Option<String>,
    /// Custom potency: canonical-unit rise from 1 mL in one basis volume
    #[arg(long, allow_hyphen_values = true)]
    pub potency: Option<String>,
    /// Reference volume for --potency (liter|gallon|100l|100gal); liter when omitted
    #[arg(long, value_name = "BASIS", requires = "potency")]
    pub potency_basis: Option<String>,
    /// Tank pH (tightens or refuses alkalinity dosing when high)
    #[arg(long)]
    pub ph: Option<String>,
    /// Tank name shown with the results
    #[arg(long, value_name = "NAME")]
    pub tank_name: Option<String>,
    /// Replace reading units with the suggested unit before calculating
    #[arg(long, action = ArgAction::SetTrue)]
    pub auto_unit: bool,
}
