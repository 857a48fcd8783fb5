#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and product-catalog parsing for the reef dosing engine.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The product catalog CSV loader enforces exact headers and validates
//!   every row before the catalog is handed to the engine.
//!
//! Every section is optional. Anything left out falls back to the engine's
//! built-in reference table.
use serde::Deserialize;

/// Chemical parameter key as written in TOML and CSV (`alkalinity`, `calcium`, ...).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ParameterName {
    #[serde(alias = "alk", alias = "kh")]
    Alkalinity,
    #[serde(alias = "ca")]
    Calcium,
    #[serde(alias = "mg")]
    Magnesium,
    #[serde(alias = "no3")]
    Nitrate,
    #[serde(alias = "po4")]
    Phosphate,
}

impl ParameterName {
    pub const ALL: [Self; 5] = [
        Self::Alkalinity,
        Self::Calcium,
        Self::Magnesium,
        Self::Nitrate,
        Self::Phosphate,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Alkalinity => "alkalinity",
            Self::Calcium => "calcium",
            Self::Magnesium => "magnesium",
            Self::Nitrate => "nitrate",
            Self::Phosphate => "phosphate",
        }
    }
}

/// Reference water volume a declared potency was measured against.
///
/// Catalogs in the wild mix these freely; the engine converts everything
/// to per-liter when the catalog is loaded.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Basis {
    #[default]
    #[serde(rename = "liter", alias = "l", alias = "litre")]
    Liter,
    #[serde(rename = "gallon", alias = "gal")]
    Gallon,
    #[serde(rename = "100l", alias = "100_liters")]
    HundredLiters,
    #[serde(rename = "100gal", alias = "100_gallons")]
    HundredGallons,
}

impl Basis {
    /// Liters of water in one basis volume.
    pub fn liters(self) -> f64 {
        const LITERS_PER_GALLON: f64 = 3.78541;
        match self {
            Self::Liter => 1.0,
            Self::Gallon => LITERS_PER_GALLON,
            Self::HundredLiters => 100.0,
            Self::HundredGallons => 100.0 * LITERS_PER_GALLON,
        }
    }
}

/// Per-parameter reference data. All values are in the parameter's
/// canonical unit (dKH for alkalinity, ppm otherwise).
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ParameterCfg {
    pub target: f64,
    pub safe_low: f64,
    pub safe_high: f64,
    pub critical_low: f64,
    pub critical_high: f64,
    /// Largest change allowed per 24 h.
    pub max_daily_change: f64,
}

/// Per-parameter overrides; omitted parameters keep the built-in values.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Parameters {
    pub alkalinity: Option<ParameterCfg>,
    pub calcium: Option<ParameterCfg>,
    pub magnesium: Option<ParameterCfg>,
    pub nitrate: Option<ParameterCfg>,
    pub phosphate: Option<ParameterCfg>,
}

impl Parameters {
    pub fn get(&self, name: ParameterName) -> Option<&ParameterCfg> {
        match name {
            ParameterName::Alkalinity => self.alkalinity.as_ref(),
            ParameterName::Calcium => self.calcium.as_ref(),
            ParameterName::Magnesium => self.magnesium.as_ref(),
            ParameterName::Nitrate => self.nitrate.as_ref(),
            ParameterName::Phosphate => self.phosphate.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Safety {
    /// Alkalinity doses are spread further at or above this pH.
    pub ph_caution: f64,
    /// Multiplier applied to the day count when `ph_caution` trips.
    pub ph_caution_factor: f64,
    /// Alkalinity dosing is refused at or above this pH.
    pub ph_abort: f64,
}

impl Default for Safety {
    fn default() -> Self {
        Self {
            ph_caution: 8.35,
            ph_caution_factor: 1.5,
            ph_abort: 8.6,
        }
    }
}

/// One catalog entry. Shared by the TOML `[[products]]` array and the CSV catalog.
///
/// Expected CSV headers:
/// name,parameter,potency,basis
///
/// Example:
/// name,parameter,potency,basis
/// Two-Part Alkalinity,alkalinity,1.4,gallon
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProductRow {
    pub name: String,
    pub parameter: ParameterName,
    /// Canonical-unit rise from 1 mL dosed into one `basis` of water.
    pub potency: f64,
    #[serde(default)]
    pub basis: Basis,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub safety: Safety,
    /// Product catalog; when empty the built-in catalog is used.
    #[serde(default)]
    pub products: Vec<ProductRow>,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_products_csv(path: &std::path::Path) -> eyre::Result<Vec<ProductRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open product catalog CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["name", "parameter", "potency", "basis"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "product catalog CSV must have headers 'name,parameter,potency,basis', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ProductRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("product catalog CSV {:?} has no rows", path);
    }

    validate_products(&rows)?;
    Ok(rows)
}

/// Reject blank names, duplicate names (case-insensitive), non-positive potencies
/// and potencies that overflow once converted to per liter.
pub fn validate_products(rows: &[ProductRow]) -> eyre::Result<()> {
    let mut seen = std::collections::HashSet::new();
    for row in rows {
        let name = row.name.trim();
        if name.is_empty() {
            eyre::bail!("products: name must not be empty");
        }
        if !seen.insert(name.to_lowercase()) {
            eyre::bail!("products: duplicate product name '{name}'");
        }
        if !(row.potency.is_finite() && row.potency > 0.0) {
            eyre::bail!("products.{name}.potency must be > 0");
        }
        if !(row.potency * row.basis.liters()).is_finite() {
            eyre::bail!(
                "products.{name}.potency overflows when converted from basis {:?} to per liter",
                row.basis
            );
        }
    }
    Ok(())
}

fn validate_parameter(key: &str, p: &ParameterCfg) -> eyre::Result<()> {
    let fields = [
        ("target", p.target),
        ("safe_low", p.safe_low),
        ("safe_high", p.safe_high),
        ("critical_low", p.critical_low),
        ("critical_high", p.critical_high),
        ("max_daily_change", p.max_daily_change),
    ];
    for (field, v) in fields {
        if !v.is_finite() {
            eyre::bail!("parameters.{key}.{field} must be a finite number");
        }
    }
    if p.critical_low < 0.0 {
        eyre::bail!("parameters.{key}.critical_low must be >= 0");
    }
    if p.critical_low > p.safe_low {
        eyre::bail!("parameters.{key}.critical_low must be <= safe_low");
    }
    if p.safe_low >= p.safe_high {
        eyre::bail!("parameters.{key}.safe_low must be < safe_high");
    }
    if p.safe_high > p.critical_high {
        eyre::bail!("parameters.{key}.safe_high must be <= critical_high");
    }
    if p.target < p.safe_low || p.target > p.safe_high {
        eyre::bail!("parameters.{key}.target must be within [safe_low, safe_high]");
    }
    if p.max_daily_change <= 0.0 {
        eyre::bail!("parameters.{key}.max_daily_change must be > 0");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Parameters
        for name in ParameterName::ALL {
            if let Some(p) = self.parameters.get(name) {
                validate_parameter(name.key(), p)?;
            }
        }

        // Safety
        if !(self.safety.ph_caution > 0.0 && self.safety.ph_caution <= 14.0) {
            eyre::bail!("safety.ph_caution must be in (0.0, 14.0]");
        }
        if !(self.safety.ph_caution_factor.is_finite() && self.safety.ph_caution_factor >= 1.0) {
            eyre::bail!("safety.ph_caution_factor must be >= 1.0");
        }
        if !(self.safety.ph_abort.is_finite() && self.safety.ph_abort >= self.safety.ph_caution) {
            eyre::bail!("safety.ph_abort must be >= safety.ph_caution");
        }

        // Products
        validate_products(&self.products)?;

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
