#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Reef dosing and safety calculation engine (I/O-free).
//!
//! This crate turns a water-test reading into a dose of additive and a
//! day-by-day schedule that respects safe rates of change.
//!
//! ## Architecture
//!
//! - **Units**: dKH/ppm and gallon/liter normalization (`units` module)
//! - **Reference data**: bands, daily limits, pH policy, catalog (`reference` module)
//! - **Calculator**: gap → mL (`calculator` module)
//! - **Scheduler**: critical-band refusal, daily split, pH guard (`scheduler` module)
//! - **Engine**: the per-call pipeline (`engine` module)
//!
//! ## Potency convention
//!
//! A product's potency is always the canonical-unit rise from dosing
//! **1 mL into 1 liter**. Per-gallon and per-100 L figures are converted when
//! the catalog is built (see `reference::Potency`).

pub mod builder;
pub mod calculator;
pub mod conversions;
pub mod engine;
pub mod error;
pub mod parameter;
pub mod reference;
pub mod request;
pub mod scheduler;
pub mod status;
pub mod units;

pub use builder::DoseRequestBuilder;
pub use engine::{DosingEngine, calculate};
pub use error::{DoseError, Result};
pub use parameter::ChemicalParameter;
pub use reference::{ParameterSpec, Potency, PotencyBasis, Product, ReferenceTable, SafetyPolicy};
pub use request::{DoseForm, DoseRequest, ProductChoice};
pub use status::{DoseResult, DoseStatus, Warning};
pub use units::{MeasurementUnit, VolumeUnit, suggest_unit};
