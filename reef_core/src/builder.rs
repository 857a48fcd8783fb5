//! Type-state builder for `DoseRequest`.
//!
//! The builder enforces at compile time that parameter, current reading,
//! target and tank volume are provided before `build()` is available.
//! `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;

use crate::error::{DoseError, Result};
use crate::parameter::ChemicalParameter;
use crate::request::{DoseRequest, ProductChoice};
use crate::units::{MeasurementUnit, VolumeUnit};

// ── Type-state markers ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
pub struct Missing;
#[derive(Clone, Copy, Debug)]
pub struct Set;

/// Builder for `DoseRequest`. All fields are validated on `build()`.
#[derive(Clone, Debug)]
pub struct DoseRequestBuilder<P, C, T, V> {
    parameter: Option<ChemicalParameter>,
    current: Option<(f64, Option<MeasurementUnit>)>,
    target: Option<(f64, Option<MeasurementUnit>)>,
    volume: Option<(f64, VolumeUnit)>,
    product: Option<ProductChoice>,
    ph: Option<f64>,
    _p: PhantomData<P>,
    _c: PhantomData<C>,
    _t: PhantomData<T>,
    _v: PhantomData<V>,
}

impl Default for DoseRequestBuilder<Missing, Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            parameter: None,
            current: None,
            target: None,
            volume: None,
            product: None,
            ph: None,
            _p: PhantomData,
            _c: PhantomData,
            _t: PhantomData,
            _v: PhantomData,
        }
    }
}

impl<P, C, T, V> DoseRequestBuilder<P, C, T, V> {
    fn retype<P2, C2, T2, V2>(self) -> DoseRequestBuilder<P2, C2, T2, V2> {
        DoseRequestBuilder {
            parameter: self.parameter,
            current: self.current,
            target: self.target,
            volume: self.volume,
            product: self.product,
            ph: self.ph,
            _p: PhantomData,
            _c: PhantomData,
            _t: PhantomData,
            _v: PhantomData,
        }
    }

    pub fn with_parameter(mut self, parameter: ChemicalParameter) -> DoseRequestBuilder<Set, C, T, V> {
        self.parameter = Some(parameter);
        self.retype()
    }

    /// Current reading in the parameter's canonical unit.
    pub fn with_current(mut self, value: f64) -> DoseRequestBuilder<P, Set, T, V> {
        self.current = Some((value, None));
        self.retype()
    }

    pub fn with_current_in(
        mut self,
        value: f64,
        unit: MeasurementUnit,
    ) -> DoseRequestBuilder<P, Set, T, V> {
        self.current = Some((value, Some(unit)));
        self.retype()
    }

    /// Target in the parameter's canonical unit.
    pub fn with_target(mut self, value: f64) -> DoseRequestBuilder<P, C, Set, V> {
        self.target = Some((value, None));
        self.retype()
    }

    pub fn with_target_in(
        mut self,
        value: f64,
        unit: MeasurementUnit,
    ) -> DoseRequestBuilder<P, C, Set, V> {
        self.target = Some((value, Some(unit)));
        self.retype()
    }

    pub fn with_volume(mut self, volume: f64, unit: VolumeUnit) -> DoseRequestBuilder<P, C, T, Set> {
        self.volume = Some((volume, unit));
        self.retype()
    }

    pub fn with_product(mut self, product: ProductChoice) -> Self {
        self.product = Some(product);
        self
    }

    pub fn with_ph(mut self, ph: f64) -> Self {
        self.ph = Some(ph);
        self
    }

    /// Validate and construct, checking for missing fields at runtime.
    pub fn try_build(self) -> Result<DoseRequest> {
        let parameter = self.parameter.ok_or_else(|| DoseError::missing("parameter"))?;
        let (current_value, current_unit) =
            self.current.ok_or_else(|| DoseError::missing("current_value"))?;
        let (target_value, target_unit) =
            self.target.ok_or_else(|| DoseError::missing("target_value"))?;
        let (tank_volume, volume_unit) =
            self.volume.ok_or_else(|| DoseError::missing("tank_volume"))?;
        let product = self.product.ok_or_else(|| DoseError::missing("product"))?;

        let request = DoseRequest {
            parameter,
            current_value,
            current_unit: current_unit.unwrap_or(parameter.canonical_unit()),
            target_value,
            target_unit: target_unit.unwrap_or(parameter.canonical_unit()),
            tank_volume,
            volume_unit,
            product,
            ph: self.ph,
        };
        request.validate()?;
        Ok(request)
    }
}

impl DoseRequestBuilder<Set, Set, Set, Set> {
    /// Available once parameter, readings and volume are set; still checks
    /// the product and value domains.
    pub fn build(self) -> Result<DoseRequest> {
        self.try_build()
    }
}
