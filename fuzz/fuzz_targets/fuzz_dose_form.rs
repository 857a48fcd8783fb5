#![no_main]
use libfuzzer_sys::{arbitrary, fuzz_target};
use reef_core::{DoseForm, DoseStatus, DosingEngine};

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    parameter: Option<String>,
    current_value: Option<String>,
    current_unit: Option<String>,
    target_value: Option<String>,
    target_unit: Option<String>,
    tank_volume: Option<String>,
    volume_unit: Option<String>,
    product: Option<String>,
    custom_potency: Option<String>,
    potency_basis: Option<String>,
    ph: Option<String>,
}

fuzz_target!(|input: Input| {
    let form = DoseForm {
        parameter: input.parameter,
        current_value: input.current_value,
        current_unit: input.current_unit,
        target_value: input.target_value,
        target_unit: input.target_unit,
        tank_volume: input.tank_volume,
        volume_unit: input.volume_unit,
        product: input.product,
        custom_potency: input.custom_potency,
        potency_basis: input.potency_basis,
        ph: input.ph,
    };
    // Whatever comes in, a successful result never carries a negative or non-finite dose.
    if let Ok(res) = DosingEngine::default().calculate_form(&form) {
        assert!(res.total_volume_ml.is_finite() && res.total_volume_ml >= 0.0);
        assert!(res.daily_volume_ml.is_finite() && res.daily_volume_ml >= 0.0);
        if res.status == DoseStatus::CorrectionNeeded {
            assert!(res.day_count >= 1);
        }
    }
});
