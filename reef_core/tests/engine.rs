use reef_core::{
    ChemicalParameter, DoseError, DoseRequest, DoseStatus, DosingEngine, MeasurementUnit,
    ParameterSpec, ProductChoice, ReferenceTable, SafetyPolicy, VolumeUnit, Warning,
};
use rstest::rstest;

fn custom(potency: f64) -> ProductChoice {
    ProductChoice::Custom(reef_core::Potency::per_liter(potency).unwrap())
}

#[test]
fn alkalinity_split_over_two_days() {
    // 7.0 -> 8.5 dKH in 100 L with 1.4 dKH per mL per liter; daily limit 1.4 dKH.
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Alkalinity)
        .with_current(7.0)
        .with_target(8.5)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(custom(1.4))
        .build()
        .unwrap();

    let res = engine.calculate(&req).unwrap();
    assert_eq!(res.status, DoseStatus::CorrectionNeeded);
    assert!((res.gap - 1.5).abs() < 1e-12);
    assert!((res.total_volume_ml - 107.142_857).abs() < 1e-3);
    assert_eq!(res.day_count, 2);
    assert!((res.daily_volume_ml - 53.571_428).abs() < 1e-3);
    assert!(
        res.warnings
            .iter()
            .any(|w| matches!(w, Warning::SpreadOverDays { days: 2, .. }))
    );
    assert_eq!(res.product, None);
}

#[test]
fn alkalinity_in_ppm_already_above_target_is_optimal() {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Alkalinity)
        .with_current_in(160.0, MeasurementUnit::Ppm)
        .with_target_in(152.0, MeasurementUnit::Ppm)
        .with_volume(75.0, VolumeUnit::Gallons)
        .with_product(ProductChoice::catalog("Two-Part Alkalinity"))
        .build()
        .unwrap();

    let res = engine.calculate(&req).unwrap();
    assert_eq!(res.status, DoseStatus::Optimal);
    assert_eq!(res.total_volume_ml, 0.0);
    assert_eq!(res.day_count, 0);
    assert_eq!(res.daily_volume_ml, 0.0);
    assert!(res.gap < 0.0);
}

#[test]
fn critical_calcium_refuses_dose() {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Calcium)
        .with_current(300.0)
        .with_target(430.0)
        .with_volume(200.0, VolumeUnit::Liters)
        .with_product(ProductChoice::catalog("Two-Part Calcium"))
        .build()
        .unwrap();

    let res = engine.calculate(&req).unwrap();
    assert_eq!(res.status, DoseStatus::OutOfSafeRange);
    assert!(res.is_refused());
    assert_eq!(res.total_volume_ml, 0.0);
    assert_eq!(res.day_count, 0);
    assert!(matches!(
        res.warnings.as_slice(),
        [Warning::CriticalReading { low, .. }] if *low == 350.0
    ));
}

#[test]
fn high_ph_widens_alkalinity_schedule() {
    let engine = DosingEngine::default();
    let base = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Alkalinity)
        .with_current(7.0)
        .with_target(8.5)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(custom(1.4));

    let plain = engine.calculate(&base.clone().build().unwrap()).unwrap();
    let req = base.with_ph(8.5).build().unwrap();
    let res = engine.calculate(&req).unwrap();

    assert_eq!(res.status, DoseStatus::CorrectionNeeded);
    assert!(
        res.warnings
            .iter()
            .any(|w| matches!(w, Warning::HighPhCaution { .. }))
    );
    let widened = ((plain.day_count as f64) * 1.5).ceil() as u32;
    assert!(res.day_count >= widened, "{} < {}", res.day_count, widened);
    assert_eq!(res.day_count, 3);
    assert!((res.total_volume_ml - plain.total_volume_ml).abs() < 1e-12);
}

#[test]
fn ph_at_abort_limit_refuses_alkalinity() {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Alkalinity)
        .with_current(7.0)
        .with_target(8.5)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(custom(1.4))
        .with_ph(8.6)
        .build()
        .unwrap();

    let res = engine.calculate(&req).unwrap();
    assert_eq!(res.status, DoseStatus::OutOfSafeRange);
    assert!(matches!(res.warnings.as_slice(), [Warning::PhAbort { .. }]));
}

#[test]
fn high_ph_does_not_affect_calcium() {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Calcium)
        .with_current(415.0)
        .with_target(430.0)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(ProductChoice::catalog("Two-Part Calcium"))
        .with_ph(8.7)
        .build()
        .unwrap();

    let res = engine.calculate(&req).unwrap();
    assert_eq!(res.status, DoseStatus::CorrectionNeeded);
    assert_eq!(res.day_count, 1);
    assert!(res.warnings.is_empty(), "{:?}", res.warning_messages());
}

#[test]
fn unknown_catalog_product_is_configuration_error() {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Magnesium)
        .with_current(1250.0)
        .with_target(1350.0)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(ProductChoice::catalog("Mystery Mag"))
        .build()
        .unwrap();

    let err = engine.calculate(&req).expect_err("lookup miss must not default");
    assert!(matches!(err, DoseError::Configuration(_)), "{err:?}");
    assert_eq!(err.kind(), "ConfigurationError");
}

#[test]
fn unknown_parameter_in_table_is_configuration_error() {
    let table = ReferenceTable::empty(SafetyPolicy::default())
        .with_parameter(
            ChemicalParameter::Calcium,
            ParameterSpec::new(430.0, (400.0, 450.0), (350.0, 550.0), 20.0),
        )
        .unwrap();
    let engine = DosingEngine::new(table);
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Nitrate)
        .with_current(1.0)
        .with_target(5.0)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(custom(100.0))
        .build()
        .unwrap();

    let err = engine.calculate(&req).unwrap_err();
    assert!(matches!(err, DoseError::Configuration(ref m) if m.contains("Nitrate")));
}

#[test]
fn product_for_other_parameter_is_invalid_input() {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Calcium)
        .with_current(400.0)
        .with_target(430.0)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(ProductChoice::catalog("Two-Part Alkalinity"))
        .build()
        .unwrap();

    let err = engine.calculate(&req).unwrap_err();
    assert!(matches!(err, DoseError::InvalidInput { field: "product", .. }));
}

#[test]
fn bad_product_reported_even_when_reading_is_critical() {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Calcium)
        .with_current(100.0)
        .with_target(430.0)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(ProductChoice::catalog("Nope"))
        .build()
        .unwrap();
    assert!(matches!(
        engine.calculate(&req),
        Err(DoseError::Configuration(_))
    ));
}

#[test]
fn catalog_product_gallon_basis_math() {
    // Two-Part Alkalinity: 1 mL per gallon raises 1.4 dKH.
    // 7.5 -> 8.5 dKH in 50 gal = 1.0 * 50 / 1.4 mL.
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Alkalinity)
        .with_current(7.5)
        .with_target(8.5)
        .with_volume(50.0, VolumeUnit::Gallons)
        .with_product(ProductChoice::catalog("two-part alkalinity"))
        .build()
        .unwrap();

    let res = engine.calculate(&req).unwrap();
    assert!((res.total_volume_ml - 50.0 / 1.4).abs() < 1e-9);
    assert_eq!(res.day_count, 1);
    assert_eq!(res.product.as_deref(), Some("Two-Part Alkalinity"));
}

#[rstest]
#[case(ChemicalParameter::Nitrate, 1.0, 5.0, true, false)]
#[case(ChemicalParameter::Nitrate, 3.0, 12.0, false, true)]
#[case(ChemicalParameter::Magnesium, 1200.0, 1350.0, true, false)]
fn advisory_warnings_do_not_change_status(
    #[case] parameter: ChemicalParameter,
    #[case] current: f64,
    #[case] target: f64,
    #[case] current_outside: bool,
    #[case] target_outside: bool,
) {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(parameter)
        .with_current(current)
        .with_target(target)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(custom(10.0))
        .build()
        .unwrap();

    let res = engine.calculate(&req).unwrap();
    assert_eq!(res.status, DoseStatus::CorrectionNeeded);
    assert_eq!(
        res.warnings
            .iter()
            .any(|w| matches!(w, Warning::CurrentOutsideSafeBand { .. })),
        current_outside
    );
    assert_eq!(
        res.warnings
            .iter()
            .any(|w| matches!(w, Warning::TargetOutsideSafeBand { .. })),
        target_outside
    );
}

#[test]
fn target_beyond_critical_band_gets_its_own_warning() {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Calcium)
        .with_current(420.0)
        .with_target(2000.0)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(custom(10.0))
        .build()
        .unwrap();

    let res = engine.calculate(&req).unwrap();
    assert_eq!(res.status, DoseStatus::CorrectionNeeded);
    assert!(res.total_volume_ml > 0.0);
    let codes: Vec<_> = res.warnings.iter().map(Warning::code).collect();
    assert!(codes.contains(&"target_outside_critical_band"), "{codes:?}");
    assert!(!codes.contains(&"target_outside_safe_band"), "{codes:?}");
    assert!(
        res.warning_messages()
            .iter()
            .any(|m| m.contains("outside the critical range"))
    );
}

#[test]
fn warning_messages_render() {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Alkalinity)
        .with_current(7.0)
        .with_target(8.5)
        .with_volume(100.0, VolumeUnit::Liters)
        .with_product(custom(1.4))
        .with_ph(8.4)
        .build()
        .unwrap();

    let msgs = engine.calculate(&req).unwrap().warning_messages();
    assert!(msgs.iter().any(|m| m.contains("pH 8.40")), "{msgs:?}");
    assert!(msgs.iter().any(|m| m.contains("over 3 days")), "{msgs:?}");
}

#[test]
fn overflowing_dose_is_invalid_input() {
    let engine = DosingEngine::default();
    let req = DoseRequest::builder()
        .with_parameter(ChemicalParameter::Nitrate)
        .with_current(1.0)
        .with_target(5.0)
        .with_volume(1e308, VolumeUnit::Gallons)
        .with_product(custom(1e-300))
        .build()
        .unwrap();
    assert!(matches!(
        engine.calculate(&req),
        Err(DoseError::InvalidInput { field: "tank_volume", .. })
    ));
}
