#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // TOML that parses must validate and build a table without panicking.
    let Ok(cfg) = toml::from_str::<reef_config::Config>(data) else {
        return;
    };
    let validated = cfg.validate().is_ok();
    let built = reef_core::ReferenceTable::try_from(&cfg);
    // A config that passes validation must always produce a table.
    if validated {
        assert!(built.is_ok(), "validated config rejected: {built:?}");
    }
});
