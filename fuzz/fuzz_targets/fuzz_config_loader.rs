#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // TOML parsing plus validation must never panic; both parse and
    // validation errors are acceptable outcomes.
    if let Ok(cfg) = toml::from_str::<heli_config::Config>(data) {
        let _ = cfg.validate();
    }
});
