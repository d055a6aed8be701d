use std::{path::Path, sync::Once};

use f1_elo_processor::{
    model::structures::directory::{Constructor, Driver},
    store::event_source::ReplayInput,
    utils::test_utils::{generate_constructors, generate_drivers, generate_lineages, generate_seasons}
};

static INIT: Once = Once::new();

/// Initialize test environment with RUST_LOG=WARN
pub fn init_test_env() {
    INIT.call_once(|| {
        std::env::set_var("RUST_LOG", "warn");
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A complete, reproducible replay input including one rebranded constructor.
pub fn generated_input(n_seasons: i32, rounds: i32, n_constructors: i32, seed: u64) -> ReplayInput {
    let mut constructors: Vec<Constructor> = generate_constructors(n_constructors);
    constructors.push(Constructor {
        id: n_constructors + 1,
        name: "Constructor 1 (rebranded)".to_string()
    });
    let drivers: Vec<Driver> = generate_drivers(n_constructors);

    ReplayInput {
        drivers,
        constructors,
        lineages: generate_lineages(n_constructors),
        events: generate_seasons(n_seasons, rounds, n_constructors, seed)
    }
}

pub fn write_json(path: &Path, input: &ReplayInput) {
    let json = serde_json::to_string_pretty(input).expect("Expected input to serialize");
    std::fs::write(path, json).expect("Expected to write test input");
}
