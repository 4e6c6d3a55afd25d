// demos/gait_probe.rs
//! Metabolic power over a synthetic gait cycle
//!
//! Pass a TOML probe configuration as the first argument to use it instead
//! of the built-in one.

use muscle_metabolics::{
    config::ConfigLoader, InMemoryModel, MetabolicPowerProbe, MuscleDynamicState, ProbeConfig,
};
use std::f64::consts::PI;

const BUILTIN_CONFIG: &str = r#"
name = "gait_metabolics"
use_force_dependent_shortening_prop_constant = true

[[metabolic_parameters]]
name = "soleus_r"
ratio_slow_twitch_fibers = 0.8

[[metabolic_parameters]]
name = "gastroc_r"
ratio_slow_twitch_fibers = 0.55

[[metabolic_parameters]]
name = "vasti_r"
ratio_slow_twitch_fibers = 0.5

[[metabolic_parameters]]
name = "tib_ant_r"
ratio_slow_twitch_fibers = 0.7
use_provided_muscle_mass = true
provided_muscle_mass = 0.25
"#;

/// (name, max isometric force N, optimal fiber length m, phase of peak excitation)
const MUSCLES: &[(&str, f64, f64, f64)] = &[
    ("soleus_r", 3549.0, 0.050, 0.40),
    ("gastroc_r", 2500.0, 0.060, 0.45),
    ("vasti_r", 6000.0, 0.087, 0.10),
    ("tib_ant_r", 1227.0, 0.098, 0.75),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Muscle Metabolic Power Demo");
    println!("===========================\n");

    let config = load_config()?;
    let summary = config.summary();
    println!("Probe '{}' with {} muscles", summary.name, summary.muscle_count);
    println!("  - Force-dependent shortening heat: {}", summary.force_dependent_shortening);
    println!("  - Minimum heat rate enforced: {}\n", summary.flags.enforce_minimum_heat_rate_per_muscle);

    let mut model = InMemoryModel::new(72.0);
    for &(name, force, length, _) in MUSCLES {
        model = model.with_muscle(name, force, length);
    }

    let mut probe = MetabolicPowerProbe::from_config(config)?;
    probe.bind(&model)?;

    for param in probe.parameters() {
        if let Some(mass) = param.muscle_mass() {
            println!("  {:<10} mass = {:.4} kg", param.name, mass);
        }
    }
    println!();

    // One stride sampled at 50 frames, evaluated in parallel.
    let frames: Vec<InMemoryModel> = (0..50)
        .map(|i| gait_frame(&model, i as f64 / 50.0))
        .collect();
    let power = probe.evaluate_batch(&frames);

    let mut energy = 0.0;
    let dt = 1.1 / frames.len() as f64;
    for (i, watts) in power.into_iter().enumerate() {
        let watts = watts?;
        energy += watts * dt;
        if i % 10 == 0 {
            println!("  t = {:>4.0}% of stride: {:>8.2} W", i as f64 * 2.0, watts);
        }
    }
    println!("\nMetabolic energy per stride: {:.1} J", energy);

    let peak = gait_frame(&model, 0.42);
    let report = probe.evaluate_detailed(&peak)?;
    println!("\nBreakdown at push-off:\n{}", report.to_json()?);

    Ok(())
}

fn load_config() -> Result<ProbeConfig, Box<dyn std::error::Error>> {
    let loader = ConfigLoader::new();
    let config = match std::env::args().nth(1) {
        Some(path) => loader.load_from_file(path)?,
        None => loader.load_from_str(BUILTIN_CONFIG)?,
    };
    Ok(config)
}

/// Synthetic muscle states at a fraction `t` of the stride.
fn gait_frame(template: &InMemoryModel, t: f64) -> InMemoryModel {
    let mut frame = template.clone();
    for &(name, force, _, peak) in MUSCLES {
        let distance = ((t - peak + 0.5).rem_euclid(1.0)) - 0.5;
        let excitation = (-(distance * distance) / 0.01).exp();
        let velocity = 0.5 * (2.0 * PI * (t - peak)).sin();

        frame.set_state(
            name,
            MuscleDynamicState {
                excitation,
                activation: excitation,
                normalized_fiber_length: 1.0 + 0.15 * (2.0 * PI * t).cos(),
                fiber_velocity: velocity,
                active_fiber_force: force * excitation * 0.8,
                isometric_active_fiber_force: force * excitation,
                passive_fiber_force: 0.0,
            },
        );
    }
    frame
}
