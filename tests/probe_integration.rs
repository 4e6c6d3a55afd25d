// tests/probe_integration.rs
//! End-to-end probe tests: configuration, binding and evaluation

use approx::assert_relative_eq;
use muscle_metabolics::{
    ConfigLoader, InMemoryModel, MetabolicMuscleParameter, MetabolicPowerProbe,
    MuscleDynamicState, MusculoskeletalModel, MuscleProperties, ProbeConfig, ProbeError,
    ShorteningHeatModel, SimulationState, TermFlags,
};
use std::sync::Arc;

const GAIT_CONFIG: &str = r#"
name = "gait_metabolics"
basal_rate_on = true

[[metabolic_parameters]]
name = "soleus_r"
ratio_slow_twitch_fibers = 0.8

[[metabolic_parameters]]
name = "vasti_r"
ratio_slow_twitch_fibers = 0.5

[[metabolic_parameters]]
name = "tib_ant_r"
use_provided_muscle_mass = true
provided_muscle_mass = 0.25
ratio_slow_twitch_fibers = 0.7
"#;

fn gait_model() -> InMemoryModel {
    InMemoryModel::new(72.0)
        .with_muscle("soleus_r", 3549.0, 0.05)
        .with_muscle("vasti_r", 6000.0, 0.087)
        .with_muscle("tib_ant_r", 1227.0, 0.098)
        .with_muscle("hamstrings_r", 2594.0, 0.08)
}

fn stance_state(excitation: f64, fiber_velocity: f64, force: f64) -> MuscleDynamicState {
    MuscleDynamicState {
        excitation,
        activation: excitation,
        normalized_fiber_length: 1.0,
        fiber_velocity,
        active_fiber_force: force,
        isometric_active_fiber_force: force * 1.1,
        passive_fiber_force: 0.0,
    }
}

/// Two identical muscles behind a hand-written model implementation
struct FixedModel {
    total_mass: f64,
    states: Vec<MuscleDynamicState>,
}

impl MusculoskeletalModel for FixedModel {
    fn muscle_index(&self, name: &str) -> Option<usize> {
        match name {
            "a" => Some(0),
            "b" => Some(1),
            _ => None,
        }
    }

    fn muscle_properties(&self, _index: usize) -> MuscleProperties {
        MuscleProperties {
            max_isometric_force: 1000.0,
            optimal_fiber_length: 0.1,
        }
    }
}

impl SimulationState for FixedModel {
    fn muscle_name(&self, index: usize) -> Option<&str> {
        ["a", "b"].get(index).copied()
    }

    fn muscle_state(&self, index: usize) -> Option<MuscleDynamicState> {
        self.states.get(index).copied()
    }

    fn total_mass(&self) -> f64 {
        self.total_mass
    }
}

#[test]
fn test_config_to_evaluation_flow() {
    let config = ConfigLoader::new()
        .without_environment()
        .load_from_str(GAIT_CONFIG)
        .expect("config should load");

    let mut probe = MetabolicPowerProbe::from_config(config).expect("config should be valid");
    let mut model = gait_model();
    probe.bind(&model).expect("all muscles present");

    let soleus = probe.parameters().get("soleus_r").unwrap();
    let expected_mass = (3549.0 / 0.25e6) * 1059.7 * 0.05;
    assert_relative_eq!(soleus.muscle_mass().unwrap(), expected_mass, epsilon = 1e-12);
    let tib_ant = probe.parameters().get("tib_ant_r").unwrap();
    assert_eq!(tib_ant.muscle_mass(), Some(0.25));

    model.set_state("soleus_r", stance_state(0.6, -0.3, 1800.0));
    model.set_state("vasti_r", stance_state(0.4, 0.1, 2000.0));
    model.set_state("tib_ant_r", stance_state(0.1, 0.0, 50.0));

    let total = probe.evaluate(&model).unwrap();
    let report = probe.evaluate_detailed(&model).unwrap();

    assert_relative_eq!(report.total, total, epsilon = 1e-9);
    assert_eq!(report.muscles.len(), 3);
    assert_relative_eq!(report.basal, 1.2 * 72.0, epsilon = 1e-12);

    let names: Vec<&str> = report.muscles.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["soleus_r", "vasti_r", "tib_ant_r"]);

    let summed: f64 = report.muscles.iter().map(|m| m.total).sum::<f64>() + report.basal;
    assert_relative_eq!(summed, total, epsilon = 1e-9);
}

#[test]
fn test_evaluation_is_pure_and_repeatable() {
    let mut probe = MetabolicPowerProbe::new("metabolics");
    probe.add_parameter(MetabolicMuscleParameter::new("soleus_r")).unwrap();

    let mut model = gait_model();
    model.set_state("soleus_r", stance_state(0.7, -0.5, 2500.0));
    probe.bind(&model).unwrap();

    let first = probe.evaluate(&model).unwrap();
    for _ in 0..10 {
        assert_eq!(probe.evaluate(&model).unwrap(), first);
    }
}

#[test]
fn test_rebinding_reproduces_masses() {
    let mut probe = MetabolicPowerProbe::new("metabolics");
    probe.add_parameter(MetabolicMuscleParameter::new("vasti_r")).unwrap();
    let model = gait_model();

    probe.bind(&model).unwrap();
    let first = probe.parameters().get("vasti_r").unwrap().muscle_mass();
    probe.bind(&model).unwrap();
    let second = probe.parameters().get("vasti_r").unwrap().muscle_mass();

    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn test_unknown_muscle_fails_bind() {
    let mut config = ProbeConfig::default();
    config
        .metabolic_parameters
        .add(MetabolicMuscleParameter::new("soleus_r"))
        .unwrap();
    config
        .metabolic_parameters
        .add(MetabolicMuscleParameter::new("glut_max_r"))
        .unwrap();

    let mut probe = MetabolicPowerProbe::from_config(config).unwrap();
    match probe.bind(&gait_model()) {
        Err(ProbeError::UnresolvedMuscle { muscle, .. }) => assert_eq!(muscle, "glut_max_r"),
        other => panic!("Expected unresolved muscle, got {:?}", other),
    }
    assert!(!probe.is_bound());
}

#[test]
fn test_custom_model_through_traits() {
    let mut probe = MetabolicPowerProbe::with_rates("metabolics", true, false, false, false, false);
    probe.add_parameter(MetabolicMuscleParameter::with_slow_twitch_ratio("a", 1.0)).unwrap();
    probe.add_parameter(MetabolicMuscleParameter::with_slow_twitch_ratio("b", 0.0)).unwrap();

    let state = FixedModel {
        total_mass: 80.0,
        states: vec![
            MuscleDynamicState { excitation: 1.0, ..Default::default() },
            MuscleDynamicState { excitation: 1.0, ..Default::default() },
        ],
    };
    probe.bind(&state).unwrap();

    // m = (1000 / 0.25e6) * 1059.7 * 0.1 = 0.42388 kg per muscle
    let mass = 1000.0 / 0.25e6 * 1059.7 * 0.1;
    let expected = mass * 40.0 + mass * 133.0;
    assert_relative_eq!(probe.evaluate(&state).unwrap(), expected, epsilon = 1e-9);
}

#[test]
fn test_shortening_model_switch() {
    let mut probe = MetabolicPowerProbe::with_rates("metabolics", false, false, true, false, false);
    probe
        .add_parameter(MetabolicMuscleParameter::with_provided_mass("soleus_r", 0.5, 1.0))
        .unwrap();

    let mut model = gait_model();
    model.set_state(
        "soleus_r",
        MuscleDynamicState {
            fiber_velocity: -0.2,
            active_fiber_force: 1000.0,
            isometric_active_fiber_force: 1200.0,
            normalized_fiber_length: 1.0,
            ..Default::default()
        },
    );
    probe.bind(&model).unwrap();

    // Force independent, shortening: alpha = 0
    assert_eq!(probe.evaluate(&model).unwrap(), 0.0);

    // Force dependent, shortening: alpha = 0.157 * 1000, Sdot = -157 * -0.2
    probe.set_shortening_model(ShorteningHeatModel::ForceDependent);
    assert_relative_eq!(probe.evaluate(&model).unwrap(), 31.4, epsilon = 1e-9);
}

#[test]
fn test_negative_shortening_heat_when_lengthening() {
    let mut probe = MetabolicPowerProbe::new("metabolics");
    let mut flags = TermFlags::none();
    flags.shortening_rate_on = true;
    probe.set_flags(flags);
    probe
        .add_parameter(MetabolicMuscleParameter::with_provided_mass("soleus_r", 0.5, 1.0))
        .unwrap();

    let mut model = gait_model();
    model.set_state(
        "soleus_r",
        MuscleDynamicState {
            fiber_velocity: 0.4,
            active_fiber_force: 500.0,
            passive_fiber_force: 100.0,
            normalized_fiber_length: 1.0,
            ..Default::default()
        },
    );
    probe.bind(&model).unwrap();

    // alpha = 0.25 * 600 = 150, Sdot = -150 * 0.4
    assert_relative_eq!(probe.evaluate(&model).unwrap(), -60.0, epsilon = 1e-9);
}

#[test]
fn test_nan_state_propagates() {
    let mut probe = MetabolicPowerProbe::new("metabolics");
    probe.add_parameter(MetabolicMuscleParameter::new("soleus_r")).unwrap();

    let mut model = gait_model();
    model.set_state(
        "soleus_r",
        MuscleDynamicState {
            excitation: f64::NAN,
            normalized_fiber_length: 1.0,
            ..Default::default()
        },
    );
    probe.bind(&model).unwrap();

    assert!(probe.evaluate(&model).unwrap().is_nan());
}

#[test]
fn test_batch_matches_serial() {
    let mut probe = MetabolicPowerProbe::new("metabolics");
    probe.add_parameter(MetabolicMuscleParameter::new("soleus_r")).unwrap();
    probe.add_parameter(MetabolicMuscleParameter::new("vasti_r")).unwrap();
    probe.bind(&gait_model()).unwrap();

    let trials: Vec<InMemoryModel> = (0..32)
        .map(|i| {
            let u = i as f64 / 31.0;
            let mut model = gait_model();
            model.set_state("soleus_r", stance_state(u, -0.1 * u, 2000.0 * u));
            model.set_state("vasti_r", stance_state(1.0 - u, 0.05, 3000.0 * (1.0 - u)));
            model
        })
        .collect();

    let batch = probe.evaluate_batch(&trials);
    assert_eq!(batch.len(), trials.len());
    for (result, trial) in batch.iter().zip(&trials) {
        assert_eq!(*result.as_ref().unwrap(), probe.evaluate(trial).unwrap());
    }
}

#[test]
fn test_batch_reports_mismatched_trials() {
    let mut probe = MetabolicPowerProbe::new("metabolics");
    probe.add_parameter(MetabolicMuscleParameter::new("soleus_r")).unwrap();
    probe.add_parameter(MetabolicMuscleParameter::new("vasti_r")).unwrap();
    probe.bind(&gait_model()).unwrap();

    let mut reordered = InMemoryModel::new(72.0)
        .with_muscle("vasti_r", 6000.0, 0.087)
        .with_muscle("soleus_r", 3549.0, 0.05);
    reordered.set_state("soleus_r", stance_state(1.0, 0.0, 0.0));
    let truncated = InMemoryModel::new(72.0).with_muscle("soleus_r", 3549.0, 0.05);

    let trials = vec![gait_model(), reordered, truncated];
    let results = probe.evaluate_batch(&trials);

    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(ProbeError::StateMismatch { ref muscle, index: 0, .. }) if muscle == "soleus_r"
    ));
    assert!(matches!(
        results[2],
        Err(ProbeError::StateMismatch { ref muscle, index: 1, .. }) if muscle == "vasti_r"
    ));
}

#[test]
fn test_probe_inputs_and_report_json() {
    let mut probe = MetabolicPowerProbe::new("whole_body");
    probe.add_parameter(MetabolicMuscleParameter::new("soleus_r")).unwrap();

    let mut model = gait_model();
    model.set_state("soleus_r", stance_state(0.5, -0.1, 1000.0));
    probe.bind(&model).unwrap();

    let inputs = probe.compute_probe_inputs(&model).unwrap();
    assert_eq!(inputs.len(), probe.num_outputs());
    assert_eq!(inputs[0], probe.evaluate(&model).unwrap());
    assert_eq!(probe.output_labels(), vec!["whole_body".to_string()]);

    let json = probe.evaluate_detailed(&model).unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["probe"], "whole_body");
    assert_eq!(value["muscles"][0]["name"], "soleus_r");
}

#[test]
fn test_shared_curve_between_probes() {
    let curve: Arc<dyn muscle_metabolics::InterpolationCurve> = Arc::new(|l: f64| 0.5 + 0.5 * l);

    let mut model = gait_model();
    model.set_state(
        "soleus_r",
        MuscleDynamicState {
            excitation: 1.0,
            normalized_fiber_length: 1.0,
            ..Default::default()
        },
    );

    let mut probes: Vec<MetabolicPowerProbe> = (0..2)
        .map(|i| {
            let mut probe =
                MetabolicPowerProbe::with_rates(format!("probe_{}", i), false, true, false, false, false);
            probe
                .add_parameter(MetabolicMuscleParameter::with_provided_mass("soleus_r", 0.5, 1.0))
                .unwrap();
            probe.set_curve(Arc::clone(&curve));
            probe
        })
        .collect();

    for probe in &mut probes {
        probe.bind(&model).unwrap();
        assert_relative_eq!(probe.evaluate(&model).unwrap(), 92.5, epsilon = 1e-9);
    }
}
