/**
 * =================================================================
 * APARATO: RESOLVER UNIQUENESS TEST (V1.0 - SOBERANO)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar que toda dirección resuelve a exactamente un
 *           receptor y que la ambigüedad veta la carga completa.
 * =================================================================
 */

use pyrolink_coordinator::engine::clock::wall_clock_ms;
use pyrolink_coordinator::engine::resolver::resolve_plan;
use pyrolink_coordinator::engine::{LoadOutcome, ShowOrchestrator, ThresholdsSource};
use pyrolink_coordinator::ops::CoordinatorOps;
use pyrolink_coordinator::state::ReceiverRegistry;
use pyrolink_domain_models::config::FiringThresholds;
use pyrolink_domain_models::engine::EngineState;
use pyrolink_domain_models::frames::{StatusFrame, StatusRow};
use pyrolink_domain_models::receiver::ReceiverProfile;
use pyrolink_domain_models::show::ScheduledCue;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingOps {
    lines: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl CoordinatorOps for RecordingOps {
    fn send_line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
    fn write_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
    fn set_indicator(&self, _key: &str, _value: i64) {}
    fn signal_show_loaded(&self, _show_id: i64) {}
    fn write_time_cursor(&self, _seconds: f64) {}
    fn setting(&self, _key: &str) -> i64 {
        20_000
    }
}

struct OpenThresholds;
impl ThresholdsSource for OpenThresholds {
    fn reload(&self) -> FiringThresholds {
        FiringThresholds::default()
    }
}

fn profile(kind: &str, cues: serde_json::Value) -> ReceiverProfile {
    serde_json::from_value(json!({ "type": kind, "node": 1, "cues": cues })).unwrap()
}

fn registry_with(entries: Vec<(&str, ReceiverProfile)>) -> Arc<ReceiverRegistry> {
    let inventory: HashMap<String, ReceiverProfile> = entries
        .into_iter()
        .map(|(ident, profile)| (ident.to_string(), profile))
        .collect();
    Arc::new(ReceiverRegistry::from_inventory(inventory))
}

fn mark_online(registry: &ReceiverRegistry, ident: &str) {
    let now = wall_clock_ms();
    let frame = StatusFrame {
        dongle_timestamp_ms: now,
        rows: vec![StatusRow {
            ident: ident.to_string(),
            node: 1,
            battery: 100,
            show_id: 0,
            load_complete: false,
            start_ready: false,
            last_msg_time_ms: now,
            latency_ms: 4,
            success_percent: 100,
            continuity: vec![0, 0],
        }],
    };
    registry.apply_status_frame(&frame, now);
}

fn cue(start: f64, zone: u32, target: u32) -> ScheduledCue {
    ScheduledCue {
        start_time_seconds: start,
        zone,
        target,
        id: json!(1),
    }
}

#[test]
fn certify_ambiguous_addressing_vetoes_the_load() {
    let registry = registry_with(vec![
        ("RX1", profile("SMART_RELAY", json!({"10": [1, 2]}))),
        ("RX2", profile("SMART_RELAY", json!({"10": [1]}))),
    ]);
    mark_online(&registry, "RX1");
    mark_online(&registry, "RX2");

    let ops = Arc::new(RecordingOps::default());
    let engine = ShowOrchestrator::new(ops.clone(), registry, Arc::new(OpenThresholds));

    let outcome = engine.load_show(vec![cue(1.0, 10, 1)], 5);

    assert_eq!(outcome, LoadOutcome::Failed);
    assert!(!engine.show_loaded());
    assert_eq!(engine.state(), EngineState::Standby);
    assert!(engine
        .errors()
        .iter()
        .any(|error| error.contains("Multiple devices declare cue 10:1")));
    // Ningún comando de carga salió hacia el dongle.
    assert!(ops.lines.lock().unwrap().is_empty());
    println!("✅ RESOLVER: Ambiguity veto certified.");
}

#[test]
fn certify_orphan_addresses_are_load_errors() {
    let registry = registry_with(vec![("RX1", profile("SMART_RELAY", json!({"10": [1]})))]);
    mark_online(&registry, "RX1");

    let outcome = resolve_plan(&registry, &[cue(1.0, 99, 7)], wall_clock_ms());
    let errors = outcome.expect_err("la dirección huérfana debe fallar");
    assert!(errors[0].contains("Could not resolve cue 99:7 to any device."));
}

#[test]
fn certify_offline_smart_receivers_reject_async_cues() {
    // RX1 declara el cue pero jamás ha hablado: precargar es imposible.
    let registry = registry_with(vec![("RX1", profile("SMART_RELAY", json!({"10": [1]})))]);

    let errors = resolve_plan(&registry, &[cue(1.0, 10, 1)], wall_clock_ms())
        .expect_err("receptor fuera de línea");
    assert!(errors[0].contains("Resolved cue 10:1 to RX1, but its not connected."));
}

#[test]
fn certify_direct_rf_cues_ignore_the_presence_window() {
    // El transmisor directo no precarga nada: resolver sin estado vivo.
    let registry = registry_with(vec![("TX433", profile("DIRECT_RF", json!({"10": [1]})))]);

    let plan = resolve_plan(&registry, &[cue(1.0, 10, 1)], wall_clock_ms())
        .expect("el transmisor directo no exige presencia");
    assert_eq!(plan.firing_array.len(), 1);
    assert!(!plan.firing_array[0].async_fire);
    assert!(plan.async_load_targets.is_empty());
}

#[test]
fn certify_partition_groups_cues_per_receiver() {
    let registry = registry_with(vec![
        ("RX1", profile("SMART_RELAY", json!({"10": [1, 2]}))),
        ("RX2", profile("SMART_RELAY", json!({"20": [3]}))),
    ]);
    mark_online(&registry, "RX1");
    mark_online(&registry, "RX2");

    let plan = resolve_plan(
        &registry,
        &[cue(1.0, 10, 1), cue(2.5, 20, 3), cue(4.0, 10, 2)],
        wall_clock_ms(),
    )
    .expect("plan nominal");

    assert_eq!(plan.firing_array.len(), 3);
    assert_eq!(plan.async_load_targets["RX1"].len(), 2);
    assert_eq!(plan.async_load_targets["RX2"].len(), 1);
}
