/**
 * =================================================================
 * APARATO: START ABORT DEADLINE TEST (V1.0 - SOBERANO)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el aborto del arranque cuando un receptor no
 *           confirma 'start_ready' antes del margen previo a T0.
 * =================================================================
 */

use pyrolink_coordinator::engine::clock::wall_clock_ms;
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
    indicators: Mutex<Vec<(String, i64)>>,
}

impl CoordinatorOps for RecordingOps {
    fn send_line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
    fn write_error(&self, _message: &str) {}
    fn set_indicator(&self, key: &str, value: i64) {
        self.indicators.lock().unwrap().push((key.to_string(), value));
    }
    fn signal_show_loaded(&self, _show_id: i64) {}
    fn write_time_cursor(&self, _seconds: f64) {}
    fn setting(&self, _key: &str) -> i64 {
        3_600_000
    }
}

struct OpenThresholds;
impl ThresholdsSource for OpenThresholds {
    fn reload(&self) -> FiringThresholds {
        FiringThresholds::default()
    }
}

fn inject_status(registry: &ReceiverRegistry, show_id: i64, load_complete: bool, start_ready: bool) {
    let now = wall_clock_ms();
    registry.apply_status_frame(
        &StatusFrame {
            dongle_timestamp_ms: now,
            rows: vec![StatusRow {
                ident: "R1".to_string(),
                node: 1,
                battery: 90,
                show_id,
                load_complete,
                start_ready,
                last_msg_time_ms: now,
                latency_ms: 5,
                success_percent: 100,
                continuity: vec![0, 0],
            }],
        },
        now,
    );
}

#[test]
fn certify_missing_start_ready_aborts_at_deadline() {
    let mut inventory: HashMap<String, ReceiverProfile> = HashMap::new();
    inventory.insert(
        "R1".to_string(),
        serde_json::from_value(json!({"type":"SMART_RELAY","node":1,"cues":{"10":[1]}})).unwrap(),
    );
    let registry = Arc::new(ReceiverRegistry::from_inventory(inventory));
    let ops = Arc::new(RecordingOps::default());

    // Ventana comprimida: T0 a +2.5 s, margen de aborto 1 s.
    let engine = ShowOrchestrator::new(ops.clone(), registry.clone(), Arc::new(OpenThresholds))
        .with_start_timing(2_500, 1_000);

    inject_status(&registry, 0, false, false);
    let timeline = vec![ScheduledCue {
        start_time_seconds: 1.0,
        zone: 10,
        target: 1,
        id: json!(1),
    }];
    assert_eq!(engine.load_show(timeline, 6), LoadOutcome::Waiting);
    inject_status(&registry, 6, true, false);
    engine.on_status_refresh();
    assert!(engine.show_loaded());

    // R1 jamás confirma start_ready: el deadline debe vetarlo todo.
    engine.run_show();

    assert_eq!(engine.state(), EngineState::Aborted);
    assert!(engine
        .errors()
        .iter()
        .any(|e| e.contains("R1 did not signal start ready by") && e.contains("Aborting show.")));

    let lines = ops.lines.lock().unwrap();
    assert!(
        lines.iter().any(|l| l.starts_with("showstart R1")),
        "El handshake debe haberse intentado."
    );
    assert!(
        !lines.iter().any(|l| l.starts_with("433fire") || l.starts_with("fire ")),
        "Un arranque abortado jamás emite comandos de fuego."
    );

    // Indicadores: error DAEMON (1) y marcha STOPPED (3).
    let indicators = ops.indicators.lock().unwrap();
    assert!(indicators.iter().any(|(k, v)| k == "error_state" && *v == 1));
    assert!(indicators.iter().any(|(k, v)| k == "show_run_state" && *v == 3));
    println!("✅ START_DEADLINE: Abort-before-T0 certified.");
}

#[test]
fn certify_confirmed_nodes_clear_the_wait() {
    let mut inventory: HashMap<String, ReceiverProfile> = HashMap::new();
    inventory.insert(
        "R1".to_string(),
        serde_json::from_value(json!({"type":"SMART_RELAY","node":1,"cues":{"10":[1]}})).unwrap(),
    );
    let registry = Arc::new(ReceiverRegistry::from_inventory(inventory));
    let ops = Arc::new(RecordingOps::default());
    let engine = ShowOrchestrator::new(ops.clone(), registry.clone(), Arc::new(OpenThresholds))
        .with_start_timing(2_200, 800);

    inject_status(&registry, 0, false, false);
    let timeline = vec![ScheduledCue {
        start_time_seconds: 0.1,
        zone: 10,
        target: 1,
        id: json!(1),
    }];
    assert_eq!(engine.load_show(timeline, 8), LoadOutcome::Waiting);

    // Carga y disposición de arranque confirmadas de antemano.
    inject_status(&registry, 8, true, true);
    engine.on_status_refresh();
    assert!(engine.show_loaded());

    engine.run_show();

    // Secuencia completa: el cue era asíncrono, ningún fuego local.
    assert_eq!(engine.state(), EngineState::Loaded);
    let lines = ops.lines.lock().unwrap();
    assert!(lines.iter().any(|l| l.starts_with("showstart R1")));
    assert!(!lines.iter().any(|l| l.starts_with("433fire")));
    println!("✅ START_DEADLINE: Confirmed handshake path certified.");
}
