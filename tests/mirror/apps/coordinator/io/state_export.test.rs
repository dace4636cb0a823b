/**
 * =================================================================
 * APARATO: STATE EXPORT TEST (V1.1 - SOBERANO)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el snapshot integral del coordinador y el
 *           despacho de mandos de ajustes sobre un kernel real.
 * =================================================================
 */

use pyrolink_coordinator::kernel::Coordinator;
use pyrolink_coordinator::paths::FilesystemLayout;
use pyrolink_domain_models::command::DropCommand;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn field_layout(root: &Path) -> FilesystemLayout {
    FilesystemLayout {
        command_dir: root.join("d_cmd"),
        state_file: root.join("state"),
        cursor_file: root.join("fw_cursor"),
        error_log: root.join("log/daemon.err"),
        led_state_file: root.join("ledstate"),
        led_data_file: root.join("leddata"),
        webact_file: root.join("webactstate"),
        config_file: root.join("systemcfg.json"),
        command_log: root.join("log/command.log"),
        show_dir: root.join("shows"),
        bridge_endpoint: "127.0.0.1:1".to_string(),
        serial_port: "/dev/ttyACM0".to_string(),
        serial_baud: 115_200,
    }
}

fn write_system_config(root: &Path) {
    std::fs::write(
        root.join("systemcfg.json"),
        r#"{
            "system": { "dongle_port": "/dev/ttyACM7", "dongle_baud": 57600 },
            "receivers": {
                "RX1": { "type": "SMART_RELAY", "node": 1, "cues": { "10": [1, 2] } }
            },
            "protocols": {
                "PYRO_TS_HYBRID": { "config": { "min_battery_to_fire_pct": 25, "require_continuity": true } }
            }
        }"#,
    )
    .unwrap();
}

fn ignite(root: &Path) -> Arc<Coordinator> {
    write_system_config(root);
    Coordinator::ignite(field_layout(root)).expect("ignición nominal")
}

#[test]
fn certify_snapshot_surface_contract() {
    let workdir = tempdir().expect("directorio efímero");
    let coordinator = ignite(workdir.path());

    coordinator.update_state_file();

    let raw = std::fs::read_to_string(workdir.path().join("state")).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(snapshot["active_protocol"], "PYRO_TS_HYBRID");
    assert_eq!(snapshot["proto_handler_status"], "STANDBY");
    assert_eq!(snapshot["dstc"], true);
    assert_eq!(snapshot["show_loaded"], false);
    assert_eq!(snapshot["device_found"], false);
    assert_eq!(snapshot["device_is_armed"], false);
    // Las coordenadas RF del archivo de configuración dominan el layout.
    assert_eq!(snapshot["settings"]["rf"]["addr"], "/dev/ttyACM7");
    assert_eq!(snapshot["settings"]["rf"]["baud"], 57600);
    assert_eq!(snapshot["settings"]["fire_repeat_ct"], 6);
    assert!(snapshot["receivers"]["RX1"].is_object());
    assert_eq!(snapshot["receivers"]["RX1"]["type"], "SMART_RELAY");
    println!("✅ STATE_EXPORT: Snapshot contract certified.");
}

#[test]
fn certify_settings_commands_project_into_the_snapshot() {
    let workdir = tempdir().expect("directorio efímero");
    let coordinator = ignite(workdir.path());

    // Coerciones nominales: brillo 0 -> 1, repetición 0 -> 6.
    coordinator.handle_command(DropCommand::SetBrightness { brightness: 0 });
    coordinator.handle_command(DropCommand::SetFireRepeat { repeat_ct: 0 });
    coordinator.handle_command(DropCommand::SetDongleSyncInterval { interval_ms: 45_000 });
    coordinator.handle_command(DropCommand::SetDebugMode { debug_mode: 1 });
    coordinator.update_state_file();

    let snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(workdir.path().join("state")).unwrap()).unwrap();

    assert_eq!(snapshot["settings"]["led_brightness"], 1);
    assert_eq!(snapshot["settings"]["fire_repeat_ct"], 6);
    assert_eq!(snapshot["settings"]["dongle_sync_interval_ms"], 45_000);
    assert_eq!(snapshot["settings"]["debug_mode"], 1);
    println!("✅ STATE_EXPORT: Settings projection certified.");
}

#[test]
fn certify_webact_flag_is_born_when_absent() {
    let workdir = tempdir().expect("directorio efímero");
    let coordinator = ignite(workdir.path());

    coordinator.load_webact_state();
    let content = std::fs::read_to_string(workdir.path().join("webactstate")).unwrap();
    assert_eq!(content.trim(), "0");

    // Contenido corrupto: se restituye a 0.
    std::fs::write(workdir.path().join("webactstate"), "not-a-number").unwrap();
    coordinator.load_webact_state();
    let content = std::fs::read_to_string(workdir.path().join("webactstate")).unwrap();
    assert_eq!(content.trim(), "0");
}

#[test]
fn certify_unload_resets_cursor_file() {
    let workdir = tempdir().expect("directorio efímero");
    let coordinator = ignite(workdir.path());

    coordinator.unload_show();

    let cursor = std::fs::read_to_string(workdir.path().join("fw_cursor")).unwrap();
    assert_eq!(cursor, "-1.00");
    println!("✅ STATE_EXPORT: Cursor reset certified.");
}
