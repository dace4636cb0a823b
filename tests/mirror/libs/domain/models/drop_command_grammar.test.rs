/**
 * =================================================================
 * APARATO: DROP COMMAND GRAMMAR TEST (V1.0 - SOBERANO)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el vocabulario completo del buzón de mandos y
 *           sus valores por defecto.
 * =================================================================
 */

use pyrolink_domain_models::command::DropCommand;

fn parse(raw: &str) -> DropCommand {
    serde_json::from_str(raw).expect("mando nominal")
}

#[test]
fn certify_full_command_vocabulary_parses() {
    let vocabulary = [
        r#"{"type":"serial","data":"msync 0 1"}"#,
        r#"{"type":"manual_fire","data":{"zone":10,"target":3}}"#,
        r#"{"type":"db_query","query":"SELECT 1"}"#,
        r#"{"type":"delegate_launch","do_it":true}"#,
        r#"{"type":"start_show"}"#,
        r#"{"type":"stop_show"}"#,
        r#"{"type":"pause_show"}"#,
        r#"{"type":"schedule","schedule":[]}"#,
        r#"{"type":"stop_schedule"}"#,
        r#"{"type":"load_show","id":7}"#,
        r#"{"type":"unload_show"}"#,
        r#"{"type":"select_serial","device":"/dev/ttyUSB0","baud":57600}"#,
        r#"{"type":"set_brightness","brightness":40}"#,
        r#"{"type":"set_receiver_timeout","timeout_ms":15000}"#,
        r#"{"type":"set_command_response_timeout","timeout_ms":120}"#,
        r#"{"type":"set_clock_sync_interval","interval_ms":2500}"#,
        r#"{"type":"set_dongle_sync_interval","interval_ms":30000}"#,
        r#"{"type":"set_config_query_interval","interval_ms":90000}"#,
        r#"{"type":"set_debug_mode","debug_mode":1}"#,
        r#"{"type":"set_debug_commands","debug_commands":1}"#,
        r#"{"type":"set_fire_repeat","repeat_ct":8}"#,
        r#"{"type":"set_receiver_settings","receiver_ident":"RX1","tx_power":5}"#,
        r#"{"type":"query_all_receiver_configs"}"#,
    ];

    for raw in vocabulary {
        let parsed: Result<DropCommand, _> = serde_json::from_str(raw);
        assert!(parsed.is_ok(), "El mando no fue reconocido: {}", raw);
    }
    println!("✅ COMMAND_GRAMMAR: Full vocabulary certified.");
}

#[test]
fn certify_unknown_command_types_are_rejected() {
    let parsed: Result<DropCommand, _> =
        serde_json::from_str(r#"{"type":"self_destruct","countdown":3}"#);
    assert!(parsed.is_err(), "Un tipo desconocido debe fallar el parseo.");
}

#[test]
fn certify_command_payload_defaults() {
    let DropCommand::SetFireRepeat { repeat_ct } = parse(r#"{"type":"set_fire_repeat"}"#) else {
        panic!("Clasificación incorrecta.");
    };
    assert_eq!(repeat_ct, 6);

    let DropCommand::SetDongleSyncInterval { interval_ms } =
        parse(r#"{"type":"set_dongle_sync_interval"}"#)
    else {
        panic!("Clasificación incorrecta.");
    };
    assert_eq!(interval_ms, 20_000);

    let DropCommand::ManualFire { data } =
        parse(r#"{"type":"manual_fire","data":{"zone":1,"target":2}}"#)
    else {
        panic!("Clasificación incorrecta.");
    };
    assert_eq!((data.zone, data.target), (1, 2));
}
