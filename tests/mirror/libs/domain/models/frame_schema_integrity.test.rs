/**
 * =================================================================
 * APARATO: FRAME SCHEMA INTEGRITY TEST (V1.0 - SOBERANO)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la interpretación de tramas compactas del
 *           dongle y el filtrado de sobres del puente.
 * =================================================================
 */

use pyrolink_domain_models::frames::{
    parse_bridge_envelope, parse_inbound, BridgeEnvelope, InboundFrame,
};

#[test]
fn certify_status_frame_positional_decoding() {
    let line = r#"{"type":"status","t":1000,"r":[["RX1",7,88,4,1,0,950,12,99,[5,0]]]}"#;

    let InboundFrame::Status(frame) = parse_inbound(line).expect("trama nominal") else {
        panic!("La trama de estado fue clasificada incorrectamente.");
    };

    assert_eq!(frame.dongle_timestamp_ms, 1000);
    assert_eq!(frame.rows.len(), 1);

    let row = &frame.rows[0];
    assert_eq!(row.ident, "RX1");
    assert_eq!(row.node, 7);
    assert_eq!(row.battery, 88);
    assert_eq!(row.show_id, 4);
    assert!(row.load_complete);
    assert!(!row.start_ready);
    assert_eq!(row.last_msg_time_ms, 950);
    assert_eq!(row.latency_ms, 12);
    assert_eq!(row.success_percent, 99);
    assert_eq!(row.continuity, vec![5, 0]);
    println!("✅ FRAME_SCHEMA: Positional status decoding certified.");
}

#[test]
fn certify_untyped_frames_default_to_status() {
    // El firmware clásico omite 'type' en reportes de estado.
    let frame = parse_inbound(r#"{"t":55,"r":[]}"#).expect("trama nominal");
    assert!(matches!(frame, InboundFrame::Status(_)));
}

#[test]
fn certify_config_frame_requires_ident() {
    assert!(parse_inbound(r#"{"type":"config","d":[1,2,3]}"#).is_err());

    let InboundFrame::Config(config) =
        parse_inbound(r#"{"type":"config","i":"RX2","d":[2,3,41,600,3,1000,2000,5,1]}"#)
            .expect("trama nominal")
    else {
        panic!("La trama de configuración fue clasificada incorrectamente.");
    };
    assert_eq!(config.ident, "RX2");
    assert_eq!(config.block.num_boards, 2);
    assert_eq!(config.block.conn_timeout_count, 1);
}

#[test]
fn certify_cmd_frames_are_preserved_verbatim() {
    let InboundFrame::CommandDebug(echo) =
        parse_inbound(r#"{"type":"cmd","raw":"fire RX1 3"}"#).expect("trama nominal")
    else {
        panic!("El eco de comando fue clasificado incorrectamente.");
    };
    assert_eq!(echo.get("raw").and_then(|v| v.as_str()), Some("fire RX1 3"));
}

#[test]
fn certify_unknown_frame_vocabulary_is_rejected() {
    assert!(parse_inbound(r#"{"type":"telemetry"}"#).is_err());
    assert!(parse_inbound("OK not json").is_err());
}

#[test]
fn certify_bridge_envelopes_are_classified() {
    let ack: serde_json::Value = serde_json::from_str(
        r#"{"tcpstatus":true,"serial_config":{"port":"/dev/ttyACM0","baud":115200}}"#,
    )
    .unwrap();
    let Some(BridgeEnvelope::SerialAck { ok, serial_config, .. }) = parse_bridge_envelope(&ack)
    else {
        panic!("El acuse del puente no fue reconocido.");
    };
    assert!(ok);
    assert_eq!(serial_config.expect("config presente").baud, 115_200);

    let gpio: serde_json::Value =
        serde_json::from_str(r#"{"gpio":1,"armed":0,"start_stop":1,"man_fire":1}"#).unwrap();
    let Some(BridgeEnvelope::Gpio(snapshot)) = parse_bridge_envelope(&gpio) else {
        panic!("La instantánea gpio no fue reconocida.");
    };
    assert_eq!(snapshot.armed, 0);

    // El tráfico del dongle no es un sobre del puente.
    let status: serde_json::Value = serde_json::from_str(r#"{"type":"status","t":1}"#).unwrap();
    assert!(parse_bridge_envelope(&status).is_none());
    println!("✅ FRAME_SCHEMA: Bridge envelope filtering certified.");
}
