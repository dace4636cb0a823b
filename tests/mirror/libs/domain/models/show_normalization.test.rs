/**
 * =================================================================
 * APARATO: SHOW NORMALIZATION TEST (V1.0 - SOBERANO)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la derivación del timeline de ignición desde
 *           el payload de presentación.
 * =================================================================
 */

use pyrolink_domain_models::errors::ShowValidationError;
use pyrolink_domain_models::show::{normalize_display_payload, DisplayCue};
use serde_json::json;

fn payload_from_json(raw: &str) -> Vec<DisplayCue> {
    serde_json::from_str(raw).expect("payload de presentación nominal")
}

#[test]
fn certify_effective_start_subtracts_ignition_delay() {
    let payload = payload_from_json(
        r#"[
            {"startTime": 10.0, "delay": 2.5, "zone": 4, "target": 1, "id": 901},
            {"startTime": 3.0, "zone": 4, "target": 2, "id": 902}
        ]"#,
    );

    let timeline = normalize_display_payload(payload).expect("normalización nominal");

    assert_eq!(timeline[0].start_time_seconds, 3.0);
    assert_eq!(timeline[0].id, json!(902));
    assert_eq!(timeline[1].start_time_seconds, 7.5);
    assert_eq!(timeline[1].id, json!(901));
    println!("✅ SHOW_NORM: Delay subtraction and ordering certified.");
}

#[test]
fn certify_equal_instants_preserve_authoring_order() {
    let payload = payload_from_json(
        r#"[
            {"startTime": 5.0, "delay": 0.0, "zone": 1, "target": 1, "id": "a"},
            {"startTime": 6.0, "delay": 1.0, "zone": 1, "target": 2, "id": "b"},
            {"startTime": 5.0, "delay": 0.0, "zone": 1, "target": 3, "id": "c"}
        ]"#,
    );

    let timeline = normalize_display_payload(payload).expect("normalización nominal");
    let ids: Vec<_> = timeline.iter().map(|cue| cue.id.clone()).collect();
    assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
}

#[test]
fn certify_cues_without_start_time_are_rejected() {
    // Un cue sin instante de autoría invalida el payload completo en
    // la deserialización: disparar a ciegas no es una opción.
    let malformed: Result<Vec<DisplayCue>, _> =
        serde_json::from_str(r#"[{"zone": 1, "target": 1, "id": 1}]"#);
    assert!(malformed.is_err());

    assert!(matches!(
        normalize_display_payload(Vec::new()),
        Err(ShowValidationError::EmptyPayload)
    ));
}
