/**
 * =================================================================
 * APARATO: DIRECT-RF CODEC TEST (V1.0 - SOBERANO)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la trama de 24 bits contra la fórmula del
 *           hardware sobre el dominio completo de direcciones.
 * =================================================================
 */

use proptest::prelude::*;
use pyrolink_coordinator::engine::rf433::{
    direct_rf_payload, encode_direct_rf_frame, MAX_DIRECT_RF_TARGET, MAX_DIRECT_RF_ZONE,
};

proptest! {
    #[test]
    fn certify_frame_formula_over_full_domain(
        zone in 0u32..=MAX_DIRECT_RF_ZONE,
        target in 0u32..=MAX_DIRECT_RF_TARGET,
    ) {
        let frame = encode_direct_rf_frame(zone, target).expect("dominio válido");
        let expected = (0xE3u32 << 16) | ((123 - zone) << 8) | 0x70 | (15 - target);
        prop_assert_eq!(frame, expected);
    }

    #[test]
    fn certify_payload_binary_roundtrip(
        zone in 0u32..=MAX_DIRECT_RF_ZONE,
        target in 0u32..=MAX_DIRECT_RF_TARGET,
        repetition in 1i64..=8,
    ) {
        let payload = direct_rf_payload(zone, target, repetition).expect("dominio válido");

        let inner = payload
            .strip_prefix(">>")
            .and_then(|rest| rest.strip_suffix("<<"))
            .expect("envoltura >>...<<");
        let (bits, reported_repetition) = inner.split_once(':').expect("separador de repetición");

        // El preámbulo 0xE3 fija el bit 23: la cadena siempre mide 24.
        prop_assert_eq!(bits.len(), 24);
        let decoded = u32::from_str_radix(bits, 2).expect("cadena binaria");
        prop_assert_eq!(decoded, encode_direct_rf_frame(zone, target).unwrap());
        prop_assert_eq!(reported_repetition.parse::<i64>().unwrap(), repetition);
    }
}

#[test]
fn certify_reference_vector() {
    // zona 10, canal 1: (0xE3<<16)|(113<<8)|0x70|14
    let frame = encode_direct_rf_frame(10, 1).unwrap();
    assert_eq!(frame, 0x00E3_717E);
    println!("✅ RF433: Reference vector certified.");
}

#[test]
fn certify_domain_boundaries() {
    assert!(encode_direct_rf_frame(MAX_DIRECT_RF_ZONE, MAX_DIRECT_RF_TARGET).is_some());
    assert!(encode_direct_rf_frame(MAX_DIRECT_RF_ZONE + 1, 0).is_none());
    assert!(encode_direct_rf_frame(0, MAX_DIRECT_RF_TARGET + 1).is_none());
}
