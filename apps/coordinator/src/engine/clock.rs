// [apps/coordinator/src/engine/clock.rs]
/*!
 * =================================================================
 * APARATO: TIMEKEEPING SPLIT (V6.0 - DUAL CLOCK)
 * CLASIFICACIÓN: ENGINE SUPPORT (ESTRATO L1-APP)
 * RESPONSABILIDAD: SEPARACIÓN RELOJ DE PARED / RELOJ MONÓTONO
 *
 * El reloj de pared alimenta 'msync' y las marcas exportadas; el bucle
 * de disparo mide con Instant (monótono) para que un salto de NTP en
 * plena función no desplace ningún cue.
 * =================================================================
 */

use std::time::{SystemTime, UNIX_EPOCH};

/// Epoch ms del reloj de pared del coordinador.
pub fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Redondeo a dos decimales del cursor temporal exportado.
pub fn round_cursor(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
