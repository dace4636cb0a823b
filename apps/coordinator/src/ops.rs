// [apps/coordinator/src/ops.rs]
/*!
 * =================================================================
 * APARATO: COORDINATOR OPS CONTRACT (V6.0 - ACYCLIC SYNAPSE)
 * CLASIFICACIÓN: APPLICATION CONTRACT (ESTRATO L1-APP)
 * RESPONSABILIDAD: PUERTA DEL MOTOR HACIA EL DAEMON SIN CICLOS
 *
 * El orquestador jamás sostiene una referencia de vuelta al daemon:
 * todo lo que necesita del exterior (emitir una línea, registrar un
 * error, mover un indicador, publicar el cursor) pasa por esta
 * interfaz. El banco de pruebas inyecta aquí un grabador de tráfico.
 * =================================================================
 */

/// Operaciones del daemon visibles desde el motor de protocolo.
pub trait CoordinatorOps: Send + Sync {
    /// Emite una línea hacia el dongle. Los rechazos del enlace se
    /// registran y señalizan internamente; nunca interrumpen al motor.
    fn send_line(&self, line: &str);

    /// Registra un error operativo en la bitácora del daemon.
    fn write_error(&self, message: &str);

    /// Mueve un indicador del panel (y su espejo en disco).
    fn set_indicator(&self, key: &str, value: i64);

    /// El motor confirmó la carga distribuida completa de un show.
    fn signal_show_loaded(&self, show_id: i64);

    /// Publica el cursor temporal del show en segundos.
    fn write_time_cursor(&self, seconds: f64);

    /// Lee un ajuste vigente del almacén de indicadores.
    fn setting(&self, key: &str) -> i64;
}
