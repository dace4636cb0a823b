// [libs/infra/transport/src/errors.rs]
/*!
 * =================================================================
 * APARATO: TRANSPORT ERROR CATALOG (V5.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE ENLACE
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    /// Fallo al abrir el socket hacia el puente TCP-serial.
    #[error("[L3_LINK_FAULT]: BRIDGE_UNREACHABLE -> {0}")]
    ConnectFailed(std::io::Error),

    /// No hay enlace establecido y se intentó transmitir.
    #[error("[L3_LINK_FAULT]: LINK_NOT_ESTABLISHED")]
    NotConnected,

    /// Fallo de escritura sobre el socket del puente.
    #[error("[L3_LINK_FAULT]: TX_WRITE_REJECTED -> {0}")]
    WriteFailed(std::io::Error),

    /// El puente reportó un error al reconfigurar el puerto físico.
    #[error("[L3_LINK_FAULT]: SERIAL_RECONFIG_REJECTED -> {0}")]
    SerialConfigRejected(String),
}
