// [libs/domain/models/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN ERROR CATALOG (V4.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE DOMINIO
 * =================================================================
 */

use thiserror::Error;

/// Fallos al interpretar una trama entrante del dongle o del puente.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// La línea no es JSON válido a pesar de estar enmarcada como tal.
    #[error("[L2_FRAME_FAULT]: MALFORMED_JSON_LINE -> {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// El campo 'type' no pertenece al vocabulario de tramas conocido.
    #[error("[L2_FRAME_FAULT]: UNKNOWN_FRAME_TYPE -> {0}")]
    UnknownFrameType(String),

    /// La trama carece de un campo estructuralmente obligatorio.
    #[error("[L2_FRAME_FAULT]: MISSING_REQUIRED_FIELD -> {0}")]
    MissingField(&'static str),
}

/// Fallos al validar y normalizar el payload de autoría de un show.
#[derive(Error, Debug)]
pub enum ShowValidationError {
    /// Un cue del payload llegó sin marca de inicio. Disparar a ciegas
    /// no es una opción.
    #[error("[L2_SHOW_FAULT]: CUE_WITHOUT_START_TIME -> cue id {0}")]
    MissingStartTime(String),

    /// El payload de presentación estaba vacío.
    #[error("[L2_SHOW_FAULT]: EMPTY_DISPLAY_PAYLOAD")]
    EmptyPayload,
}
