// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS HUB (V4.0 - SINGLE SOURCE OF TRUTH)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATOS DE DATOS DEL ECOSISTEMA DE TIRO
 *
 * VISION HIPER-HOLÍSTICA:
 * Define la verdad nominal compartida entre el coordinador, el enlace
 * de transporte y los consumidores del snapshot: cues y shows,
 * inventario de receptores, tramas compactas del dongle, gramática de
 * mandos externos y estados del motor de orquestación.
 * =================================================================
 */

pub mod command;
pub mod config;
pub mod engine;
pub mod errors;
pub mod frames;
pub mod receiver;
pub mod show;
pub mod snapshot;

pub use command::DropCommand;
pub use config::{FiringThresholds, SystemConfig};
pub use engine::{EngineState, ErrIndicator, LoadIndicator, RunIndicator, TxIndicator};
pub use errors::{DecodeError, ShowValidationError};
pub use frames::{
    BridgeEnvelope, ConfigFrame, GpioSnapshot, InboundFrame, SerialPortConfig, StatusFrame,
    StatusRow,
};
pub use receiver::{ReceiverConfigBlock, ReceiverKind, ReceiverLiveStatus, ReceiverProfile};
pub use show::{DisplayCue, ResolvedCue, ScheduledCue};
pub use snapshot::{ReceiverSnapshot, RfSettings, SettingsSnapshot, StateSnapshot};
