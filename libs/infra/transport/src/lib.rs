// [libs/infra/transport/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TRANSPORT STRATA HUB (V5.0 - BRIDGE UPLINK)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: E/S ENMARCADA HACIA EL DONGLE VÍA PUENTE TCP
 * =================================================================
 */

pub mod assembler;
pub mod errors;
pub mod link;

pub use assembler::{AssemblerOutcome, FrameAssembler, STALE_BUFFER_AGE};
pub use errors::TransportError;
pub use link::{BridgeEvents, BridgeLink, LinkSignalSink, READ_POLL_TIMEOUT};
