// [apps/coordinator/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: STATE STRATA HUB (V6.0)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ÁTOMOS DE ESTADO COMPARTIDO DEL COORDINADOR
 * =================================================================
 */

pub mod indicators;
pub mod registry;

pub use indicators::IndicatorStore;
pub use registry::{ReceiverRegistry, ResolutionOutcome, ONLINE_WINDOW_MS};
