// [apps/coordinator/src/input/mod.rs]
/*!
 * =================================================================
 * APARATO: OPERATOR INPUT HUB (V6.0)
 * CLASIFICACIÓN: APPLICATION INPUT (ESTRATO L1-APP)
 * RESPONSABILIDAD: INTERRUPTORES FÍSICOS DEL OPERADOR
 * =================================================================
 */

pub mod switches;

pub use switches::{run_switch_monitor, SwitchEdgeTracker, SwitchInputs, HIGH, LOW};
