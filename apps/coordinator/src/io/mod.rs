// [apps/coordinator/src/io/mod.rs]
/*!
 * =================================================================
 * APARATO: FILESYSTEM SURFACE HUB (V6.0)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L1-APP)
 * RESPONSABILIDAD: SUPERFICIES DE DISCO DEL COORDINADOR
 * =================================================================
 */

pub mod command_log;
pub mod cursor;
pub mod error_log;
pub mod exporter;
pub mod inbox;
pub mod show_store;

pub use command_log::CommandDebugLog;
pub use cursor::CursorFile;
pub use error_log::ErrorLog;
pub use show_store::{JsonShowStore, ShowRecord, ShowStore};
