// [apps/coordinator/src/paths.rs]
/*!
 * =================================================================
 * APARATO: FILESYSTEM TOPOLOGY (V6.0 - FIELD LAYOUT)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: COORDENADAS DE ARCHIVOS Y ENLACE DEL ENTORNO
 *
 * Cada superficie de disco del daemon tiene aquí su ruta nominal con
 * su valor de despliegue embebido como fallback. El entorno (.env)
 * puede reubicar cualquiera de ellas para bancos de prueba.
 * =================================================================
 */

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Espera de cortesía al arrancar: el personal toma posiciones antes
/// de que el daemon abra el enlace RF.
pub const STARTUP_GRACE: Duration = Duration::from_secs(5);

/// Topología completa de archivos y coordenadas de red del coordinador.
#[derive(Debug, Clone)]
pub struct FilesystemLayout {
    /// Directorio de buzón para mandos JSON de agentes externos.
    pub command_dir: PathBuf,
    /// Snapshot integral de estado, reescrito en cada tick.
    pub state_file: PathBuf,
    /// Cursor temporal del show en segundos (una línea).
    pub cursor_file: PathBuf,
    /// Bitácora de errores del daemon, una línea con marca temporal.
    pub error_log: PathBuf,
    /// Espejo de indicadores para el driver de LEDs.
    pub led_state_file: PathBuf,
    /// Persistencia de indicadores y ajustes entre arranques.
    pub led_data_file: PathBuf,
    /// Bandera de actividad del publicador web (un entero).
    pub webact_file: PathBuf,
    /// Configuración del sistema: inventario y umbrales.
    pub config_file: PathBuf,
    /// Bitácora de ecos de comando del dongle.
    pub command_log: PathBuf,
    /// Almacén JSON de shows (colaborador de persistencia).
    pub show_dir: PathBuf,
    /// Endpoint TCP del puente serie.
    pub bridge_endpoint: String,
    /// Puerto físico del dongle en el host del puente.
    pub serial_port: String,
    pub serial_baud: u32,
}

fn env_path(key: &str, fallback: &str) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(fallback))
}

impl FilesystemLayout {
    /// Construye la topología desde el entorno con los valores de campo.
    pub fn from_environment() -> FilesystemLayout {
        FilesystemLayout {
            command_dir: env_path("PYROLINK_COMMAND_DIR", "/tmp/d_cmd"),
            state_file: env_path("PYROLINK_STATE_FILE", "/data/state"),
            cursor_file: env_path("PYROLINK_CURSOR_FILE", "/tmp/fw_cursor"),
            error_log: env_path("PYROLINK_ERROR_LOG", "/data/log/daemon.err"),
            led_state_file: env_path("PYROLINK_LED_STATE_FILE", "/data/ledstate"),
            led_data_file: env_path("PYROLINK_LED_DATA_FILE", "/data/leddata"),
            webact_file: env_path("PYROLINK_WEBACT_FILE", "/data/webactstate"),
            config_file: env_path("PYROLINK_CONFIG_FILE", "/config/systemcfg.json"),
            command_log: env_path("PYROLINK_COMMAND_LOG", "/data/log/command.log"),
            show_dir: env_path("PYROLINK_SHOW_DIR", "/data/shows"),
            bridge_endpoint: env::var("PYROLINK_BRIDGE_ENDPOINT")
                .unwrap_or_else(|_| "127.0.0.1:9000".to_string()),
            serial_port: env::var("PYROLINK_SERIAL_PORT")
                .unwrap_or_else(|_| "/dev/ttyACM0".to_string()),
            serial_baud: env::var("PYROLINK_SERIAL_BAUD")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(115_200),
        }
    }
}
