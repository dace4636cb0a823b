// [apps/coordinator/src/state/indicators.rs]
/*!
 * =================================================================
 * APARATO: INDICATOR & SETTINGS STORE (V6.1 - PANEL TRUTH)
 * CLASIFICACIÓN: APPLICATION STATE ATOM (ESTRATO L1-APP)
 * RESPONSABILIDAD: INDICADORES DE PANEL Y AJUSTES DE RUNTIME
 *
 * Un único almacén clave-valor con doble escritura en disco: el
 * archivo de datos persiste indicadores y ajustes entre arranques; el
 * archivo espejo es el contrato con el driver de LEDs, reescrito en
 * cada cambio. Un escritor por archivo, flush en cada mutación.
 * =================================================================
 */

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};

/// Almacén de indicadores con persistencia write-through.
pub struct IndicatorStore {
    states: Mutex<BTreeMap<String, i64>>,
    data_path: PathBuf,
    mirror_path: PathBuf,
}

fn default_states() -> BTreeMap<String, i64> {
    BTreeMap::from([
        ("daemon_act".to_string(), 1),
        ("web_act_state".to_string(), 1),
        ("tx_active".to_string(), 1),
        ("show_load_state".to_string(), 0),
        ("show_run_state".to_string(), 0),
        ("error_state".to_string(), 0),
        ("led_brightness".to_string(), 10),
        ("receiver_timeout_ms".to_string(), 30_000),
        ("command_response_timeout_ms".to_string(), 100),
        // El dongle re-sincroniza receptores a esta cadencia.
        ("clock_sync_interval_ms".to_string(), 2_000),
        // El daemon sincroniza el dongle a esta cadencia.
        ("dongle_sync_interval_ms".to_string(), 20_000),
        ("config_query_interval_ms".to_string(), 120_000),
        ("debug_mode".to_string(), 0),
        ("debug_commands".to_string(), 0),
    ])
}

impl IndicatorStore {
    /// Abre el almacén mezclando lo persistido con los valores nominales.
    /// Claves desconocidas o con tipo inválido en disco se ignoran.
    pub fn open(data_path: PathBuf, mirror_path: PathBuf) -> IndicatorStore {
        let mut states = default_states();

        match std::fs::read_to_string(&data_path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&raw) {
                Ok(persisted) => {
                    for (key, value) in persisted {
                        if let (true, Some(numeric)) = (states.contains_key(&key), value.as_i64()) {
                            states.insert(key, numeric);
                        }
                    }
                    info!("💡 [PANEL]: Indicator states loaded from {:?}.", data_path);
                }
                Err(parse_fault) => {
                    warn!("💡 [PANEL]: Persisted indicators unreadable ({}). Using defaults.", parse_fault);
                }
            },
            Err(_) => info!("💡 [PANEL]: No persisted indicators at {:?}. Using defaults.", data_path),
        }

        let store = IndicatorStore {
            states: Mutex::new(states),
            data_path,
            mirror_path,
        };
        store.persist_all();
        store
    }

    /// Mueve un indicador. Solo los cambios reales tocan disco.
    pub fn update(&self, key: &str, value: i64) {
        {
            let mut states = self.states.lock().expect("LOCK_POISONED");
            let Some(slot) = states.get_mut(key) else {
                warn!("💡 [PANEL]: Attempted to update non-existent indicator '{}'.", key);
                return;
            };
            if *slot == value {
                return;
            }
            *slot = value;
        }
        self.persist_all();
    }

    /// Lee un valor vigente (0 si la clave no existe).
    pub fn get(&self, key: &str) -> i64 {
        let states = self.states.lock().expect("LOCK_POISONED");
        states.get(key).copied().unwrap_or(0)
    }

    pub fn debug_enabled(&self) -> bool {
        self.get("debug_mode") == 1
    }

    /// Vuelca el almacén completo al archivo de datos y al espejo LED.
    fn persist_all(&self) {
        let serialized = {
            let states = self.states.lock().expect("LOCK_POISONED");
            serde_json::to_string_pretty(&*states).expect("indicator map is always serializable")
        };

        for path in [&self.data_path, &self.mirror_path] {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(io_fault) = std::fs::write(path, &serialized) {
                warn!("💡 [PANEL]: Failed to persist indicators to {:?}: {}", path, io_fault);
            }
        }
    }
}
