// INICIO DEL ARCHIVO [apps/coordinator/src/kernel.rs]
/**
 * =================================================================
 * APARATO: COORDINATOR SOVEREIGN KERNEL (V6.5 - FIRING LINE)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: CABLEADO DE INFRAESTRUCTURA, HILOS Y DESPACHO
 *
 * VISION HIPER-HOLÍSTICA:
 * Actúa como la placa base donde se conectan enlace, radar, motor,
 * panel y superficies de disco. Mantiene las compuertas de operador
 * (armado, arranque delegado, fuego manual) y despacha los mandos del
 * buzón. Cuatro hilos de larga vida: lector del enlace, monitor de
 * interruptores, buzón de mandos y un hilo de tiro por ejecución.
 * =================================================================
 */

use crate::engine::clock::wall_clock_ms;
use crate::engine::{LoadOutcome, ShowOrchestrator, ThresholdsSource};
use crate::input::{SwitchInputs, LOW};
use crate::io::exporter;
use crate::io::{CommandDebugLog, CursorFile, ErrorLog, JsonShowStore, ShowStore};
use crate::ops::CoordinatorOps;
use crate::paths::FilesystemLayout;
use crate::state::{IndicatorStore, ReceiverRegistry};
use anyhow::Context;
use pyrolink_domain_models::command::DropCommand;
use pyrolink_domain_models::config::{FiringThresholds, SystemConfig, HYBRID_PROTOCOL_ID};
use pyrolink_domain_models::engine::{ErrIndicator, LoadIndicator, RunIndicator, TxIndicator};
use pyrolink_domain_models::frames::{parse_inbound, GpioSnapshot, InboundFrame, SerialPortConfig};
use pyrolink_domain_models::show::{normalize_display_payload, DisplayCue};
use pyrolink_infra_transport::{BridgeEvents, BridgeLink, LinkSignalSink};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Silencio máximo del dongle tolerado por las compuertas de arranque.
const TX_SILENCE_GATE_MS: i64 = 10_000;

/// Compuertas de operador y metadatos del show vigente.
struct DaemonGates {
    delegate_start_to_client: bool,
    waiting_for_client_start: bool,
    is_armed: bool,
    start_sw_active: bool,
    man_fire_enabled: bool,
    loaded_show_name: Option<String>,
    loaded_show_id: Option<i64>,
    serial_addr: String,
    serial_baud: u32,
    fire_check_failures: Vec<String>,
    current_schedule: Option<Vec<DisplayCue>>,
}

/// Vista clonada de las compuertas para el exportador de estado.
#[derive(Debug, Clone)]
pub struct GateSnapshot {
    pub delegate_start_to_client: bool,
    pub waiting_for_client_start: bool,
    pub is_armed: bool,
    pub start_sw_active: bool,
    pub man_fire_enabled: bool,
    pub loaded_show_name: Option<String>,
    pub loaded_show_id: Option<i64>,
    pub serial_addr: String,
    pub serial_baud: u32,
    pub fire_check_failures: Vec<String>,
}

/// Señales de salud del enlace proyectadas al panel.
struct LinkHealthSignals {
    indicators: Arc<IndicatorStore>,
    error_log: Arc<ErrorLog>,
}

impl LinkSignalSink for LinkHealthSignals {
    fn on_transmitting(&self) {
        self.indicators.update("tx_active", TxIndicator::Transmitting.value());
    }

    fn on_connected(&self) {
        self.indicators.update("tx_active", TxIndicator::Connected.value());
    }

    fn on_device_error(&self, detail: &str) {
        self.indicators.update("tx_active", TxIndicator::DeviceError.value());
        self.error_log.append(detail);
    }
}

/// Implementación de las operaciones del daemon vistas por el motor.
struct DaemonOps {
    link: Arc<BridgeLink>,
    indicators: Arc<IndicatorStore>,
    error_log: Arc<ErrorLog>,
    cursor: Arc<CursorFile>,
    signals: Arc<LinkHealthSignals>,
}

impl CoordinatorOps for DaemonOps {
    fn send_line(&self, line: &str) {
        self.link.send_line_signalled(line, &*self.signals);
    }

    fn write_error(&self, message: &str) {
        self.error_log.append(message);
    }

    fn set_indicator(&self, key: &str, value: i64) {
        self.indicators.update(key, value);
    }

    fn signal_show_loaded(&self, show_id: i64) {
        info!("📦 [KERNEL]: Show {} confirmed loaded by the swarm.", show_id);
        self.indicators.update("show_load_state", LoadIndicator::Loaded.value());
        self.cursor.write(0.0);
    }

    fn write_time_cursor(&self, seconds: f64) {
        self.cursor.write(seconds);
    }

    fn setting(&self, key: &str) -> i64 {
        self.indicators.get(key)
    }
}

/// Umbrales releídos del archivo de configuración en cada precheck.
struct ConfigThresholdsSource {
    config_path: PathBuf,
    cached: Mutex<FiringThresholds>,
}

impl ThresholdsSource for ConfigThresholdsSource {
    fn reload(&self) -> FiringThresholds {
        match SystemConfig::load_from(&self.config_path) {
            Ok(config) => {
                let thresholds = config.hybrid_thresholds();
                *self.cached.lock().expect("LOCK_POISONED") = thresholds;
                thresholds
            }
            Err(io_fault) => {
                warn!("🔍 [PRECHECK]: Could not reload thresholds ({}). Using last known.", io_fault);
                *self.cached.lock().expect("LOCK_POISONED")
            }
        }
    }
}

/// La placa base del daemon de tiro.
pub struct Coordinator {
    layout: FilesystemLayout,
    link: Arc<BridgeLink>,
    registry: Arc<ReceiverRegistry>,
    engine: Arc<ShowOrchestrator>,
    indicators: Arc<IndicatorStore>,
    error_log: Arc<ErrorLog>,
    cursor: Arc<CursorFile>,
    command_log: Arc<CommandDebugLog>,
    show_store: Arc<dyn ShowStore>,
    inputs: Arc<SwitchInputs>,
    signals: Arc<LinkHealthSignals>,
    shutdown: Arc<AtomicBool>,
    gates: Mutex<DaemonGates>,
    fire_threads: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Ignición del kernel: carga la configuración del sistema y
    /// cablea todos los estratos. La ausencia de configuración es un
    /// fallo fatal de arranque.
    ///
    /// # Errors:
    /// Configuración ilegible o ausente.
    pub fn ignite(layout: FilesystemLayout) -> anyhow::Result<Arc<Coordinator>> {
        let system_config = SystemConfig::load_from(&layout.config_file)
            .with_context(|| format!("CRITICAL_FAULT: system config unreadable at {:?}", layout.config_file))?;

        let indicators = Arc::new(IndicatorStore::open(
            layout.led_data_file.clone(),
            layout.led_state_file.clone(),
        ));
        let error_log = Arc::new(ErrorLog::new(layout.error_log.clone()));
        let cursor = Arc::new(CursorFile::new(layout.cursor_file.clone()));
        let command_log = Arc::new(CommandDebugLog::new(layout.command_log.clone()));

        if system_config.receivers.is_empty() {
            error_log.append("Config did not contain any receivers!");
        }
        let registry = Arc::new(ReceiverRegistry::from_inventory(system_config.receivers.clone()));

        let serial_addr = system_config
            .system
            .as_ref()
            .and_then(|section| section.dongle_port.clone())
            .unwrap_or_else(|| layout.serial_port.clone());
        let serial_baud = system_config
            .system
            .as_ref()
            .and_then(|section| section.dongle_baud)
            .unwrap_or(layout.serial_baud);

        let link = Arc::new(BridgeLink::new(layout.bridge_endpoint.clone()));
        let signals = Arc::new(LinkHealthSignals {
            indicators: indicators.clone(),
            error_log: error_log.clone(),
        });

        let ops: Arc<dyn CoordinatorOps> = Arc::new(DaemonOps {
            link: link.clone(),
            indicators: indicators.clone(),
            error_log: error_log.clone(),
            cursor: cursor.clone(),
            signals: signals.clone(),
        });

        let thresholds = Arc::new(ConfigThresholdsSource {
            config_path: layout.config_file.clone(),
            cached: Mutex::new(system_config.hybrid_thresholds()),
        });

        let engine = Arc::new(ShowOrchestrator::new(ops, registry.clone(), thresholds));
        let show_store: Arc<dyn ShowStore> = Arc::new(JsonShowStore::new(layout.show_dir.clone()));

        info!("🛰️ [KERNEL]: Coordinator ignition complete. Protocol {}.", HYBRID_PROTOCOL_ID);

        Ok(Arc::new(Coordinator {
            layout,
            link,
            registry,
            engine,
            indicators,
            error_log,
            cursor,
            command_log,
            show_store,
            inputs: Arc::new(SwitchInputs::new()),
            signals,
            shutdown: Arc::new(AtomicBool::new(false)),
            gates: Mutex::new(DaemonGates {
                delegate_start_to_client: true,
                waiting_for_client_start: false,
                is_armed: false,
                start_sw_active: false,
                man_fire_enabled: false,
                loaded_show_name: None,
                loaded_show_id: None,
                serial_addr,
                serial_baud,
                fire_check_failures: Vec::new(),
                current_schedule: None,
            }),
            fire_threads: Mutex::new(Vec::new()),
        }))
    }

    // --- ACCESORES DE CABLEADO ---

    pub fn layout(&self) -> &FilesystemLayout {
        &self.layout
    }

    pub fn link(&self) -> &Arc<BridgeLink> {
        &self.link
    }

    pub fn registry(&self) -> &Arc<ReceiverRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> &Arc<ShowOrchestrator> {
        &self.engine
    }

    pub fn indicators(&self) -> &Arc<IndicatorStore> {
        &self.indicators
    }

    pub fn inputs(&self) -> &Arc<SwitchInputs> {
        &self.inputs
    }

    pub fn write_error(&self, message: &str) {
        self.error_log.append(message);
    }

    pub fn gate_snapshot(&self) -> GateSnapshot {
        let gates = self.gates.lock().expect("LOCK_POISONED");
        GateSnapshot {
            delegate_start_to_client: gates.delegate_start_to_client,
            waiting_for_client_start: gates.waiting_for_client_start,
            is_armed: gates.is_armed,
            start_sw_active: gates.start_sw_active,
            man_fire_enabled: gates.man_fire_enabled,
            loaded_show_name: gates.loaded_show_name.clone(),
            loaded_show_id: gates.loaded_show_id,
            serial_addr: gates.serial_addr.clone(),
            serial_baud: gates.serial_baud,
            fire_check_failures: gates.fire_check_failures.clone(),
        }
    }

    // --- CICLO DE VIDA ---

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.engine.signal_stop();
    }

    pub fn shutdown_token(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Abre el enlace y ordena la reconfiguración serie remota.
    pub fn setup_serial(&self) {
        let serial = {
            let gates = self.gates.lock().expect("LOCK_POISONED");
            SerialPortConfig {
                port: gates.serial_addr.clone(),
                baud: gates.serial_baud,
            }
        };

        if let Err(link_fault) = self.link.connect(&serial) {
            self.error_log
                .append(&format!("Error setting up TCP connection to serial bridge: {}", link_fault));
            self.indicators.update("tx_active", TxIndicator::DeviceError.value());
        }
    }

    /// Rescata los ajustes persistidos del último snapshot exportado.
    fn setup_settings(&self) {
        let Ok(raw) = std::fs::read_to_string(&self.layout.state_file) else {
            return;
        };
        let Ok(previous) = serde_json::from_str::<serde_json::Value>(&raw) else {
            return;
        };
        let Some(settings) = previous.get("settings") else {
            return;
        };

        if let Some(brightness) = settings.get("led_brightness").and_then(|v| v.as_i64()) {
            self.indicators.update("led_brightness", brightness);
        }
        if let Some(repeat_count) = settings.get("fire_repeat_ct").and_then(|v| v.as_i64()) {
            self.engine.set_fire_repetition(repeat_count);
        }
    }

    fn clear_states(&self) {
        self.indicators.update("show_load_state", LoadIndicator::Off.value());
        self.indicators.update("error_state", ErrIndicator::Off.value());
    }

    /// Lanza los hilos de larga vida y bloquea hasta el apagado.
    pub fn run(self: &Arc<Coordinator>) {
        self.setup_serial();
        self.setup_settings();
        self.clear_states();

        let reader_coordinator = self.clone();
        let reader_thread = std::thread::Builder::new()
            .name("uplink-reader".to_string())
            .spawn(move || {
                let shutdown = reader_coordinator.shutdown.clone();
                let link = reader_coordinator.link.clone();
                let signals = reader_coordinator.signals.clone();
                link.run_reader(&shutdown, &*reader_coordinator, &*signals);
            })
            .expect("FATAL: uplink reader thread failed to spawn");

        let monitor_coordinator = self.clone();
        let monitor_thread = std::thread::Builder::new()
            .name("switch-monitor".to_string())
            .spawn(move || crate::input::run_switch_monitor(&monitor_coordinator))
            .expect("FATAL: switch monitor thread failed to spawn");

        let inbox_coordinator = self.clone();
        let inbox_thread = std::thread::Builder::new()
            .name("command-inbox".to_string())
            .spawn(move || crate::io::inbox::run_inbox_loop(&inbox_coordinator))
            .expect("FATAL: command inbox thread failed to spawn");

        while !self.shutdown_requested() {
            std::thread::sleep(Duration::from_millis(100));
        }

        info!("🛰️ [KERNEL]: Shutdown token observed. Joining service threads.");
        let _ = reader_thread.join();
        let _ = monitor_thread.join();
        let _ = inbox_thread.join();

        let mut fire_threads = self.fire_threads.lock().expect("LOCK_POISONED");
        for handle in fire_threads.drain(..) {
            let _ = handle.join();
        }
        info!("🛰️ [KERNEL]: Daemon stopped.");
    }

    // --- DECODIFICADOR DE TRÁFICO DEL DONGLE ---

    /// Clasifica una línea del dongle y actualiza radar/bitácoras.
    pub fn dispatch_dongle_line(&self, line: &str) {
        if !line.starts_with('{') {
            debug!("📻 [DONGLE]: '{}'", line);
            return;
        }

        match parse_inbound(line) {
            Ok(InboundFrame::Status(frame)) => {
                self.registry.apply_status_frame(&frame, wall_clock_ms());
                self.engine.on_status_refresh();
            }
            Ok(InboundFrame::Config(frame)) => self.registry.apply_config_frame(&frame),
            Ok(InboundFrame::CommandDebug(echo)) => self.command_log.append(&echo),
            Err(decode_fault) => debug!("📻 [DONGLE]: Undecodable frame: {}", decode_fault),
        }
    }

    // --- COMPUERTAS DE OPERADOR ---

    pub fn set_armed(&self, armed: bool) {
        self.gates.lock().expect("LOCK_POISONED").is_armed = armed;
    }

    pub fn set_start_sw_active(&self, active: bool) {
        self.gates.lock().expect("LOCK_POISONED").start_sw_active = active;
    }

    pub fn set_manual_fire_enabled(&self, enabled: bool) {
        self.gates.lock().expect("LOCK_POISONED").man_fire_enabled = enabled;
    }

    pub fn manual_fire_enabled(&self) -> bool {
        self.gates.lock().expect("LOCK_POISONED").man_fire_enabled
    }

    pub fn clear_waiting_for_client_start(&self) {
        self.gates.lock().expect("LOCK_POISONED").waiting_for_client_start = false;
    }

    // --- SUPERFICIES AUXILIARES ---

    /// Relee la bandera de actividad web y la proyecta al panel.
    pub fn load_webact_state(&self) {
        match std::fs::read_to_string(&self.layout.webact_file) {
            Ok(content) => match content.trim().parse::<i64>() {
                Ok(web_state) => self.indicators.update("web_act_state", web_state),
                Err(_) => {
                    warn!("🕸️ [WEBACT]: Invalid content '{}'. Resetting to 0.", content.trim());
                    let _ = std::fs::write(&self.layout.webact_file, "0");
                }
            },
            Err(_) => {
                if let Some(parent) = self.layout.webact_file.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                let _ = std::fs::write(&self.layout.webact_file, "0");
            }
        }
    }

    pub fn update_state_file(&self) {
        exporter::export_state(self);
    }

    // --- DESPACHO DE MANDOS DEL BUZÓN ---

    pub fn handle_command(&self, command: DropCommand) {
        match command {
            DropCommand::Serial { data } => self.send_serial(&data),

            DropCommand::ManualFire { data } => self.handle_manual_fire(data.zone, data.target),

            DropCommand::DbQuery { query } => {
                // La persistencia relacional es un colaborador externo.
                warn!("🗄️ [C2]: db_query is not served by this store: '{}'", query);
            }

            DropCommand::DelegateLaunch { do_it } => {
                info!("🎛️ [C2]: Delegated launch set to {}.", do_it);
                self.gates.lock().expect("LOCK_POISONED").delegate_start_to_client = do_it;
            }

            DropCommand::StartShow => {
                let (delegated, waiting) = {
                    let gates = self.gates.lock().expect("LOCK_POISONED");
                    (gates.delegate_start_to_client, gates.waiting_for_client_start)
                };
                if delegated && waiting {
                    self.start_schedule(true);
                }
            }

            DropCommand::StopShow => {
                let (delegated, waiting) = {
                    let gates = self.gates.lock().expect("LOCK_POISONED");
                    (gates.delegate_start_to_client, gates.waiting_for_client_start)
                };
                if delegated && !waiting {
                    self.stop_schedule(true);
                }
            }

            DropCommand::PauseShow => {
                let (delegated, waiting) = {
                    let gates = self.gates.lock().expect("LOCK_POISONED");
                    (gates.delegate_start_to_client, gates.waiting_for_client_start)
                };
                if delegated && !waiting {
                    self.indicators
                        .update("show_run_state", RunIndicator::DelegateWait.value());
                    self.gates.lock().expect("LOCK_POISONED").waiting_for_client_start = true;
                    self.pause_schedule(true);
                }
            }

            DropCommand::Schedule { schedule } => {
                self.gates.lock().expect("LOCK_POISONED").current_schedule = Some(schedule);
            }

            DropCommand::StopSchedule => self.stop_schedule(true),

            DropCommand::LoadShow { id } => self.load_show(id),

            DropCommand::UnloadShow => self.unload_show(),

            DropCommand::SelectSerial { device, baud } => self.switch_serial(device, baud),

            DropCommand::SetBrightness { brightness } => {
                let effective = if brightness == 0 { 1 } else { brightness };
                self.indicators.update("led_brightness", effective);
            }

            DropCommand::SetReceiverTimeout { timeout_ms } => {
                self.indicators.update("receiver_timeout_ms", timeout_ms);
            }

            DropCommand::SetCommandResponseTimeout { timeout_ms } => {
                self.indicators.update("command_response_timeout_ms", timeout_ms);
            }

            DropCommand::SetClockSyncInterval { interval_ms } => {
                self.indicators.update("clock_sync_interval_ms", interval_ms);
            }

            DropCommand::SetDongleSyncInterval { interval_ms } => {
                self.indicators.update("dongle_sync_interval_ms", interval_ms);
            }

            DropCommand::SetConfigQueryInterval { interval_ms } => {
                self.indicators.update("config_query_interval_ms", interval_ms);
            }

            DropCommand::SetDebugMode { debug_mode } => {
                self.indicators.update("debug_mode", debug_mode);
            }

            DropCommand::SetDebugCommands { debug_commands } => {
                self.indicators.update("debug_commands", debug_commands);
            }

            DropCommand::SetFireRepeat { repeat_ct } => {
                let effective = if repeat_ct == 0 { 6 } else { repeat_ct };
                self.engine.set_fire_repetition(effective);
            }

            DropCommand::SetReceiverSettings {
                receiver_ident,
                fire_ms_duration,
                status_interval,
                tx_power,
            } => {
                self.engine
                    .query_receiver_config(&receiver_ident, fire_ms_duration, status_interval, tx_power);
            }

            DropCommand::QueryAllReceiverConfigs => self.engine.query_all_receiver_configs(),
        }
    }

    /// Passthrough crudo hacia el dongle.
    pub fn send_serial(&self, data: &str) {
        self.link.send_line_signalled(data, &*self.signals);
    }

    /// Reconfigura el puerto físico remoto del puente.
    pub fn switch_serial(&self, device: String, baud: u32) {
        {
            let mut gates = self.gates.lock().expect("LOCK_POISONED");
            gates.serial_addr = device;
            gates.serial_baud = baud;
        }
        self.setup_serial();
    }

    // --- FUEGO MANUAL ---

    /// Compuertas físicas del disparo manual; la resolución y emisión
    /// pertenecen al motor.
    pub fn handle_manual_fire(&self, zone: u32, target: u32) {
        if self.inputs.arm() != LOW {
            self.write_error(&format!(
                "Cannot manually fire zone:{} target:{} if arming switch is not on.",
                zone, target
            ));
        } else if self.inputs.start_stop() != LOW {
            self.write_error(&format!(
                "Cannot manually fire zone:{} target:{} if start switch is not on.",
                zone, target
            ));
        } else if self.inputs.man_fire() != LOW {
            self.write_error(&format!(
                "Cannot manually fire zone:{} target:{} if system is not in manual fire mode.",
                zone, target
            ));
        } else if self.engine.is_running_show() {
            self.write_error("Cannot manually fire while a scheduled show is running.");
        } else {
            self.engine.handle_manual_fire(zone, target);
        }
    }

    // --- CICLO DE SHOW ---

    /// Carga un show desde el almacén, lo normaliza y lo distribuye.
    pub fn load_show(&self, show_id: i64) {
        self.indicators.update("show_load_state", LoadIndicator::Loading.value());
        self.indicators.update("error_state", ErrIndicator::Off.value());

        if !self.link.is_connected() {
            self.write_error("Cannot load a show as there is no available protocol to run");
            self.indicators.update("show_load_state", LoadIndicator::LoadError.value());
            return;
        }

        if self.gates.lock().expect("LOCK_POISONED").start_sw_active {
            self.write_error("Cannot load a show when the START button is active. Hit STOP on the box.");
            self.indicators.update("show_load_state", LoadIndicator::LoadError.value());
            return;
        }

        let record = match self.show_store.fetch_show(show_id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.write_error(&format!("No show found with ID {}.", show_id));
                self.indicators.update("show_load_state", LoadIndicator::LoadError.value());
                return;
            }
            Err(store_fault) => {
                self.write_error(&format!("Error loading show ID {}: {}", show_id, store_fault));
                self.indicators.update("show_load_state", LoadIndicator::LoadError.value());
                return;
            }
        };

        if record.protocol != HYBRID_PROTOCOL_ID {
            self.write_error(&format!(
                "Protocol {} for show does not match loaded protocol {}",
                record.protocol, HYBRID_PROTOCOL_ID
            ));
            self.indicators.update("show_load_state", LoadIndicator::LoadError.value());
            return;
        }

        let timeline = match normalize_display_payload(record.display_payload.clone()) {
            Ok(timeline) => timeline,
            Err(validation_fault) => {
                self.write_error(&format!("Error loading show ID {}: {}", show_id, validation_fault));
                self.indicators.update("show_load_state", LoadIndicator::LoadError.value());
                return;
            }
        };

        match self.engine.load_show(timeline, show_id) {
            LoadOutcome::Loaded => {
                self.indicators.update("show_load_state", LoadIndicator::Loaded.value());
                self.cursor.write(0.0);
                info!("📦 [KERNEL]: Show ID {} loaded and processed.", show_id);

                let is_armed = {
                    let mut gates = self.gates.lock().expect("LOCK_POISONED");
                    gates.loaded_show_name = Some(record.name.clone());
                    gates.loaded_show_id = Some(show_id);
                    gates.current_schedule = Some(record.display_payload.clone());
                    gates.is_armed
                };
                if is_armed {
                    self.indicators.update("show_run_state", RunIndicator::Armed.value());
                }
                self.persist_runtime_payload(show_id);
                self.refresh_check_errors();
            }
            LoadOutcome::Waiting => {
                info!("📦 [KERNEL]: Waiting on load success.");
                let mut gates = self.gates.lock().expect("LOCK_POISONED");
                gates.loaded_show_name = Some(record.name.clone());
                gates.loaded_show_id = Some(show_id);
                gates.current_schedule = Some(record.display_payload);
                drop(gates);
                self.persist_runtime_payload(show_id);
            }
            LoadOutcome::Failed => {
                warn!("📦 [KERNEL]: Error loading show ID {}.", show_id);
                self.indicators.update("show_load_state", LoadIndicator::LoadError.value());
            }
        }
    }

    fn persist_runtime_payload(&self, show_id: i64) {
        let runtime = self.engine.firing_array();
        if let Err(store_fault) = self.show_store.store_runtime_payload(show_id, &runtime) {
            warn!("🗄️ [SHOW_STORE]: Could not persist runtime payload: {}", store_fault);
        }
    }

    /// Refresca las compuertas previas al arranque y las combina con
    /// los fallos estructurales del motor.
    pub fn refresh_check_errors(&self) {
        let mut failures: Vec<String> = Vec::new();

        let (armed, delegated, waiting) = {
            let gates = self.gates.lock().expect("LOCK_POISONED");
            (
                gates.is_armed,
                gates.delegate_start_to_client,
                gates.waiting_for_client_start,
            )
        };

        if !armed {
            failures.push("System is not armed. Re-arm, then reload the show.".to_string());
        }
        if delegated && waiting {
            failures.push(
                "System is in delegated mode and is waiting on the green START button on the box to be pressed"
                    .to_string(),
            );
        }

        let last_received = self.link.last_received_epoch_ms();
        if last_received == 0 || wall_clock_ms() - last_received > TX_SILENCE_GATE_MS {
            failures.push("System has not heard from TX device in 10 seconds. Figure that out.".to_string());
        }

        failures.extend(self.engine.get_fc_failures());
        self.gates.lock().expect("LOCK_POISONED").fire_check_failures = failures;
    }

    /// Arranca (o reanuda) el schedule respetando delegación y
    /// compuertas previas.
    pub fn start_schedule(&self, from_delegate: bool) {
        self.indicators.update("error_state", ErrIndicator::Off.value());

        if from_delegate {
            self.clear_waiting_for_client_start();
        }

        self.refresh_check_errors();

        if !self.engine.show_loaded() {
            self.write_error("No show is loaded. Cannot start.");
            return;
        }

        if self.engine.is_running_show() {
            if self.engine.pause_requested() {
                // Reanudación: el bucle de tiro retoma al limpiar la pausa.
                info!("▶️ [KERNEL]: Resuming paused schedule.");
                self.engine.clear_pause();
                return;
            }
            self.write_error("A show is already running. Cannot start another.");
            return;
        }

        let delegated = self.gates.lock().expect("LOCK_POISONED").delegate_start_to_client;
        if delegated && !from_delegate {
            info!("🎛️ [KERNEL]: Delegating show control to client. Waiting.");
            self.indicators
                .update("show_run_state", RunIndicator::DelegateWait.value());
            self.gates.lock().expect("LOCK_POISONED").waiting_for_client_start = true;
            self.engine.mark_await_user_start();
            return;
        }

        let failures = self.gates.lock().expect("LOCK_POISONED").fire_check_failures.clone();
        if !failures.is_empty() {
            self.write_error("Cannot start schedule when there are pre-fire check failures. Fix them and reload");
            return;
        }

        info!("🎆 [KERNEL]: Running show.");
        let engine = self.engine.clone();
        let fire_thread = std::thread::Builder::new()
            .name("fire-loop".to_string())
            .spawn(move || engine.run_show())
            .expect("FATAL: fire loop thread failed to spawn");

        self.fire_threads.lock().expect("LOCK_POISONED").push(fire_thread);
    }

    /// Pausa el schedule; bajo delegación la reanudación espera al
    /// mando 'start_show' del cliente.
    pub fn pause_schedule(&self, _from_delegate: bool) {
        info!("⏸️ [KERNEL]: Pausing schedule.");
        let delegated = {
            let mut gates = self.gates.lock().expect("LOCK_POISONED");
            if gates.delegate_start_to_client {
                gates.waiting_for_client_start = true;
            }
            gates.delegate_start_to_client
        };

        if delegated {
            self.indicators
                .update("show_run_state", RunIndicator::DelegateWait.value());
        } else {
            self.indicators.update("show_run_state", RunIndicator::Paused.value());
        }

        self.engine.signal_pause();
    }

    /// Parada forzosa: señal de stop, unión de hilos de tiro y colapso
    /// del estado de secuencia.
    pub fn stop_schedule(&self, update_led: bool) {
        info!("🛑 [KERNEL]: Stopping all schedules.");
        self.engine.signal_stop();

        let handles: Vec<JoinHandle<()>> = {
            let mut fire_threads = self.fire_threads.lock().expect("LOCK_POISONED");
            fire_threads.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.join();
        }

        self.engine.mark_stopped();

        if update_led {
            self.indicators.update("show_run_state", RunIndicator::Stopped.value());
        }
    }

    /// Descarga el show vigente. Idempotente.
    pub fn unload_show(&self) {
        info!("📦 [KERNEL]: Unloading show.");
        self.indicators.update("show_load_state", LoadIndicator::Off.value());
        self.engine.unload_show();

        let mut gates = self.gates.lock().expect("LOCK_POISONED");
        gates.current_schedule = None;
        gates.loaded_show_name = None;
        gates.loaded_show_id = None;
        drop(gates);

        self.cursor.write(-1.0);
    }
}

impl BridgeEvents for Coordinator {
    fn on_line(&self, line: &str) {
        self.dispatch_dongle_line(line);
    }

    fn on_serial_ack(&self, config: SerialPortConfig) {
        info!("🔌 [KERNEL]: Bridge acked serial set: {} @ {}.", config.port, config.baud);
        let mut gates = self.gates.lock().expect("LOCK_POISONED");
        gates.serial_addr = config.port;
        gates.serial_baud = config.baud;
    }

    fn on_bridge_error(&self, message: &str) {
        self.write_error(message);
    }

    fn on_gpio(&self, snapshot: GpioSnapshot) {
        debug!("🎚️ [KERNEL]: GPIO snapshot relayed by bridge: {:?}.", snapshot);
        self.inputs.apply_snapshot(snapshot);
    }
}
// FIN DEL ARCHIVO [apps/coordinator/src/kernel.rs]
