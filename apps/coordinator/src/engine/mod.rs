// INICIO DEL ARCHIVO [apps/coordinator/src/engine/mod.rs]
/**
 * =================================================================
 * APARATO: SHOW ORCHESTRATOR (V6.4 - FIRING LINE SOVEREIGN)
 * CLASIFICACIÓN: ENGINE CORE (ESTRATO L1-APP)
 * RESPONSABILIDAD: MÁQUINA DE ESTADOS, HANDSHAKE DISTRIBUIDO Y TIRO
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. STATE AUTHORITY: Solo este aparato muta el paso de secuencia.
 *    Mientras el estado es STARTED/START_CONFIRMED, el bucle de tiro
 *    posee autoridad exclusiva sobre 'fire'/'433fire' programados.
 * 2. PACED TX: El dongle atiende una cola bloqueante; cada comando de
 *    carga se espacia por una constante única de ritmo.
 * 3. COOPERATIVE CANCEL: 'stop' es de un solo uso y domina a 'pause';
 *    toda fase que espera lo sondea en rebanadas de 100 ms.
 * 4. DUAL CLOCK: La pared alimenta 'msync' y el instante de arranque;
 *    el bucle de tiro mide con reloj monótono.
 * =================================================================
 */

pub mod clock;
pub mod resolver;
pub mod rf433;

use crate::engine::clock::{round_cursor, wall_clock_ms};
use crate::engine::resolver::{resolve_plan, ResolvedPlan};
use crate::engine::rf433::direct_rf_payload;
use crate::ops::CoordinatorOps;
use crate::state::registry::ReceiverRegistry;
use pyrolink_domain_models::config::FiringThresholds;
use pyrolink_domain_models::engine::{EngineState, ErrIndicator, RunIndicator};
use pyrolink_domain_models::receiver::ReceiverKind;
use pyrolink_domain_models::show::{ResolvedCue, ScheduledCue};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// --- CONSTANTES DE SECUENCIA ---

/// Antelación del arranque distribuido (T−25 s).
const SHOW_START_LEAD_MS: i64 = 25_000;

/// Margen de aborto: si a T−10 s falta alguien, no hay show.
const ABORT_PRE_START_MS: i64 = 10_000;

/// Ticks de espera de carga antes de reintentar a los rezagados.
const ASYNC_LOAD_RETRY_TICKS: u32 = 10;

/// Ritmo único entre comandos de carga: la cola del dongle es
/// bloqueante y cada trama espera su respuesta (~150-250 ms).
const INTER_COMMAND_PACING: Duration = Duration::from_millis(250);

/// Asentamiento tras 'startload' antes de volcar segmentos.
const STARTLOAD_SETTLE: Duration = Duration::from_millis(300);

/// Espaciado entre difusiones a nodos distintos.
const BROADCAST_PACING: Duration = Duration::from_millis(150);

/// Granularidad del busy-wait del bucle de tiro.
const FIRE_LOOP_POLL: Duration = Duration::from_millis(10);

/// Rebanada de sondeo de cancelación en fases de espera.
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Cadencia del ping de mantenimiento durante la cuenta regresiva.
const COUNTDOWN_PING: Duration = Duration::from_secs(3);

/// Iteraciones de espera de arranque entre re-difusiones.
const START_REBROADCAST_TICKS: u32 = 5;

/// Repetición nominal de las tramas RF directas.
const DEFAULT_FIRE_REPETITION: i64 = 6;

/// Umbrales de la verificación previa, releídos en cada arranque.
pub trait ThresholdsSource: Send + Sync {
    fn reload(&self) -> FiringThresholds;
}

/// Señales cooperativas de cancelación del schedule.
#[derive(Default)]
pub struct ScheduleSignals {
    stop: AtomicBool,
    pause: AtomicBool,
}

impl ScheduleSignals {
    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn signal_pause(&self) {
        self.pause.store(true, Ordering::SeqCst);
    }

    pub fn clear_pause(&self) {
        self.pause.store(false, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn pause_requested(&self) -> bool {
        self.pause.load(Ordering::SeqCst)
    }

    fn rearm(&self) {
        self.stop.store(false, Ordering::SeqCst);
        self.pause.store(false, Ordering::SeqCst);
    }
}

/// Resultado de una orden de carga.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Plan cargado por completo (sin precargas remotas pendientes).
    Loaded,
    /// Precargas remotas emitidas; esperando confirmación por estado.
    Waiting,
    /// La carga fue rechazada; los errores quedan en el motor.
    Failed,
}

struct EngineInner {
    state: EngineState,
    show_id: i64,
    show_loaded: bool,
    load_waiting: bool,
    async_retry_count: u32,
    firing_array: Vec<ResolvedCue>,
    async_load_targets: BTreeMap<String, Vec<ResolvedCue>>,
    errors: Vec<String>,
    show_start_time_ms: i64,
    time_cursor: f64,
}

impl EngineInner {
    fn new() -> EngineInner {
        EngineInner {
            state: EngineState::Standby,
            show_id: 0,
            show_loaded: false,
            load_waiting: false,
            async_retry_count: 0,
            firing_array: Vec::new(),
            async_load_targets: BTreeMap::new(),
            errors: Vec::new(),
            show_start_time_ms: 0,
            time_cursor: -1.0,
        }
    }
}

/// El orquestador de shows: autoridad única de la secuencia de tiro.
pub struct ShowOrchestrator {
    ops: Arc<dyn CoordinatorOps>,
    registry: Arc<ReceiverRegistry>,
    thresholds: Arc<dyn ThresholdsSource>,
    signals: ScheduleSignals,
    inner: Mutex<EngineInner>,
    running_show: AtomicBool,
    fire_repetition: AtomicI64,
    last_clock_sync_ms: AtomicI64,
    last_config_query_ms: AtomicI64,
    /// Antelación de arranque; el banco de pruebas la comprime.
    start_lead_ms: i64,
    abort_pre_start_ms: i64,
}

impl ShowOrchestrator {
    pub fn new(
        ops: Arc<dyn CoordinatorOps>,
        registry: Arc<ReceiverRegistry>,
        thresholds: Arc<dyn ThresholdsSource>,
    ) -> ShowOrchestrator {
        ShowOrchestrator {
            ops,
            registry,
            thresholds,
            signals: ScheduleSignals::default(),
            inner: Mutex::new(EngineInner::new()),
            running_show: AtomicBool::new(false),
            fire_repetition: AtomicI64::new(DEFAULT_FIRE_REPETITION),
            last_clock_sync_ms: AtomicI64::new(0),
            last_config_query_ms: AtomicI64::new(0),
            start_lead_ms: SHOW_START_LEAD_MS,
            abort_pre_start_ms: ABORT_PRE_START_MS,
        }
    }

    /// Comprime la ventana de arranque. Uso exclusivo del banco de
    /// pruebas; el hardware real siempre cuenta desde T−25 s.
    pub fn with_start_timing(mut self, lead_ms: i64, abort_margin_ms: i64) -> ShowOrchestrator {
        self.start_lead_ms = lead_ms;
        self.abort_pre_start_ms = abort_margin_ms;
        self
    }

    // --- ACCESORES DE ESTADO ---

    pub fn state(&self) -> EngineState {
        self.inner.lock().expect("LOCK_POISONED").state
    }

    pub fn errors(&self) -> Vec<String> {
        self.inner.lock().expect("LOCK_POISONED").errors.clone()
    }

    pub fn show_loaded(&self) -> bool {
        self.inner.lock().expect("LOCK_POISONED").show_loaded
    }

    pub fn loaded_show_id(&self) -> i64 {
        self.inner.lock().expect("LOCK_POISONED").show_id
    }

    pub fn show_start_time_ms(&self) -> i64 {
        self.inner.lock().expect("LOCK_POISONED").show_start_time_ms
    }

    pub fn time_cursor(&self) -> f64 {
        self.inner.lock().expect("LOCK_POISONED").time_cursor
    }

    pub fn firing_array(&self) -> Vec<ResolvedCue> {
        self.inner.lock().expect("LOCK_POISONED").firing_array.clone()
    }

    pub fn async_target_idents(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("LOCK_POISONED")
            .async_load_targets
            .keys()
            .cloned()
            .collect()
    }

    pub fn is_running_show(&self) -> bool {
        self.running_show.load(Ordering::SeqCst)
    }

    pub fn set_fire_repetition(&self, repeat_count: i64) {
        self.fire_repetition.store(repeat_count, Ordering::SeqCst);
    }

    pub fn fire_repetition(&self) -> i64 {
        self.fire_repetition.load(Ordering::SeqCst)
    }

    // --- SEÑALES DE CANCELACIÓN ---

    pub fn signal_stop(&self) {
        self.signals.signal_stop();
    }

    pub fn signal_pause(&self) {
        self.signals.signal_pause();
    }

    pub fn clear_pause(&self) {
        self.signals.clear_pause();
    }

    pub fn pause_requested(&self) -> bool {
        self.signals.pause_requested()
    }

    /// Marca la espera de arranque delegado.
    pub fn mark_await_user_start(&self) {
        let mut inner = self.inner.lock().expect("LOCK_POISONED");
        if inner.show_loaded {
            inner.state = EngineState::AwaitUserStart;
        }
    }

    /// Cierre forzoso: solo colapsa estados activos de secuencia.
    /// Un show cargado en reposo no pierde su condición de LOADED.
    pub fn mark_stopped(&self) {
        let mut inner = self.inner.lock().expect("LOCK_POISONED");
        if matches!(
            inner.state,
            EngineState::AwaitUserStart
                | EngineState::StartPending
                | EngineState::StartConfirmed
                | EngineState::Started
                | EngineState::Aborted
        ) {
            inner.state = EngineState::Stopped;
        }
    }

    // --- HOUSEKEEPING PERIÓDICO ---

    /// Latido periódico del motor: sincroniza el reloj del dongle y
    /// dispara el barrido de configuración cuando toca.
    pub fn bounce(&self) {
        self.sync_tx_clock();
        self.query_receiver_configs_periodic();
    }

    /// Emite 'msync' al dongle, limitado al intervalo configurado.
    fn sync_tx_clock(&self) {
        let interval_ms = self.ops.setting("dongle_sync_interval_ms").max(1);
        let now_ms = wall_clock_ms();

        if now_ms - self.last_clock_sync_ms.load(Ordering::SeqCst) >= interval_ms {
            self.last_clock_sync_ms.store(now_ms, Ordering::SeqCst);
            debug!("🕰️ [CLOCK_SYNC]: Syncing tx host clock at {}.", now_ms);
            self.ops.send_line(&format!("msync 0 {}", now_ms));
        }
    }

    /// Barrido periódico de 'getconfig' sobre los receptores en línea.
    fn query_receiver_configs_periodic(&self) {
        let interval_ms = self.ops.setting("config_query_interval_ms").max(1);
        let now_ms = wall_clock_ms();

        if now_ms - self.last_config_query_ms.load(Ordering::SeqCst) < interval_ms {
            return;
        }
        self.last_config_query_ms.store(now_ms, Ordering::SeqCst);

        for ident in self.registry.online_idents(now_ms) {
            self.ops.send_line(&format!("getconfig {} 1", ident));
            std::thread::sleep(CANCEL_POLL);
        }
    }

    /// 'setconfig' dirigido (o 'getconfig' si no hay ajustes).
    pub fn query_receiver_config(
        &self,
        ident: &str,
        fire_ms_duration: Option<i64>,
        status_interval: Option<i64>,
        tx_power: Option<i64>,
    ) {
        if fire_ms_duration.is_some() || status_interval.is_some() || tx_power.is_some() {
            let fire_ms = fire_ms_duration.unwrap_or(1_000);
            let status_ms = status_interval.unwrap_or(2_000);
            let power = tx_power.unwrap_or(3);
            self.ops
                .send_line(&format!("setconfig {} {} {} {} 1", ident, fire_ms, status_ms, power));
        } else {
            self.ops.send_line(&format!("getconfig {} 1", ident));
        }
    }

    /// Barrido manual de configuración a todo el enjambre en línea.
    pub fn query_all_receiver_configs(&self) {
        for ident in self.registry.online_idents(wall_clock_ms()) {
            self.query_receiver_config(&ident, None, None, None);
            std::thread::sleep(CANCEL_POLL);
        }
    }

    // --- FASE DE CARGA ---

    /// Carga un timeline resuelto y distribuye las precargas remotas.
    pub fn load_show(&self, timeline: Vec<ScheduledCue>, show_id: i64) -> LoadOutcome {
        {
            let mut inner = self.inner.lock().expect("LOCK_POISONED");
            inner.show_id = show_id;
            inner.errors.clear();
            inner.async_retry_count = 0;
        }

        if timeline.is_empty() {
            self.ops.write_error("Loaded a show with an empty firing array? No");
            return LoadOutcome::Failed;
        }

        let plan = match resolve_plan(&self.registry, &timeline, wall_clock_ms()) {
            Ok(plan) => plan,
            Err(load_errors) => {
                let mut inner = self.inner.lock().expect("LOCK_POISONED");
                inner.errors = load_errors;
                inner.show_loaded = false;
                return LoadOutcome::Failed;
            }
        };

        let ResolvedPlan {
            firing_array,
            async_load_targets,
        } = plan;

        let has_async_targets = !async_load_targets.is_empty();
        let targets_snapshot = async_load_targets.clone();

        {
            let mut inner = self.inner.lock().expect("LOCK_POISONED");
            inner.firing_array = firing_array;
            inner.async_load_targets = async_load_targets;

            if has_async_targets {
                inner.state = EngineState::Loading;
                inner.load_waiting = true;
                inner.show_loaded = false;
            } else {
                inner.state = EngineState::Loaded;
                inner.show_loaded = true;
                inner.time_cursor = 0.0;
            }
        }

        if has_async_targets {
            info!("📦 [LOAD]: Distributing cue tables to {} receivers.", targets_snapshot.len());
            self.send_async_load(&targets_snapshot, show_id, false);
            LoadOutcome::Waiting
        } else {
            info!("📦 [LOAD]: Show {} holds no preloaded targets. Loaded.", show_id);
            LoadOutcome::Loaded
        }
    }

    /// Vuelca las tablas de cues a los receptores inteligentes.
    ///
    /// En reintentos (`skip_startload`) no se re-emite 'startload' a un
    /// receptor que ya exhibe el show correcto: reiniciarlo en plena
    /// carga lo devolvería a cero.
    fn send_async_load(
        &self,
        targets: &BTreeMap<String, Vec<ResolvedCue>>,
        show_id: i64,
        skip_startload: bool,
    ) {
        for (ident, cues) in targets {
            let mut should_send_startload = true;
            if skip_startload {
                let already_loading = self
                    .registry
                    .status_of(ident)
                    .map(|status| status.show_id == show_id)
                    .unwrap_or(false);
                if already_loading {
                    debug!("📦 [LOAD]: Skipping startload for [{}], already on show {}.", ident, show_id);
                    should_send_startload = false;
                }
            }

            if should_send_startload {
                self.ops
                    .send_line(&format!("startload {} {} {}", ident, cues.len(), show_id));
                std::thread::sleep(STARTLOAD_SETTLE);
            }

            for pair in cues.chunks(2) {
                let first = &pair[0];
                let (second_time_ms, second_target_index) = match pair.get(1) {
                    Some(second) => (
                        (second.start_time_seconds * 1_000.0).round() as i64,
                        second.target as i64 - 1,
                    ),
                    // Relleno neutro para el segmento impar final.
                    None => (0, 0),
                };

                self.ops.send_line(&format!(
                    "showload {} {} {} {} {} 2",
                    ident,
                    (first.start_time_seconds * 1_000.0).round() as i64,
                    first.target as i64 - 1,
                    second_time_ms,
                    second_target_index,
                ));
                std::thread::sleep(INTER_COMMAND_PACING);
            }
        }
    }

    /// Receptores de precarga cuyo estado aún no satisface el predicado
    /// para el show vigente.
    fn async_targets_not_ready<F>(&self, satisfied: F) -> Vec<String>
    where
        F: Fn(&pyrolink_domain_models::receiver::ReceiverLiveStatus) -> bool,
    {
        let (show_id, target_idents): (i64, Vec<String>) = {
            let inner = self.inner.lock().expect("LOCK_POISONED");
            (inner.show_id, inner.async_load_targets.keys().cloned().collect())
        };

        target_idents
            .into_iter()
            .filter(|ident| {
                match self.registry.status_of(ident) {
                    Some(status) => status.show_id != show_id || !satisfied(&status),
                    None => true,
                }
            })
            .collect()
    }

    /// Tick de reevaluación tras cada ingesta de estado: avanza la
    /// espera de carga y reintenta a los rezagados cada N ticks.
    pub fn on_status_refresh(&self) {
        let waiting = {
            let inner = self.inner.lock().expect("LOCK_POISONED");
            inner.load_waiting && inner.show_id != 0 && !inner.show_loaded
        };
        if !waiting {
            return;
        }

        let incomplete = self.async_targets_not_ready(|status| status.load_complete);

        if incomplete.is_empty() {
            let show_id = {
                let mut inner = self.inner.lock().expect("LOCK_POISONED");
                inner.show_loaded = true;
                inner.load_waiting = false;
                inner.state = EngineState::Loaded;
                inner.time_cursor = 0.0;
                inner.show_id
            };
            info!("📦 [LOAD]: All receivers confirmed. Show {} is LOADED.", show_id);
            self.ops.signal_show_loaded(show_id);
            return;
        }

        debug!("📦 [LOAD]: Still waiting on targets: {:?}", incomplete);

        let retry_targets = {
            let mut inner = self.inner.lock().expect("LOCK_POISONED");
            inner.async_retry_count += 1;
            if inner.async_retry_count <= ASYNC_LOAD_RETRY_TICKS {
                None
            } else {
                inner.async_retry_count = 0;
                let subset: BTreeMap<String, Vec<ResolvedCue>> = inner
                    .async_load_targets
                    .iter()
                    .filter(|(ident, _)| incomplete.contains(ident))
                    .map(|(ident, cues)| (ident.clone(), cues.clone()))
                    .collect();
                Some((subset, inner.show_id))
            }
        };

        if let Some((subset, show_id)) = retry_targets {
            warn!("📦 [LOAD_RETRY]: Re-issuing cue tables to {:?}.", incomplete);
            self.send_async_load(&subset, show_id, true);
        }
    }

    // --- VERIFICACIÓN PREVIA ---

    /// Batería y continuidad de cada receptor implicado en el plan.
    pub fn run_precheck(&self) -> Vec<String> {
        let thresholds = self.thresholds.reload();
        let firing_array = self.firing_array();
        let mut precheck_errors: Vec<String> = Vec::new();

        for entry in &firing_array {
            let status = self.registry.status_of(&entry.device_id);

            match status.as_ref().map(|s| s.battery) {
                None => precheck_errors.push(format!(
                    "Precheck: No battery info for receiver '{}'.",
                    entry.device_id
                )),
                Some(battery) if battery < thresholds.min_battery_to_fire_pct => {
                    precheck_errors.push(format!(
                        "Precheck: Receiver '{}' battery at {}% (below minimum {}%).",
                        entry.device_id, battery, thresholds.min_battery_to_fire_pct
                    ));
                }
                Some(_) => {}
            }

            if thresholds.require_continuity && entry.async_fire {
                let continuity = status
                    .as_ref()
                    .map(|s| s.continuity.clone())
                    .unwrap_or_default();

                // El firmware reporta exactamente 2 máscaras de 64 bits.
                if continuity.len() != 2 {
                    precheck_errors.push(format!(
                        "Precheck: Invalid continuity data for receiver '{}'.",
                        entry.device_id
                    ));
                    continue;
                }

                let bit_index = entry.target as i64 - 1;
                let mask_index = bit_index / 64;
                let bit_position = bit_index % 64;

                if bit_index < 0 || mask_index >= continuity.len() as i64 {
                    precheck_errors.push(format!(
                        "Precheck: Cue {}:{} out of continuity range for '{}'.",
                        entry.zone, entry.target, entry.device_id
                    ));
                } else if (continuity[mask_index as usize] >> bit_position) & 1 == 0 {
                    precheck_errors.push(format!(
                        "Precheck: Receiver '{}' continuity bit missing for cue {}:{}.",
                        entry.device_id, entry.zone, entry.target
                    ));
                }
            }
        }

        let mut inner = self.inner.lock().expect("LOCK_POISONED");
        inner.errors = precheck_errors.clone();
        precheck_errors
    }

    /// Fallos estructurales previos al arranque (plan vacío).
    pub fn get_fc_failures(&self) -> Vec<String> {
        let mut inner = self.inner.lock().expect("LOCK_POISONED");
        inner.errors = if inner.firing_array.is_empty() {
            vec!["System error - No firing strategy loaded in. Check other errors.".to_string()]
        } else {
            Vec::new()
        };
        inner.errors.clone()
    }

    // --- SECUENCIA DE ARRANQUE Y TIRO ---

    /// Ejecuta la secuencia completa: precheck, handshake de arranque,
    /// cuenta regresiva y bucle de tiro. Pensada para su propio hilo.
    pub fn run_show(&self) {
        self.signals.rearm();
        self.set_state(EngineState::StartPending);
        self.ops.set_indicator("show_run_state", RunIndicator::Running.value());
        self.ops.set_indicator("show_run_state", RunIndicator::Precheck.value());

        info!("🔍 [PRECHECK]: Checking battery and continuity states.");
        if !self.run_precheck().is_empty() {
            self.ops.set_indicator("show_run_state", RunIndicator::Stopped.value());
            self.set_state(EngineState::Aborted);
            self.ops.write_error("Precheck failed. Aborting show.");
            return;
        }

        let (show_id, targets) = {
            let mut inner = self.inner.lock().expect("LOCK_POISONED");
            inner.show_start_time_ms = wall_clock_ms() + self.start_lead_ms;
            (inner.show_id, inner.async_load_targets.clone())
        };
        let show_start_time_ms = self.show_start_time_ms();

        info!("🚀 [START]: Signaling connected async nodes. T0 at {}.", show_start_time_ms);
        self.send_to_targets(
            "showstart",
            &format!(" {} 0 {}", show_start_time_ms, show_id),
            6,
            Some(&targets),
        );

        if !self.await_start_ready(show_id, show_start_time_ms, &targets) {
            return;
        }

        if self.sleep_with_cancel(Duration::from_secs(1)) {
            return;
        }
        self.set_state(EngineState::StartConfirmed);
        self.ops.set_indicator("show_run_state", RunIndicator::Countdown.value());
        info!("⏳ [COUNTDOWN]: Waiting for show start.");

        while wall_clock_ms() < show_start_time_ms {
            self.send_to_targets("play", " 0", 5, Some(&targets));
            if self.sleep_with_cancel(COUNTDOWN_PING) {
                return;
            }
        }

        self.fire_loop(&targets);
    }

    /// Espera a que todos los receptores de precarga confirmen el
    /// arranque. false: la secuencia abortó (deadline o parada).
    fn await_start_ready(
        &self,
        show_id: i64,
        show_start_time_ms: i64,
        targets: &BTreeMap<String, Vec<ResolvedCue>>,
    ) -> bool {
        let mut rebroadcast_tick: u32 = 0;

        loop {
            let not_ready = self.async_targets_not_ready(|status| status.start_ready);
            if not_ready.is_empty() {
                return true;
            }

            if wall_clock_ms() > show_start_time_ms - self.abort_pre_start_ms {
                warn!("🛑 [START_ABORT]: Deadline reached with nodes not ready: {:?}", not_ready);
                self.ops.set_indicator("error_state", ErrIndicator::Daemon.value());
                self.ops.set_indicator("show_run_state", RunIndicator::Stopped.value());
                self.set_state(EngineState::Aborted);

                let mut inner = self.inner.lock().expect("LOCK_POISONED");
                for absent_node in &not_ready {
                    inner.errors.push(format!(
                        "Start: {} did not signal start ready by {} before start. Aborting show.",
                        absent_node,
                        self.abort_pre_start_ms / 1_000
                    ));
                }
                return false;
            }

            debug!("⏳ [START]: Async nodes still pending: {:?}", not_ready);
            if self.sleep_with_cancel(Duration::from_secs(1)) {
                return false;
            }

            rebroadcast_tick += 1;
            if rebroadcast_tick > START_REBROADCAST_TICKS {
                rebroadcast_tick = 0;
                let stragglers: BTreeMap<String, Vec<ResolvedCue>> = targets
                    .iter()
                    .filter(|(ident, _)| not_ready.contains(ident))
                    .map(|(ident, cues)| (ident.clone(), cues.clone()))
                    .collect();
                info!("🔁 [START]: Re-issuing showstart to stragglers.");
                self.send_to_targets(
                    "showstart",
                    &format!(" {} 0 {}", show_start_time_ms, show_id),
                    5,
                    Some(&stragglers),
                );
            }
        }
    }

    /// Bucle de tiro: busy-wait de 10 ms por cue, cursor a 1 Hz,
    /// pausa con preservación de alineación y parada dominante.
    fn fire_loop(&self, targets: &BTreeMap<String, Vec<ResolvedCue>>) {
        self.set_state(EngineState::Started);
        self.ops.set_indicator("show_run_state", RunIndicator::Running.value());
        self.running_show.store(true, Ordering::SeqCst);
        info!("🎆 [SHOW]: Started.");

        let firing_array = self.firing_array();
        let show_clock = Instant::now();
        let mut pause_offset_seconds: f64 = 0.0;
        let mut last_cursor_write = Instant::now();

        for cue in &firing_array {
            let cue_due_at = cue.start_time_seconds;

            loop {
                let elapsed_seconds = show_clock.elapsed().as_secs_f64();
                if elapsed_seconds >= cue_due_at + pause_offset_seconds {
                    break;
                }

                if self.signals.stop_requested() {
                    self.abort_running_show();
                    return;
                }

                if self.signals.pause_requested() {
                    let pause_began = Instant::now();
                    info!("⏸️ [SHOW]: Paused.");
                    self.send_to_targets("pause", " 0", 5, Some(targets));

                    while self.signals.pause_requested() {
                        std::thread::sleep(CANCEL_POLL);
                        if self.signals.stop_requested() {
                            self.abort_running_show();
                            return;
                        }
                    }

                    pause_offset_seconds += pause_began.elapsed().as_secs_f64();
                    info!("▶️ [SHOW]: Resumed.");
                    self.ops.set_indicator("show_run_state", RunIndicator::Running.value());
                    self.send_to_targets("play", " 0", 5, Some(targets));
                }

                std::thread::sleep(FIRE_LOOP_POLL);

                let cursor = round_cursor(show_clock.elapsed().as_secs_f64() + pause_offset_seconds);
                {
                    let mut inner = self.inner.lock().expect("LOCK_POISONED");
                    inner.time_cursor = cursor;
                }
                if last_cursor_write.elapsed() >= Duration::from_secs(1) {
                    self.ops.write_time_cursor(cursor);
                    last_cursor_write = Instant::now();
                }
            }

            self.fire_item(cue);
        }

        info!("🎆 [SHOW]: All commands fired.");
        self.running_show.store(false, Ordering::SeqCst);
        self.ops.set_indicator("show_run_state", RunIndicator::Off.value());
        self.set_state(EngineState::Loaded);
    }

    /// Emisión de un cue llegado su instante. Los asíncronos ya viven
    /// en su receptor; solo la RF directa sale del coordinador.
    fn fire_item(&self, cue: &ResolvedCue) {
        debug!(
            "🔥 [FIRE]: Cue {} at {} (async_fire: {}).",
            cue.id, cue.start_time_seconds, cue.async_fire
        );

        if cue.async_fire {
            return;
        }

        let repetition = self.fire_repetition.load(Ordering::SeqCst);
        match direct_rf_payload(cue.zone, cue.target, repetition) {
            Some(payload) => self.ops.send_line(&format!("433fire {} x", payload)),
            None => self.ops.write_error(&format!(
                "Fire: cue {}:{} is outside the direct RF address domain.",
                cue.zone, cue.target
            )),
        }
    }

    /// La difusión de parada alcanza a todo el inventario en línea,
    /// no solo a los objetivos del show.
    fn abort_running_show(&self) {
        warn!("🛑 [SHOW]: Schedule stopped. Signaling nodes.");
        self.running_show.store(false, Ordering::SeqCst);
        self.set_state(EngineState::Aborted);
        self.ops.set_indicator("show_run_state", RunIndicator::Stopped.value());
        self.send_to_targets("stop", " 0", 5, None);
    }

    /// Duerme en rebanadas de 100 ms vigilando la señal de parada.
    /// true: hubo parada y la secuencia quedó abortada.
    fn sleep_with_cancel(&self, total: Duration) -> bool {
        let deadline = Instant::now() + total;
        while Instant::now() < deadline {
            if self.signals.stop_requested() {
                self.abort_running_show();
                return true;
            }
            std::thread::sleep(CANCEL_POLL);
        }
        false
    }

    // --- DISPARO MANUAL ---

    /// Resuelve y dispara una dirección bajo el modo manual.
    pub fn handle_manual_fire(&self, zone: u32, target: u32) {
        use crate::state::registry::ResolutionOutcome;

        match self.registry.resolve_zone_target(zone, target) {
            ResolutionOutcome::Unique { device_id, kind } => {
                info!("🎯 [MANUAL_FIRE]: Firing {}:{} on [{}].", zone, target, device_id);
                match kind {
                    ReceiverKind::DirectRf => {
                        let repetition = self.fire_repetition.load(Ordering::SeqCst);
                        match direct_rf_payload(zone, target, repetition) {
                            Some(payload) => self.ops.send_line(&format!("433fire {} x", payload)),
                            None => self.ops.write_error(
                                "Can not manually fire as the zone/target couldnt be parsed... did you put a letter in a zone?",
                            ),
                        }
                    }
                    ReceiverKind::SmartRelay => {
                        if self.registry.is_online(&device_id, wall_clock_ms()) {
                            self.ops
                                .send_line(&format!("fire {} {}", device_id, target.saturating_sub(1)));
                        } else {
                            self.ops.write_error("Manual fire failed as device is not connected");
                        }
                    }
                }
            }
            outcome => {
                warn!("🎯 [MANUAL_FIRE]: Cannot resolve {}:{} ({:?}).", zone, target, outcome);
            }
        }
    }

    // --- DESCARGA ---

    /// Descarga el show vigente y ordena el reinicio de los receptores
    /// en línea. Idempotente: repetirla deja el mismo estado vacío.
    pub fn unload_show(&self) {
        {
            let mut inner = self.inner.lock().expect("LOCK_POISONED");
            inner.time_cursor = -1.0;
            inner.firing_array.clear();
            inner.errors.clear();
            inner.async_load_targets.clear();
            inner.show_id = 0;
            inner.load_waiting = false;
            inner.show_loaded = false;
            inner.show_start_time_ms = 0;
            inner.state = EngineState::Standby;
        }
        self.send_to_targets("reset", " 0", 1, None);
    }

    // --- EMISIÓN A NODOS ---

    /// Difunde `{pre} {ident}{post} {repeat}` a cada receptor en línea
    /// del conjunto dado (o de todo el inventario), con ritmo entre
    /// nodos para no desbordar la cola del dongle.
    fn send_to_targets(
        &self,
        command_prefix: &str,
        command_suffix: &str,
        repeat: i64,
        targets: Option<&BTreeMap<String, Vec<ResolvedCue>>>,
    ) {
        let idents: Vec<String> = match targets {
            Some(map) => map.keys().cloned().collect(),
            None => self.registry.idents(),
        };

        let now_ms = wall_clock_ms();
        for ident in idents {
            if self.registry.is_online(&ident, now_ms) {
                self.ops
                    .send_line(&format!("{} {}{} {}", command_prefix, ident, command_suffix, repeat));
                std::thread::sleep(BROADCAST_PACING);
            } else {
                debug!("📡 [BROADCAST]: Skipping [{}], not connected.", ident);
            }
        }
    }

    fn set_state(&self, state: EngineState) {
        let mut inner = self.inner.lock().expect("LOCK_POISONED");
        inner.state = state;
    }
}
// FIN DEL ARCHIVO [apps/coordinator/src/engine/mod.rs]
