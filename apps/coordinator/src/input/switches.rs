// INICIO DEL ARCHIVO [apps/coordinator/src/input/switches.rs]
/**
 * =================================================================
 * APARATO: SWITCH MONITOR (V6.2 - OPERATOR GATE)
 * CLASIFICACIÓN: APPLICATION INPUT (ESTRATO L1-APP)
 * RESPONSABILIDAD: FLANCOS DE ARMADO, ARRANQUE Y FUEGO MANUAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. EDGE DISCIPLINE: Tres entradas con detección de flanco a 100 ms.
 *    Activo = LOW (entradas con pull-up); los valores llegan del GPIO
 *    real en campo o del relevo 'gpio' del puente en banco.
 * 2. SAFE DEFAULTS: Todas las entradas nacen en HIGH (inactivas); el
 *    sistema jamás se arma solo por ausencia de hardware.
 * 3. GATE AUTHORITY: Cualquier cambio del interruptor de arranque con
 *    el sistema desarmado es un error de operador, no una orden.
 * =================================================================
 */

use crate::kernel::Coordinator;
use pyrolink_domain_models::engine::{ErrIndicator, RunIndicator};
use pyrolink_domain_models::frames::GpioSnapshot;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const HIGH: u8 = 1;
pub const LOW: u8 = 0;

/// Cadencia de sondeo de los interruptores.
pub const SWITCH_POLL_PERIOD: Duration = Duration::from_millis(100);

/// Estado instantáneo de los tres interruptores físicos.
pub struct SwitchInputs {
    arm: AtomicU8,
    start_stop: AtomicU8,
    man_fire: AtomicU8,
}

impl Default for SwitchInputs {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchInputs {
    pub fn new() -> SwitchInputs {
        SwitchInputs {
            arm: AtomicU8::new(HIGH),
            start_stop: AtomicU8::new(HIGH),
            man_fire: AtomicU8::new(HIGH),
        }
    }

    /// Ingesta de una instantánea relevada por el puente.
    pub fn apply_snapshot(&self, snapshot: GpioSnapshot) {
        self.arm.store(snapshot.armed, Ordering::SeqCst);
        self.start_stop.store(snapshot.start_stop, Ordering::SeqCst);
        self.man_fire.store(snapshot.man_fire, Ordering::SeqCst);
    }

    pub fn arm(&self) -> u8 {
        self.arm.load(Ordering::SeqCst)
    }

    pub fn start_stop(&self) -> u8 {
        self.start_stop.load(Ordering::SeqCst)
    }

    pub fn man_fire(&self) -> u8 {
        self.man_fire.load(Ordering::SeqCst)
    }
}

/// Memoria de flancos del monitor.
pub struct SwitchEdgeTracker {
    last_switch_state: u8,
    last_arming_state: u8,
    last_man_fire_state: u8,
}

impl Default for SwitchEdgeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchEdgeTracker {
    pub fn new() -> SwitchEdgeTracker {
        SwitchEdgeTracker {
            last_switch_state: HIGH,
            last_arming_state: HIGH,
            last_man_fire_state: HIGH,
        }
    }

    /// Un tick del monitor: lee, detecta flancos y conduce el motor.
    pub fn tick(&mut self, coordinator: &Coordinator) {
        coordinator.load_webact_state();

        let inputs = coordinator.inputs();
        let switch_state = inputs.start_stop();
        let arming_state = inputs.arm();
        let man_fire_state = inputs.man_fire();

        let engine = coordinator.engine();

        // --- INTERRUPTOR DE FUEGO MANUAL ---
        if self.last_man_fire_state == LOW && man_fire_state == HIGH {
            info!("🎚️ [OPERATOR]: Manual fire disabled.");
            let indicator = if engine.show_loaded() {
                RunIndicator::Stopped
            } else {
                RunIndicator::Off
            };
            coordinator.indicators().update("show_run_state", indicator.value());
            coordinator.set_manual_fire_enabled(false);
        } else if self.last_man_fire_state == HIGH && man_fire_state == LOW {
            info!("🎚️ [OPERATOR]: Manual fire enabled. Schedule stopped.");
            coordinator.stop_schedule(false);
            coordinator.set_manual_fire_enabled(true);
            coordinator
                .indicators()
                .update("show_run_state", RunIndicator::ManualFire.value());
        }

        // --- INTERRUPTOR DE ARMADO ---
        if self.last_arming_state == LOW && arming_state == HIGH {
            info!("🎚️ [OPERATOR]: Arming switch deactivated. Disarming the system.");
            coordinator.stop_schedule(true);
            coordinator.set_armed(false);
        } else if self.last_arming_state == HIGH && arming_state == LOW {
            info!("🎚️ [OPERATOR]: Arming switch activated. System is armed.");
            if engine.show_loaded() {
                coordinator
                    .indicators()
                    .update("show_run_state", RunIndicator::Armed.value());
            }
            coordinator.set_armed(true);
        }

        // --- INTERRUPTOR DE ARRANQUE/PARADA ---
        if arming_state == LOW {
            if self.last_switch_state == HIGH && switch_state == LOW {
                info!("🎚️ [OPERATOR]: Start/stop switch engaged.");
                if engine.show_loaded() {
                    if !coordinator.manual_fire_enabled() {
                        coordinator.start_schedule(false);
                    } else {
                        coordinator.write_error(
                            "Cannot start a show when manual fire is enabled. Hit Stop, disengage manual fire, then try again.",
                        );
                        coordinator
                            .indicators()
                            .update("error_state", ErrIndicator::Daemon.value());
                    }
                } else if coordinator.manual_fire_enabled() {
                    coordinator
                        .indicators()
                        .update("show_run_state", RunIndicator::ManualFire.value());
                } else {
                    coordinator
                        .write_error("Tried to start show but no show loaded and manual fire is off.");
                }
                coordinator.set_start_sw_active(true);
            } else if self.last_switch_state == LOW && switch_state == HIGH {
                info!("🎚️ [OPERATOR]: Start/stop switch released.");
                engine.bounce();
                coordinator.clear_waiting_for_client_start();

                if engine.is_running_show() {
                    coordinator.pause_schedule(false);
                } else if !engine.show_loaded() {
                    info!("🎚️ [OPERATOR]: Stopped, but no show loaded. Nothing to do.");
                    coordinator
                        .indicators()
                        .update("show_run_state", RunIndicator::Off.value());
                } else {
                    coordinator.stop_schedule(false);
                    coordinator
                        .indicators()
                        .update("show_run_state", RunIndicator::Armed.value());
                }
                coordinator.set_start_sw_active(false);
            }
        } else if self.last_switch_state != switch_state {
            warn!("🎚️ [OPERATOR]: Start switch toggled while disarmed.");
            coordinator
                .write_error("Start/Stop switch changed while system was not armed. This is not allowed.");
        }

        self.last_switch_state = switch_state;
        self.last_arming_state = arming_state;
        self.last_man_fire_state = man_fire_state;

        coordinator.update_state_file();
    }
}

/// Bucle del hilo del monitor de interruptores.
pub fn run_switch_monitor(coordinator: &Arc<Coordinator>) {
    info!("🎚️ [OPERATOR]: Switch monitor initiated.");
    let mut tracker = SwitchEdgeTracker::new();

    while !coordinator.shutdown_requested() {
        tracker.tick(coordinator);
        std::thread::sleep(SWITCH_POLL_PERIOD);
    }

    info!("🎚️ [OPERATOR]: Switch monitor terminated by shutdown token.");
}
// FIN DEL ARCHIVO [apps/coordinator/src/input/switches.rs]
