// [libs/domain/models/src/engine.rs]
/*!
 * =================================================================
 * APARATO: ENGINE STATE VOCABULARY (V4.0 - SEQUENCE STEPS)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: ESTADOS DEL ORQUESTADOR E INDICADORES DE PANEL
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Pasos de la secuencia de arranque del orquestador de shows.
/// Solo el motor de protocolo muta este estado.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngineState {
    Standby,
    Loading,
    Loaded,
    AwaitUserStart,
    StartPending,
    StartConfirmed,
    Started,
    Aborted,
    Stopped,
}

impl EngineState {
    /// Nombre canónico exportado en el snapshot de estado.
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Standby => "STANDBY",
            EngineState::Loading => "LOADING",
            EngineState::Loaded => "LOADED",
            EngineState::AwaitUserStart => "AWAIT_USER_START",
            EngineState::StartPending => "START_PENDING",
            EngineState::StartConfirmed => "START_CONFIRMED",
            EngineState::Started => "STARTED",
            EngineState::Aborted => "ABORTED",
            EngineState::Stopped => "STOPPED",
        }
    }
}

// --- VOCABULARIO DE INDICADORES DEL PANEL LED ---
// Los valores enteros forman parte del contrato con el driver de LEDs.

/// Indicador de marcha del show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunIndicator {
    Off = 0,
    Running = 1,
    ManualFire = 2,
    Stopped = 3,
    Paused = 4,
    Armed = 5,
    DelegateWait = 6,
    Precheck = 7,
    Countdown = 8,
}

/// Indicador de carga de show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadIndicator {
    Off = 0,
    Loaded = 1,
    Loading = 2,
    LoadError = 3,
}

/// Indicador de salud del enlace transmisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxIndicator {
    Off = 0,
    Transmitting = 1,
    Connected = 2,
    DeviceError = 3,
}

/// Indicador de error del daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrIndicator {
    Off = 0,
    Daemon = 1,
    RfFrontend = 2,
    Socket = 3,
}

impl RunIndicator {
    pub fn value(self) -> i64 {
        self as i64
    }
}

impl LoadIndicator {
    pub fn value(self) -> i64 {
        self as i64
    }
}

impl TxIndicator {
    pub fn value(self) -> i64 {
        self as i64
    }
}

impl ErrIndicator {
    pub fn value(self) -> i64 {
        self as i64
    }
}
