// [libs/domain/models/src/frames.rs]
/*!
 * =================================================================
 * APARATO: DONGLE FRAME SCHEMAS (V4.3 - COMPACT ARRAY PROTOCOL)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: INTERPRETACIÓN DE TRAMAS JSON COMPACTAS
 *
 * VISION HIPER-HOLÍSTICA:
 * El dongle comprime cada reporte en arreglos posicionales para
 * minimizar el tiempo en aire. Este aparato traduce esa compresión a
 * tipos nominales sin perder tolerancia: una fila corta se descarta,
 * un campo ausente hereda el valor previo en el registro.
 *
 * Esquema 'status':
 *   {"type":"status","t":<ms>,"r":[[ident,node,batt,showId,loadOk,
 *     startOk,lastMsg,lat,successPct,[cont0,cont1]], ...]}
 * Esquema 'config':
 *   {"type":"config","i":<ident>,"d":[numBoards,boardVer,fwVer,
 *     secondsOnline,txPower,fireMs,statusMs,unsolCt,connTimeoutCt]}
 * =================================================================
 */

use crate::errors::DecodeError;
use crate::receiver::ReceiverConfigBlock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trama entrante ya clasificada por su campo 'type'.
#[derive(Debug, Clone)]
pub enum InboundFrame {
    Status(StatusFrame),
    Config(ConfigFrame),
    /// Eco de depuración de comandos del dongle; se archiva, no se consume.
    CommandDebug(Value),
}

/// Reporte agregado de estado del enjambre, estampado por el dongle.
#[derive(Debug, Clone)]
pub struct StatusFrame {
    /// Reloj del dongle en el instante de emisión (epoch ms del dongle).
    pub dongle_timestamp_ms: i64,
    pub rows: Vec<StatusRow>,
}

/// Fila posicional de estado para un receptor concreto.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub ident: String,
    pub node: u32,
    pub battery: i64,
    pub show_id: i64,
    pub load_complete: bool,
    pub start_ready: bool,
    pub last_msg_time_ms: i64,
    pub latency_ms: i64,
    pub success_percent: i64,
    pub continuity: Vec<u64>,
}

impl StatusRow {
    /// Interpreta una fila posicional. Filas con menos de 10 posiciones
    /// se descartan (el firmware viejo emitía reportes truncados).
    pub fn from_value(row: &Value) -> Option<StatusRow> {
        let cells = row.as_array()?;
        if cells.len() < 10 {
            return None;
        }

        Some(StatusRow {
            ident: cells[0].as_str()?.to_string(),
            node: cells[1].as_u64().unwrap_or(0) as u32,
            battery: cells[2].as_i64().unwrap_or(0),
            show_id: cells[3].as_i64().unwrap_or(0),
            load_complete: cells[4].as_i64().unwrap_or(0) != 0,
            start_ready: cells[5].as_i64().unwrap_or(0) != 0,
            last_msg_time_ms: cells[6].as_i64().unwrap_or(0),
            latency_ms: cells[7].as_i64().unwrap_or(0),
            success_percent: cells[8].as_i64().unwrap_or(0),
            continuity: cells[9]
                .as_array()
                .map(|masks| masks.iter().filter_map(Value::as_u64).collect())
                .unwrap_or_default(),
        })
    }
}

/// Bloque de configuración reportado por un receptor concreto.
#[derive(Debug, Clone)]
pub struct ConfigFrame {
    pub ident: String,
    pub block: ReceiverConfigBlock,
}

/// Clasifica una línea JSON del dongle en su trama nominal.
///
/// # Errors:
/// - `MalformedJson` si la línea no es JSON.
/// - `UnknownFrameType` para vocabulario desconocido.
/// - `MissingField` si falta un campo estructural ('i' en config).
pub fn parse_inbound(line: &str) -> Result<InboundFrame, DecodeError> {
    let value: Value = serde_json::from_str(line)?;

    // El firmware clásico omitía 'type' en reportes de estado.
    let frame_type = value.get("type").and_then(Value::as_str).unwrap_or("status");

    match frame_type {
        "status" => {
            let dongle_timestamp_ms = value.get("t").and_then(Value::as_i64).unwrap_or(0);
            let rows = value
                .get("r")
                .and_then(Value::as_array)
                .map(|rows| rows.iter().filter_map(StatusRow::from_value).collect())
                .unwrap_or_default();

            Ok(InboundFrame::Status(StatusFrame {
                dongle_timestamp_ms,
                rows,
            }))
        }
        "config" => {
            let ident = value
                .get("i")
                .and_then(Value::as_str)
                .ok_or(DecodeError::MissingField("i"))?
                .to_string();

            let cells = value.get("d").and_then(Value::as_array).cloned().unwrap_or_default();
            let cell = |idx: usize, fallback: i64| -> i64 {
                cells.get(idx).and_then(Value::as_i64).unwrap_or(fallback)
            };

            Ok(InboundFrame::Config(ConfigFrame {
                ident,
                block: ReceiverConfigBlock {
                    num_boards: cell(0, 0),
                    board_version: cell(1, 0),
                    fw_version: cell(2, 0),
                    seconds_online: cell(3, 0),
                    tx_power: cell(4, 3),
                    fire_ms_duration: cell(5, 1000),
                    status_interval_ms: cell(6, 2000),
                    unsolicited_status_count: cell(7, 0),
                    conn_timeout_count: cell(8, 0),
                },
            }))
        }
        "cmd" => Ok(InboundFrame::CommandDebug(value)),
        other => Err(DecodeError::UnknownFrameType(other.to_string())),
    }
}

// --- ESTRATO DE MENSAJERÍA DEL PUENTE TCP-SERIAL ---

/// Coordenadas físicas del puerto serie remoto.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialPortConfig {
    pub port: String,
    pub baud: u32,
}

/// Instantánea de los tres interruptores físicos relevada por el puente
/// en despliegues de banco (sin GPIO real).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioSnapshot {
    pub armed: u8,
    pub start_stop: u8,
    pub man_fire: u8,
}

/// Mensajes de control que el puente dirige al coordinador. Se consumen
/// en la capa de transporte y jamás alcanzan el decodificador de protocolo.
#[derive(Debug, Clone)]
pub enum BridgeEnvelope {
    /// Acuse de reconfiguración del puerto serie remoto.
    SerialAck {
        ok: bool,
        error: Option<String>,
        serial_config: Option<SerialPortConfig>,
    },
    /// Relevo de la posición de los interruptores físicos.
    Gpio(GpioSnapshot),
}

/// Detecta y clasifica un sobre de control del puente. `None` significa
/// que el valor no es tráfico del puente y debe seguir su curso normal.
pub fn parse_bridge_envelope(value: &Value) -> Option<BridgeEnvelope> {
    if let Some(tcp_status) = value.get("tcpstatus") {
        return Some(BridgeEnvelope::SerialAck {
            ok: tcp_status.as_bool().unwrap_or(false),
            error: value.get("error").and_then(Value::as_str).map(String::from),
            serial_config: value
                .get("serial_config")
                .and_then(|cfg| serde_json::from_value(cfg.clone()).ok()),
        });
    }

    if value.get("gpio").is_some() {
        let read_pin = |key: &str| -> u8 { value.get(key).and_then(Value::as_i64).unwrap_or(1) as u8 };
        return Some(BridgeEnvelope::Gpio(GpioSnapshot {
            armed: read_pin("armed"),
            start_stop: read_pin("start_stop"),
            man_fire: read_pin("man_fire"),
        }));
    }

    None
}
