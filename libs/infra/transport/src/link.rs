// [libs/infra/transport/src/link.rs]
/*!
 * =================================================================
 * APARATO: BRIDGE UPLINK (V5.2 - SERIALIZED TX)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: SOCKET HACIA EL PUENTE, LECTOR Y ESCRITOR SERIALIZADO
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. DUAL DUTY: Reconfigura el puerto físico remoto al conectar
 *    ('config_serial') y luego transporta bytes crudos en ambos sentidos.
 * 2. TX DISCIPLINE: Todas las escrituras quedan serializadas por un
 *    mutex; cada payload sale terminado en '\n' y codificado UTF-8.
 * 3. FAULT ACCOUNTING: Fallos de escritura consecutivos alimentan un
 *    contador; superado el umbral se eleva la señal DEVICE_ERROR.
 * 4. ENVELOPE FILTERING: Los sobres 'tcpstatus' y 'gpio' del puente se
 *    consumen aquí y jamás alcanzan el decodificador de protocolo.
 * =================================================================
 */

use crate::assembler::{AssemblerOutcome, FrameAssembler};
use crate::errors::TransportError;
use pyrolink_domain_models::frames::{parse_bridge_envelope, BridgeEnvelope, GpioSnapshot, SerialPortConfig};
use serde_json::json;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// Ventana de sondeo del lector: el hilo jamás bloquea más que esto.
pub const READ_POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// Fallos de escritura consecutivos tolerados antes de declarar avería.
const BAD_TX_THRESHOLD: u32 = 10;

/// Pausa ante errores duros de lectura para no ciclar en caliente.
const READ_FAULT_BACKOFF: Duration = Duration::from_millis(250);

/// Señales de salud del enlace hacia el panel de indicadores.
pub trait LinkSignalSink: Send + Sync {
    fn on_transmitting(&self);
    fn on_connected(&self);
    fn on_device_error(&self, detail: &str);
}

/// Consumidor de tráfico entrante ya desenmarcado.
pub trait BridgeEvents: Send + Sync {
    /// Línea completa que no es tráfico de control del puente.
    fn on_line(&self, line: &str);
    /// El puente confirmó la reconfiguración del puerto físico.
    fn on_serial_ack(&self, config: SerialPortConfig);
    /// El puente reportó un fallo propio.
    fn on_bridge_error(&self, message: &str);
    /// Instantánea de interruptores relevada por el puente.
    fn on_gpio(&self, snapshot: GpioSnapshot);
}

/// Enlace TCP hacia el puente serie que habla con el dongle RF.
pub struct BridgeLink {
    bridge_endpoint: String,
    /// Lado de escritura del socket. El mutex ES el serializador de TX.
    write_stream: Mutex<Option<TcpStream>>,
    consecutive_bad_tx: AtomicU32,
    connected: AtomicBool,
    last_sent_epoch_ms: AtomicI64,
    last_received_epoch_ms: AtomicI64,
}

fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

impl BridgeLink {
    pub fn new(bridge_endpoint: String) -> BridgeLink {
        BridgeLink {
            bridge_endpoint,
            write_stream: Mutex::new(None),
            consecutive_bad_tx: AtomicU32::new(0),
            connected: AtomicBool::new(false),
            last_sent_epoch_ms: AtomicI64::new(0),
            last_received_epoch_ms: AtomicI64::new(0),
        }
    }

    /// Abre (o reabre) el socket y ordena al puente reconfigurar el
    /// puerto físico con las coordenadas entregadas.
    ///
    /// # Errors:
    /// `ConnectFailed` si el puente no responde; `WriteFailed` si la
    /// orden de reconfiguración no pudo salir.
    pub fn connect(&self, serial: &SerialPortConfig) -> Result<(), TransportError> {
        info!("🔌 [UPLINK]: Opening bridge socket at [{}]...", self.bridge_endpoint);

        let stream = TcpStream::connect(&self.bridge_endpoint).map_err(TransportError::ConnectFailed)?;
        stream
            .set_read_timeout(Some(READ_POLL_TIMEOUT))
            .map_err(TransportError::ConnectFailed)?;

        {
            let mut guard = self.write_stream.lock().expect("LOCK_POISONED");
            *guard = Some(stream);
        }
        self.connected.store(true, Ordering::SeqCst);

        let reconfigure_order = json!({
            "type": "config_serial",
            "port": serial.port,
            "baud": serial.baud,
        });
        self.send_line(&reconfigure_order.to_string())?;

        info!(
            "🔌 [UPLINK]: Bridge ordered to open [{}] at {} baud.",
            serial.port, serial.baud
        );
        Ok(())
    }

    /// true si hay un socket establecido hacia el puente.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Epoch ms de la última transmisión exitosa (0 = nunca).
    pub fn last_sent_epoch_ms(&self) -> i64 {
        self.last_sent_epoch_ms.load(Ordering::SeqCst)
    }

    /// Epoch ms de la última recepción (0 = nunca).
    pub fn last_received_epoch_ms(&self) -> i64 {
        self.last_received_epoch_ms.load(Ordering::SeqCst)
    }

    /// Transmite una línea al dongle. La terminación '\n' se añade aquí;
    /// el mutex de escritura garantiza el orden de emisión por receptor.
    ///
    /// # Errors:
    /// `NotConnected` sin enlace; `WriteFailed` ante rechazo del socket.
    pub fn send_line(&self, payload: &str) -> Result<(), TransportError> {
        let guard = self.write_stream.lock().expect("LOCK_POISONED");
        let Some(stream) = guard.as_ref() else {
            return Err(TransportError::NotConnected);
        };

        let mut wire_bytes = payload.as_bytes().to_vec();
        wire_bytes.push(b'\n');

        match (&*stream).write_all(&wire_bytes) {
            Ok(()) => {
                self.consecutive_bad_tx.store(0, Ordering::SeqCst);
                self.last_sent_epoch_ms.store(wall_clock_ms(), Ordering::SeqCst);
                debug!("📤 [UPLINK_TX]: '{}'", payload);
                Ok(())
            }
            Err(io_fault) => {
                let fault_count = self.consecutive_bad_tx.fetch_add(1, Ordering::SeqCst) + 1;
                warn!("⚠️ [UPLINK_TX_FAULT]: #{} -> {}", fault_count, io_fault);
                Err(TransportError::WriteFailed(io_fault))
            }
        }
    }

    /// Transmite registrando el fallo en la señal de salud en lugar de
    /// propagarlo. Es la vía de los bucles de show: un rechazo puntual
    /// no detiene la secuencia, los receptores asíncronos continúan.
    pub fn send_line_signalled(&self, payload: &str, signals: &dyn LinkSignalSink) {
        match self.send_line(payload) {
            Ok(()) => signals.on_transmitting(),
            Err(fault) => {
                if self.consecutive_bad_tx.load(Ordering::SeqCst) > BAD_TX_THRESHOLD {
                    signals.on_device_error(&fault.to_string());
                }
            }
        }
    }

    /// Bucle del hilo lector: sondea el socket con ventana de 500 ms,
    /// parte el flujo en líneas, reensambla fragmentos JSON y despacha.
    /// Sale cuando `shutdown` se activa.
    pub fn run_reader(
        &self,
        shutdown: &AtomicBool,
        events: &dyn BridgeEvents,
        signals: &dyn LinkSignalSink,
    ) {
        info!("📡 [UPLINK_READER]: Inbound loop initiated.");
        let mut assembler = FrameAssembler::new();
        let mut chunk = [0u8; 4096];

        while !shutdown.load(Ordering::SeqCst) {
            if let Some(evicted) = assembler.evict_stale(Instant::now()) {
                debug!("🗑️ [UPLINK_STALE]: Dropping aged fragment: '{:.100}'", evicted);
            }

            let reader_handle = {
                let guard = self.write_stream.lock().expect("LOCK_POISONED");
                guard.as_ref().and_then(|stream| stream.try_clone().ok())
            };

            let Some(mut reader) = reader_handle else {
                std::thread::sleep(READ_POLL_TIMEOUT);
                continue;
            };

            match reader.read(&mut chunk) {
                Ok(0) => {
                    // Socket cerrado por el puente; se espera reconexión.
                    self.connected.store(false, Ordering::SeqCst);
                    warn!("⚠️ [UPLINK_READER]: Bridge closed the socket.");
                    std::thread::sleep(READ_FAULT_BACKOFF);
                }
                Ok(byte_count) => {
                    self.last_received_epoch_ms.store(wall_clock_ms(), Ordering::SeqCst);
                    let burst = String::from_utf8_lossy(&chunk[..byte_count]).into_owned();
                    for raw_line in burst.split('\n') {
                        let line = raw_line.trim_end_matches('\r');
                        if !line.is_empty() {
                            self.process_line(line, &mut assembler, events, signals);
                        }
                    }
                }
                Err(io_fault)
                    if io_fault.kind() == std::io::ErrorKind::WouldBlock
                        || io_fault.kind() == std::io::ErrorKind::TimedOut =>
                {
                    // Ventana de sondeo vencida sin tráfico. Nominal.
                }
                Err(io_fault) => {
                    let fault_count = self.consecutive_bad_tx.fetch_add(1, Ordering::SeqCst) + 1;
                    error!("❌ [UPLINK_READER_FAULT]: {}", io_fault);
                    if fault_count > BAD_TX_THRESHOLD {
                        signals.on_device_error(&io_fault.to_string());
                    }
                    std::thread::sleep(READ_FAULT_BACKOFF);
                }
            }
        }

        info!("📡 [UPLINK_READER]: Inbound loop terminated by shutdown token.");
    }

    fn process_line(
        &self,
        raw_line: &str,
        assembler: &mut FrameAssembler,
        events: &dyn BridgeEvents,
        signals: &dyn LinkSignalSink,
    ) {
        let candidate = match assembler.push(raw_line, Instant::now()) {
            AssemblerOutcome::Buffered => return,
            AssemblerOutcome::Ready(line) => line,
        };

        if !candidate.starts_with('{') {
            // Tráfico plano del dongle: pasa sin interpretación.
            events.on_line(&candidate);
            return;
        }

        let parsed: Result<serde_json::Value, _> = serde_json::from_str(&candidate);
        let value = match parsed {
            Ok(value) => value,
            Err(parse_fault) => {
                if !candidate.trim_end().ends_with('}') {
                    // Trama aún incompleta: el resto llega en la próxima ráfaga.
                    assembler.rebuffer(candidate, Instant::now());
                } else {
                    warn!("⚠️ [UPLINK_FRAME]: Malformed JSON discarded: {}", parse_fault);
                    assembler.clear();
                }
                return;
            }
        };

        match parse_bridge_envelope(&value) {
            Some(BridgeEnvelope::SerialAck { ok, error, serial_config }) => {
                if let Some(bridge_fault) = error {
                    events.on_bridge_error(&bridge_fault);
                }
                if ok {
                    signals.on_connected();
                    if let Some(config) = serial_config {
                        events.on_serial_ack(config);
                    }
                }
            }
            Some(BridgeEnvelope::Gpio(snapshot)) => events.on_gpio(snapshot),
            None => events.on_line(&candidate),
        }
    }
}
