/**
 * =================================================================
 * APARATO: LINK LOOPBACK TEST (V1.0 - SOBERANO)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el enlace TCP contra un puente simulado:
 *           reconfiguración serie, escritura terminada en '\n' y
 *           ruteo de sobres de control vs tráfico del dongle.
 * =================================================================
 */

use pyrolink_domain_models::frames::{GpioSnapshot, SerialPortConfig};
use pyrolink_infra_transport::{BridgeEvents, BridgeLink, LinkSignalSink};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct RecordingEvents {
    lines: Mutex<Vec<String>>,
    serial_acks: Mutex<Vec<SerialPortConfig>>,
    bridge_errors: Mutex<Vec<String>>,
    gpio_snapshots: Mutex<Vec<GpioSnapshot>>,
}

impl BridgeEvents for RecordingEvents {
    fn on_line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
    fn on_serial_ack(&self, config: SerialPortConfig) {
        self.serial_acks.lock().unwrap().push(config);
    }
    fn on_bridge_error(&self, message: &str) {
        self.bridge_errors.lock().unwrap().push(message.to_string());
    }
    fn on_gpio(&self, snapshot: GpioSnapshot) {
        self.gpio_snapshots.lock().unwrap().push(snapshot);
    }
}

#[derive(Default)]
struct RecordingSignals {
    device_errors: Mutex<Vec<String>>,
    connected: AtomicBool,
}

impl LinkSignalSink for RecordingSignals {
    fn on_transmitting(&self) {}
    fn on_connected(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }
    fn on_device_error(&self, detail: &str) {
        self.device_errors.lock().unwrap().push(detail.to_string());
    }
}

fn wait_until(deadline: Duration, mut probe: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if probe() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn certify_link_against_simulated_bridge() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("puerto efímero");
    let endpoint = listener.local_addr().unwrap().to_string();

    let link = Arc::new(BridgeLink::new(endpoint));
    let events = Arc::new(RecordingEvents::default());
    let signals = Arc::new(RecordingSignals::default());
    let shutdown = Arc::new(AtomicBool::new(false));

    // --- PUENTE SIMULADO ---
    let bridge_thread = std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("conexión del coordinador");
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut writer = stream;

        // 1. Orden de reconfiguración serie, una línea JSON.
        let mut reconfigure_line = String::new();
        reader.read_line(&mut reconfigure_line).unwrap();
        let order: serde_json::Value = serde_json::from_str(reconfigure_line.trim()).unwrap();
        assert_eq!(order.get("type").and_then(|v| v.as_str()), Some("config_serial"));
        assert_eq!(order.get("baud").and_then(|v| v.as_u64()), Some(115_200));

        // 2. Acuse del puente + tráfico mixto hacia el coordinador.
        writer
            .write_all(
                concat!(
                    r#"{"tcpstatus":true,"serial_config":{"port":"/dev/ttyACM0","baud":115200}}"#,
                    "\n",
                    r#"{"gpio":1,"armed":0,"start_stop":1,"man_fire":1}"#,
                    "\n",
                    r#"{"type":"status","t":1,"r":[]}"#,
                    "\n",
                    "OK msync\n",
                )
                .as_bytes(),
            )
            .unwrap();

        // 3. Una línea emitida por el coordinador.
        let mut outbound_line = String::new();
        reader.read_line(&mut outbound_line).unwrap();
        outbound_line
    });

    link.connect(&SerialPortConfig {
        port: "/dev/ttyACM0".to_string(),
        baud: 115_200,
    })
    .expect("enlace nominal");
    assert!(link.is_connected());

    let reader_link = link.clone();
    let reader_shutdown = shutdown.clone();
    let reader_events = events.clone();
    let reader_signals = signals.clone();
    let reader_thread = std::thread::spawn(move || {
        reader_link.run_reader(&reader_shutdown, &*reader_events, &*reader_signals);
    });

    // El acuse y el gpio se consumen en transporte; el estado y la
    // línea plana llegan al consumidor.
    assert!(wait_until(Duration::from_secs(5), || {
        events.lines.lock().unwrap().len() >= 2
    }));
    assert_eq!(events.serial_acks.lock().unwrap().len(), 1);
    assert_eq!(events.gpio_snapshots.lock().unwrap()[0].armed, 0);
    assert!(signals.connected.load(Ordering::SeqCst));
    {
        let lines = events.lines.lock().unwrap();
        assert!(lines.contains(&r#"{"type":"status","t":1,"r":[]}"#.to_string()));
        assert!(lines.contains(&"OK msync".to_string()));
    }

    // Escritura serializada, terminada en '\n'.
    link.send_line("msync 0 123").expect("escritura nominal");
    assert!(link.last_sent_epoch_ms() > 0);

    let echoed = bridge_thread.join().expect("puente simulado íntegro");
    assert_eq!(echoed, "msync 0 123\n");

    shutdown.store(true, Ordering::SeqCst);
    reader_thread.join().expect("lector termina por token");
    println!("✅ LINK_LOOPBACK: Bridge uplink certified.");
}

#[test]
fn certify_send_without_link_is_rejected() {
    let link = BridgeLink::new("127.0.0.1:1".to_string());
    assert!(link.send_line("msync 0 1").is_err());
    assert!(!link.is_connected());
}
