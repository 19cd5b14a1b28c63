use motobus::{VehicleData, VehicleDataListener};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time;
use tracing::{debug, error, info, warn};

const TCP_PORT: u16 = 8086;
const SNAPSHOT_BROADCAST_BUFFER_SIZE: usize = 256;
const TICK_PERIOD_MS: u64 = 250;
const DUMP_EVERY_TICKS: u64 = 40;

/// Stands in for the UI/logger collaborators: logs notable changes through
/// tracing instead of rendering them.
struct TraceListener;

impl VehicleDataListener for TraceListener {
    fn on_rpm_changed(&self, rpm: u32) {
        debug!(rpm, "rpm changed");
    }

    fn on_speed_metric_changed(&self, kmh: u32) {
        debug!(kmh, "speed changed");
    }

    fn on_gear_changed(&self, gear: u8) {
        info!(gear, "gear change");
    }

    fn on_check_engine_changed(&self, on: bool) {
        if on {
            warn!("check engine lamp lit");
        } else {
            info!("check engine lamp cleared");
        }
    }

    fn on_odometer_metric_changed(&self, km_x100: u32) {
        debug!(km_x100, "trip odometer changed");
    }

    fn on_bad_frame(&self, frame: &[u8]) {
        warn!(?frame, "corrupted frame on bus");
    }

    fn on_unknown_frame(&self, frame: &[u8]) {
        debug!(?frame, "unrecognized frame on bus");
    }
}

/// Synthetic stand-in for the bus decoder: produces a plausible ride profile
/// and writes it through the raw accessors, exactly as the real decoder
/// would.
struct SignalGenerator {
    tick: u64,
    odometer_ticks: u32,
    fuel_ticks: u32,
}

impl SignalGenerator {
    fn new() -> Self {
        Self {
            tick: 0,
            odometer_ticks: 0,
            fuel_ticks: 0,
        }
    }

    fn step(&mut self, data: &VehicleData) {
        self.tick += 1;
        let t = self.tick as f32 * 0.02;

        // Speed sweeps 0..=120 km/h; engine speed loosely follows.
        let kmh = ((t.sin() * 0.5 + 0.5) * 120.0) as u32;
        let rpm = if kmh == 0 { 950 } else { 1100 + kmh * 40 };
        let gear = ((kmh / 22) + 1).min(6) as u8;

        data.set_speed(kmh * 128);
        data.set_rpm(rpm * 4);
        data.set_neutral(kmh == 0);
        data.set_gear(if kmh == 0 { 0 } else { gear });
        data.set_clutch(self.tick % 32 < 2);
        data.set_engine_temp(180 + ((self.tick / 16) % 40) as i32);
        data.set_fuel_gauge((6 - (self.tick / 2400).min(6)) as u8);
        data.set_turn_signals(((self.tick / 64) % 4) as u8);
        data.set_check_engine(self.tick % 512 >= 480);

        // Coarse integration of distance and consumption, enough to keep
        // the counters moving at believable rates.
        self.odometer_ticks = self.odometer_ticks.wrapping_add(kmh / 4);
        self.fuel_ticks = self.fuel_ticks.wrapping_add(rpm / 40);
        data.set_odometer(self.odometer_ticks);
        data.set_fuel(self.fuel_ticks);

        // Occasional line noise for the diagnostics path.
        if self.tick % 200 == 0 {
            data.report_bad_frame(&[0x0c, 0x10, 0x02, self.tick as u8, 0xff]);
        }
        if self.tick % 333 == 0 {
            data.report_unknown_frame(&[0x68, 0x88, self.tick as u8]);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("motobus simulator starting");

    let data = Arc::new(VehicleData::new());
    data.register_listener(Arc::new(TraceListener));

    // Broadcast channel for JSON snapshots
    let (snapshot_tx, _) = broadcast::channel(SNAPSHOT_BROADCAST_BUFFER_SIZE);

    // Start TCP server
    let tcp_data = Arc::clone(&data);
    let tcp_snapshot_tx = snapshot_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = start_tcp_server(tcp_data, tcp_snapshot_tx).await {
            error!("TCP server error: {}", e);
        }
    });

    let mut generator = SignalGenerator::new();
    let mut interval = time::interval(Duration::from_millis(TICK_PERIOD_MS));

    loop {
        interval.tick().await;
        generator.step(&data);

        if snapshot_tx.receiver_count() > 0 {
            match serde_json::to_string(&data.snapshot()) {
                Ok(json) => {
                    if let Err(e) = snapshot_tx.send(json) {
                        warn!("failed to broadcast snapshot: {}", e);
                    }
                }
                Err(e) => warn!("failed to serialize snapshot: {}", e),
            }
        }

        if generator.tick % DUMP_EVERY_TICKS == 0 {
            info!("{}", data);
        }
    }
}

async fn start_tcp_server(
    data: Arc<VehicleData>,
    snapshot_tx: broadcast::Sender<String>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(format!("127.0.0.1:{TCP_PORT}")).await?;
    info!("TCP server listening on port {}", TCP_PORT);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("new client connected: {}", addr);
                let client_data = Arc::clone(&data);
                let client_snapshot_rx = snapshot_tx.subscribe();

                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, client_data, client_snapshot_rx).await {
                        warn!("client {} error: {}", addr, e);
                    }
                    info!("client {} disconnected", addr);
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    data: Arc<VehicleData>,
    mut snapshot_rx: broadcast::Receiver<String>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (reader, mut writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);

    let mut line = String::new();
    loop {
        line.clear();
        match buf_reader.read_line(&mut line).await {
            Ok(0) => break, // Client disconnected
            Ok(_) => match line.trim() {
                "" => continue,
                "snapshot" => {
                    let json = serde_json::to_string(&data.snapshot())?;
                    writer.write_all(json.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                }
                "dump" => {
                    writer.write_all(data.dump().as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                }
                "watch" => {
                    // Stream broadcast snapshots until the client goes away.
                    while let Ok(json) = snapshot_rx.recv().await {
                        if writer.write_all(json.as_bytes()).await.is_err() {
                            return Ok(());
                        }
                        if writer.write_all(b"\n").await.is_err() {
                            return Ok(());
                        }
                    }
                    break;
                }
                other => {
                    warn!("unknown client command: {}", other);
                    writer.write_all(b"error: unknown command\n").await?;
                }
            },
            Err(e) => {
                error!("error reading from client: {}", e);
                break;
            }
        }
    }

    Ok(())
}
