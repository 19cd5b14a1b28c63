use clap::{App, Arg, ArgMatches, SubCommand};
use colored::Colorize;
use motobus::VehicleSnapshot;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8086";

#[derive(Debug, Error)]
enum ClientError {
    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot from simulator: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("simulator closed the connection")]
    Disconnected,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let matches = App::new("motobus")
        .version("0.1.0")
        .author("Vehicle Systems Engineering Team")
        .about("Live telemetry client for the motobus simulator")
        .arg(
            Arg::with_name("host")
                .long("host")
                .value_name("HOST")
                .help("Simulator host address")
                .takes_value(true)
                .default_value(DEFAULT_HOST)
                .global(true),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("PORT")
                .help("Simulator port")
                .takes_value(true)
                .default_value(DEFAULT_PORT)
                .global(true),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["json", "table", "compact"])
                .default_value("table")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("snapshot")
                .about("Fetch one point-in-time view of every signal"),
        )
        .subcommand(
            SubCommand::with_name("watch")
                .about("Stream live snapshots as signals change"),
        )
        .subcommand(
            SubCommand::with_name("dump")
                .about("Fetch the simulator's single-line textual dump"),
        )
        .get_matches();

    match matches.subcommand() {
        ("snapshot", Some(sub)) => snapshot_command(&matches, sub).await,
        ("watch", Some(sub)) => watch_command(&matches, sub).await,
        ("dump", Some(_)) => dump_command(&matches).await,
        _ => {
            eprintln!("No subcommand given; try `motobus snapshot`. See --help.");
            Ok(())
        }
    }
}

async fn connect(matches: &ArgMatches<'_>) -> Result<TcpStream, ClientError> {
    let host = matches.value_of("host").unwrap_or(DEFAULT_HOST);
    let port = matches.value_of("port").unwrap_or(DEFAULT_PORT);
    Ok(TcpStream::connect(format!("{host}:{port}")).await?)
}

async fn snapshot_command(
    matches: &ArgMatches<'_>,
    sub: &ArgMatches<'_>,
) -> Result<(), ClientError> {
    let stream = connect(matches).await?;
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(b"snapshot\n").await?;
    let line = read_response(&mut lines).await?;
    print_snapshot(&line, output_format(matches, sub))?;
    Ok(())
}

async fn watch_command(matches: &ArgMatches<'_>, sub: &ArgMatches<'_>) -> Result<(), ClientError> {
    let stream = connect(matches).await?;
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let format = output_format(matches, sub);

    writer.write_all(b"watch\n").await?;
    loop {
        let line = read_response(&mut lines).await?;
        print_snapshot(&line, format)?;
    }
}

async fn dump_command(matches: &ArgMatches<'_>) -> Result<(), ClientError> {
    let stream = connect(matches).await?;
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(b"dump\n").await?;
    let line = read_response(&mut lines).await?;
    println!("{line}");
    Ok(())
}

async fn read_response(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> Result<String, ClientError> {
    lines.next_line().await?.ok_or(ClientError::Disconnected)
}

/// A format flag may be given before or after the subcommand; the
/// subcommand's value wins when both are present.
fn output_format<'a>(matches: &'a ArgMatches<'_>, sub: &'a ArgMatches<'_>) -> &'a str {
    sub.value_of("format")
        .or_else(|| matches.value_of("format"))
        .unwrap_or("table")
}

fn print_snapshot(json: &str, format: &str) -> Result<(), ClientError> {
    let snap: VehicleSnapshot = serde_json::from_str(json)?;
    match format {
        "json" => println!("{json}"),
        "compact" => {
            println!(
                "{} {} rpm | {} km/h ({} mph) | {} F | gear {} | fuel {}/6",
                timestamp_prefix(&snap),
                snap.rpm,
                snap.speed_kmh,
                snap.speed_mph,
                snap.engine_temp_f,
                gear_label(&snap),
                snap.fuel_gauge,
            );
        }
        _ => print_table(&snap),
    }
    Ok(())
}

fn timestamp_prefix(snap: &VehicleSnapshot) -> colored::ColoredString {
    if snap.check_engine {
        "CHK".red().bold()
    } else {
        " ok".green()
    }
}

fn gear_label(snap: &VehicleSnapshot) -> String {
    if snap.neutral {
        "N".to_string()
    } else if (1..=6).contains(&snap.gear) {
        snap.gear.to_string()
    } else {
        "?".to_string()
    }
}

fn print_table(snap: &VehicleSnapshot) {
    println!("{}", "vehicle state".bold().underline());
    println!("  {:<18} {}", "engine rpm".cyan(), snap.rpm);
    println!(
        "  {:<18} {} km/h ({} mph)",
        "speed".cyan(),
        snap.speed_kmh,
        snap.speed_mph
    );
    println!(
        "  {:<18} {} F ({} C)",
        "engine temp".cyan(),
        snap.engine_temp_f,
        snap.engine_temp_c
    );
    println!("  {:<18} {}/6", "fuel gauge".cyan(), snap.fuel_gauge);
    println!("  {:<18} {}", "gear".cyan(), gear_label(snap));
    println!(
        "  {:<18} {}",
        "clutch".cyan(),
        if snap.clutch { "engaged" } else { "released" }
    );
    println!(
        "  {:<18} {}",
        "turn signals".cyan(),
        match snap.turn_signals & 0x3 {
            0x3 => "hazard".yellow().to_string(),
            0x1 => "right".to_string(),
            0x2 => "left".to_string(),
            _ => "off".to_string(),
        }
    );
    println!(
        "  {:<18} {}",
        "check engine".cyan(),
        if snap.check_engine {
            "ON".red().bold().to_string()
        } else {
            "off".green().to_string()
        }
    );
    println!(
        "  {:<18} {:.2} mi ({:.2} km) this trip",
        "odometer".cyan(),
        f64::from(snap.odometer_mi_x100) / 100.0,
        f64::from(snap.odometer_km_x100) / 100.0
    );
    println!(
        "  {:<18} {} fl oz ({} mL)",
        "fuel used".cyan(),
        snap.fuel_fl_oz,
        snap.fuel_ml
    );
}
