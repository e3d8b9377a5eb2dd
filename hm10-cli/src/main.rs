//! HM-10 configuration tool
//!
//! Opens the serial port the module is wired to, runs the `AT` self-test and
//! issues one driver operation per invocation.

mod config;
mod serial;

use std::fmt::Display;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hm10_driver::{
    AdvertisingInterval, AdvertisingType, BondMode, DiscoveryVisibility, Error, Hm10,
    ModuleProfile, NotifyMode, Role, Transport, WorkMode, WorkType,
};

use serial::SerialTransport;

#[derive(Parser)]
#[command(name = "hm10")]
#[command(about = "Configure an HM-10 BLE module over a serial port")]
struct Cli {
    /// Serial device, overrides config.json
    #[arg(short, long, global = true)]
    device: Option<String>,
    /// Baud rate, overrides config.json
    #[arg(short, long, global = true)]
    baud: Option<u32>,
    /// Response timeout in milliseconds, overrides config.json
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the effective settings to $HM10_HOME/config.json
    InitConfig,
    /// Run the AT/OK self-test
    Test,
    /// Query everything the module reports
    Info,
    /// Restart the module
    Reset,
    /// Restore factory settings
    FactoryReset,
    /// Forget the last connected device
    ClearLastConnected,
    /// Start working when in passive work type
    Start,
    /// Change one setting
    Set {
        #[command(subcommand)]
        setting: SetCommand,
    },
    /// Apply a JSON module profile
    Apply {
        /// Profile file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum SetCommand {
    /// Device name, at most 12 characters
    Name { name: String },
    /// Six digit security pin
    Pin { pin: String },
    /// master or slave
    Role { role: Role },
    /// no-pin or pin-required
    BondMode { mode: BondMode },
    /// none or notify
    Notify { mode: NotifyMode },
    /// e.g. 100ms, 152.5ms, 2000ms
    AdvInterval { interval: AdvertisingInterval },
    /// scan-response-connectable, allow-last-device, scan-response or advertising-only
    AdvType { kind: AdvertisingType },
    /// 0x0001 to 0xFFFE, hex with 0x prefix or decimal
    Characteristic {
        #[arg(value_parser = parse_characteristic)]
        value: u16,
    },
    /// Seconds
    ConnectionTimeout { seconds: u16 },
    /// passive or active
    WorkType { kind: WorkType },
    /// transmission, transmission-pio-collection or remote
    WorkMode { mode: WorkMode },
    /// hide-name or show-name
    Discovery { visibility: DiscoveryVisibility },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("hm10: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let home = config::hm10_home()?;
    let mut config = config::load(&home)?;
    config.override_with(cli.device, cli.baud, cli.timeout_ms);

    if let Commands::InitConfig = cli.command {
        let path = config::save(&home, &config)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let transport = SerialTransport::open(&config.device, config.baud_rate, config.idle_gap())?;
    let mut hm10 = Hm10::init(transport, config.driver_config())?;
    log::info!("module on {} passed the self-test", config.device);

    match cli.command {
        Commands::InitConfig | Commands::Test => {}
        Commands::Info => print_info(&mut hm10),
        Commands::Reset => hm10.reset()?,
        Commands::FactoryReset => hm10.factory_reset()?,
        Commands::ClearLastConnected => hm10.clear_last_connected()?,
        Commands::Start => hm10.start_transmission_mode()?,
        Commands::Set { setting } => apply_setting(&mut hm10, setting)?,
        Commands::Apply { file } => {
            let data = std::fs::read_to_string(&file)?;
            let profile: ModuleProfile = serde_json::from_str(&data)?;
            let count = hm10.apply_profile(&profile)?;
            println!("Applied {count} settings from {}", file.display());
        }
    }

    Ok(())
}

fn apply_setting<T: Transport>(hm10: &mut Hm10<T>, setting: SetCommand) -> Result<(), Error> {
    match setting {
        SetCommand::Name { name } => hm10.set_name(&name),
        SetCommand::Pin { pin } => hm10.set_security_pin(&pin),
        SetCommand::Role { role } => hm10.set_role(role),
        SetCommand::BondMode { mode } => hm10.set_bond_mode(mode),
        SetCommand::Notify { mode } => hm10.set_notification_mode(mode),
        SetCommand::AdvInterval { interval } => hm10.set_advertising_interval(interval),
        SetCommand::AdvType { kind } => hm10.set_advertising_type(kind),
        SetCommand::Characteristic { value } => hm10.set_characteristic(value),
        SetCommand::ConnectionTimeout { seconds } => hm10.set_connection_timeout(seconds),
        SetCommand::WorkType { kind } => hm10.set_module_work_type(kind),
        SetCommand::WorkMode { mode } => hm10.set_module_work_mode(mode),
        SetCommand::Discovery { visibility } => hm10.set_discovery_parameter(visibility),
    }
}

fn print_info<T: Transport>(hm10: &mut Hm10<T>) {
    show("Address", hm10.get_device_address());
    show("Name", hm10.get_name());
    show("Role", hm10.get_role());
    show("Bond mode", hm10.get_bond_mode());
    show("Notify", hm10.get_notification_mode());
    show(
        "Adv interval",
        hm10.get_advertising_interval()
            .map(|i| format!("{} ms", i.millis())),
    );
    show("Adv type", hm10.get_advertising_type());
    show(
        "Characteristic",
        hm10.get_characteristic().map(|c| format!("0x{c:04X}")),
    );
    show("Work type", hm10.get_module_work_type());
    show("Work mode", hm10.get_module_work_mode());
    show("Discovery", hm10.get_discovery_parameter());
    show("Conn timeout", hm10.get_connection_timeout());
    show("Last peer", hm10.get_last_connected_address());
    show("RSSI", hm10.get_rssi());
}

fn show<V: Display>(label: &str, value: Result<V, Error>) {
    match value {
        Ok(v) => println!("  {label:<15} {v}"),
        Err(Error::NotImplemented(_)) => println!("  {label:<15} (not supported)"),
        Err(e) => println!("  {label:<15} error: {e}"),
    }
}

fn parse_characteristic(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid characteristic {s:?}: {e}"))
}
