use std::path::PathBuf;

use color_eyre::Result;
use rppal::gpio::Gpio;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use doorlink::bridge::ControlLoop;
use doorlink::config::BridgeConfig;
use doorlink::hardware::{rpi, DoorSensor, LockDriver};
use doorlink::mqtt::MqttSession;

fn main() -> Result<()> {
    setup()?;

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = BridgeConfig::load(config_path)?;
    info!(
        "Starting doorlink for device {} against {}:{}",
        config.device_id, config.mqtt.broker_host, config.mqtt.broker_port
    );

    let gpio = Gpio::new().map_err(rpi::HardwareError::from)?;
    let lock = LockDriver::new(rpi::lock_pin(&gpio, config.hardware.lock_pin)?);
    let sensor = DoorSensor::new(rpi::sensor_pin(&gpio, config.hardware.sensor_pin)?);

    let session = MqttSession::new(config.mqtt.clone(), config.timing.connect_timeout());

    ControlLoop::new(&config, session, lock, sensor).run()
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
