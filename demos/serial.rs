use std::sync::Arc;

use lgtv_remote::network::{SerialDispatcher, SerialTransport};
use lgtv_remote::{util, CommandCatalog, Config, DeviceSlot};
use tracing::info_span;

#[tokio::main]
async fn main() {
    util::init_tracing("debug");

    // Command and data token, e.g. `cargo run --example serial -- PowerOn 01`
    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "PowerOn".to_string());
    let data = args.next();

    let config = Config::default();
    let catalog = CommandCatalog::builtin();

    let data = match (data, catalog.get(&name)) {
        (Some(data), _) => data,
        (None, Some(descriptor)) => descriptor.fixed_payload.clone(),
        (None, None) => {
            eprintln!("Unknown command {}", name);
            return;
        }
    };

    println!("Opening {} at {} baud", config.serial.path, config.serial.baud_rate);
    let transport = match SerialTransport::open(&config.serial) {
        Ok(transport) => Arc::new(transport.with_span(info_span!("serial"))),
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let dispatcher = SerialDispatcher::new(transport, &catalog);
    let Some(slot) = DeviceSlot::new(0) else {
        return;
    };

    match dispatcher.execute(slot, &name, &data).await {
        Ok(ack) if ack.accepted => println!("{} acknowledged", ack.command),
        Ok(ack) => println!("{} refused by the TV", ack.command),
        Err(e) => eprintln!("{} failed: {}", name, e),
    }
}
