use std::io::{self, BufRead, Write};
use std::sync::Arc;

use lgtv_remote::network::{DiscoveryEngine, DiscoveryOutcome, HttpTransport, PairingStatus};
use lgtv_remote::{util, CommandCatalog, Config};
use tokio_util::sync::CancellationToken;
use tracing::info_span;

#[tokio::main]
async fn main() {
    util::init_tracing("info");

    // Key to press once paired, e.g. `cargo run --example discover -- VolUp`
    let key = std::env::args().nth(1).unwrap_or_else(|| "Home".to_string());

    let config = Config::default();
    let transport = match HttpTransport::new(&config) {
        Ok(transport) => Arc::new(transport.with_span(info_span!("http"))),
        Err(e) => {
            eprintln!("Failed to create HTTP transport: {}", e);
            return;
        }
    };

    let mut engine = match DiscoveryEngine::new(config, transport).await {
        Ok(engine) => engine.with_span(info_span!("lgtv")),
        Err(e) => {
            eprintln!("Failed to start discovery: {}", e);
            return;
        }
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    println!("Searching for an LG TV...");
    let device = match engine.discover(&cancel).await {
        Ok(DiscoveryOutcome::Found(device)) => device,
        Ok(DiscoveryOutcome::NotFound { attempts }) => {
            println!("No TV answered after {} attempts", attempts);
            return;
        }
        Ok(DiscoveryOutcome::Cancelled) => {
            println!("Cancelled");
            return;
        }
        Err(e) => {
            eprintln!("Discovery failed: {}", e);
            return;
        }
    };

    println!("Found {} at {}", device.name, device.ip);
    if let PairingStatus::Failed(reason) = &device.pairing {
        println!("The TV did not show a PIN ({}); pairing may still work", reason);
    }

    print!("PIN shown on the TV: ");
    let _ = io::stdout().flush();
    let mut pin = String::new();
    if io::stdin().lock().read_line(&mut pin).is_err() {
        eprintln!("Failed to read PIN");
        return;
    }
    engine.set_pin(pin.trim());

    if let Err(e) = engine.pair().await {
        eprintln!("Pairing failed: {}", e);
        return;
    }

    let dispatcher = match engine.dispatcher() {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let catalog = CommandCatalog::builtin();
    if dispatcher.press(&catalog, &key).await {
        println!("{} sent", key);
    } else {
        println!("{} was not accepted", key);
    }
}
