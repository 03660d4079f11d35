//! CLI for Switchyard
//!
//! Subcommands:
//! - `gateway`: serve the request gateway
//! - `listener`: consume log topics from the broker and forward them
//! - `relay`: run the in-memory topic broker

use clap::Parser;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use switchyard::broker::Broker;
use switchyard::config::{Settings, load_config};
use switchyard::connector::HttpConnector;
use switchyard::gateway::Dispatcher;
use switchyard::listener::{ConnectionManager, LogForwarder, TopicBinding, TopicConsumer, WsDialer};
use switchyard::transport::{start_gateway_server, start_relay_server};
use switchyard::utils::error::ListenerError;
use switchyard::utils::logging;

#[derive(Parser)]
#[command(name = "switchyard")]
enum Command {
    /// Serve the request gateway
    Gateway,
    /// Consume broker topics and forward events to the logger service
    Listener,
    /// Run the topic relay broker
    Relay,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cmd = Command::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init(&Settings::default().log);
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.log);

    let result = match cmd {
        Command::Gateway => run_gateway(&config).await,
        Command::Listener => run_listener(&config).await,
        Command::Relay => run_relay(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_gateway(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let dispatcher = Arc::new(Dispatcher::new(HttpConnector::new(&config.services)?));

    tokio::select! {
        res = start_gateway_server(&addr, dispatcher) => {
            res?;
            error!("Gateway server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_relay(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.relay.host, config.relay.port);
    let broker = Arc::new(Mutex::new(Broker::new()));

    tokio::select! {
        res = start_relay_server(&addr, broker) => {
            res?;
            error!("Relay server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_listener(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received. Exiting gracefully.");
                cancel.cancel();
            }
        });
    }

    let listener = &config.listener;
    let mut manager = ConnectionManager::new(
        WsDialer::new(listener.broker_url.as_str()),
        listener.max_attempts,
    );
    let session = match manager.connect(&cancel).await {
        Ok(session) => session,
        Err(ListenerError::Cancelled) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let consumer = TopicConsumer::new(
        TopicBinding::new(listener.topics.iter().cloned()),
        listener.queue.clone(),
    );
    let mut handler = LogForwarder::new(HttpConnector::new(&config.services)?);

    let result = consumer.listen(session, &mut handler, &cancel).await;
    session.close().await;
    result.map_err(Into::into)
}
