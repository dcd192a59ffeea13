//! Connection probe: checks the broker and the device before running the
//! dashboard.
//!
//! Connects with the dashboard's configuration, waits for the broker to accept
//! the session, subscribes to the dashboard topics and listens for a while.
//! Exits with status 0 if at least one message arrived, 1 otherwise.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use chrono::Local;
use log::{debug, error, info, warn};
use rumqttc::{Client, ConnectReturnCode, ConnectionError, Event, Incoming};

use fftscope::BrokerConfig;
use fftscope::transport::{mqtt_options, refusal_reason, subscribe_all};

/// How long to wait for the broker to acknowledge the connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long to listen for device messages once connected
const LISTEN_DURATION: Duration = Duration::from_secs(30);

/// Messages repeated in the final summary
const SUMMARY_MESSAGES: usize = 5;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match BrokerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("MQTT connection probe");
    println!("Broker:      {}:{}", config.host, config.port);
    match config.credentials() {
        Some((username, password)) => {
            println!("Credentials: {}/{}", username, "*".repeat(password.len()))
        }
        None => println!("Credentials: none"),
    }

    if probe(&config) {
        println!("\nProbe succeeded, the dashboard is ready to run.");
        ExitCode::SUCCESS
    } else {
        println!("\nProbe failed, check the configuration before continuing.");
        ExitCode::FAILURE
    }
}

fn probe(config: &BrokerConfig) -> bool {
    let (client, mut connection) = Client::new(mqtt_options(config), 32);

    // --- Wait for the broker acknowledgement -------------------------------
    let deadline = Instant::now() + CONNECT_TIMEOUT;
    let connected = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            println!("Timed out waiting for the broker");
            break false;
        }

        match connection.recv_timeout(remaining) {
            Ok(Ok(Event::Incoming(Incoming::ConnAck(ack)))) => {
                if ack.code == ConnectReturnCode::Success {
                    println!("Connected");
                    break true;
                }
                println!("Connection failed: {}", refusal_reason(ack.code));
                break false;
            }
            Ok(Ok(event)) => debug!("mqtt event: {:?}", event),
            Ok(Err(ConnectionError::ConnectionRefused(code))) => {
                println!("Connection failed: {}", refusal_reason(code));
                break false;
            }
            Ok(Err(e)) => {
                println!("Connection failed: {}", e);
                break false;
            }
            Err(_) => {}
        }
    };

    if !connected {
        let _ = client.try_disconnect();
        return false;
    }

    if let Err(e) = subscribe_all(&client) {
        println!("Subscribe failed: {}", e);
        return false;
    }

    // --- Listen -------------------------------------------------------------
    println!(
        "Waiting {} seconds for messages (the device publishes every 2 seconds)",
        LISTEN_DURATION.as_secs()
    );

    let mut received = Vec::new();
    let deadline = Instant::now() + LISTEN_DURATION;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        match connection.recv_timeout(remaining) {
            Ok(Ok(Event::Incoming(Incoming::Publish(publish)))) => {
                let line = format!(
                    "[{}] {}: {}",
                    Local::now().format("%H:%M:%S"),
                    publish.topic,
                    String::from_utf8_lossy(&publish.payload)
                );
                println!("{}", line);
                received.push(line);
            }
            Ok(Ok(event)) => debug!("mqtt event: {:?}", event),
            Ok(Err(e)) => {
                warn!("Connection lost: {}", e);
                break;
            }
            Err(_) => {}
        }
    }

    if let Err(e) = client.try_disconnect() {
        debug!("Disconnect request not sent: {}", e);
    }

    println!("\nResult");
    println!("Connection:        OK");
    println!("Messages received: {}", received.len());

    if received.is_empty() {
        println!("No messages from the device. Possible causes:");
        println!("  1. the device is not connected to the network");
        println!("  2. the device is not running its firmware");
        println!("  3. the device cannot reach the broker");
        println!("  4. the device publishes on different topics");
        return false;
    }

    println!("Last messages:");
    for line in &received[received.len().saturating_sub(SUMMARY_MESSAGES)..] {
        println!("  {}", line);
    }
    info!("MQTT communication is working");
    true
}
