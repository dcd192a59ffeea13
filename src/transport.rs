//! MQTT transport built on the blocking `rumqttc` client
//!
//! The event loop runs on its own thread and reports everything it sees to a
//! [`MessageHandler`]. Subscriptions are (re)issued on every broker
//! acknowledgement so they survive reconnects.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Local;
use fftscope_core::{MessageHandler, Topic};
use log::{debug, error, info, trace, warn};
use rumqttc::{
    Client, ConnectReturnCode, Connection, ConnectionError, Event, Incoming, MqttOptions,
    Outgoing, QoS,
};

use crate::config::BrokerConfig;
use crate::error::AppError;

/// Capacity of the request channel between the client and its event loop
const REQUEST_CHANNEL_CAPACITY: usize = 32;

/// Pause between reconnect attempts after a connection error
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Client options for `config`
pub fn mqtt_options(config: &BrokerConfig) -> MqttOptions {
    let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
    options.set_keep_alive(config.keep_alive());
    if let Some((username, password)) = config.credentials() {
        options.set_credentials(username, password);
    }
    options
}

/// Human-readable explanation of a broker acknowledgement code
pub fn refusal_reason(code: ConnectReturnCode) -> &'static str {
    match code {
        ConnectReturnCode::Success => "connection accepted",
        ConnectReturnCode::RefusedProtocolVersion => {
            "connection refused - incorrect protocol version"
        }
        ConnectReturnCode::BadClientId => "connection refused - invalid client identifier",
        ConnectReturnCode::ServiceUnavailable => "connection refused - server unavailable",
        ConnectReturnCode::BadUserNamePassword => {
            "connection refused - bad username or password"
        }
        ConnectReturnCode::NotAuthorized => "connection refused - not authorized",
    }
}

/// Subscribe to every dashboard topic without blocking the event loop
pub fn subscribe_all(client: &Client) -> Result<(), AppError> {
    for topic in Topic::ALL {
        client.try_subscribe(topic.name(), QoS::AtMostOnce)?;
        debug!("Subscribed to {}", topic);
    }
    Ok(())
}

/// Running MQTT connection feeding a [`MessageHandler`]
pub struct MqttTransport {
    client: Client,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl MqttTransport {
    /// Start the event loop thread. Connecting happens in the background.
    pub fn spawn(
        config: &BrokerConfig,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self, AppError> {
        info!(
            "Connecting to mqtt://{}:{} as '{}'",
            config.host, config.port, config.client_id
        );

        let (client, connection) = Client::new(mqtt_options(config), REQUEST_CHANNEL_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker = {
            let client = client.clone();
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name("mqtt".into())
                .spawn(move || run(client, connection, handler.as_ref(), &shutdown))?
        };

        Ok(Self {
            client,
            shutdown,
            worker: Some(worker),
        })
    }

    /// Disconnect from the broker and wait for the event loop to exit
    pub fn shutdown(mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Err(e) = self.client.try_disconnect() {
            debug!("Disconnect request not sent: {}", e);
        }

        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("MQTT event loop panicked");
        }
    }
}

fn run(
    client: Client,
    mut connection: Connection,
    handler: &dyn MessageHandler,
    shutdown: &AtomicBool,
) {
    for event in connection.iter() {
        if shutdown.load(Ordering::Acquire) {
            break;
        }

        match event {
            Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                if ack.code == ConnectReturnCode::Success {
                    handler.on_connection_change(true);
                    if let Err(e) = subscribe_all(&client) {
                        error!("Failed to subscribe: {}", e);
                    }
                } else {
                    warn!("Broker: {}", refusal_reason(ack.code));
                    handler.on_connection_change(false);
                }
            }
            Ok(Event::Incoming(Incoming::Publish(publish))) => {
                handler.on_message(&publish.topic, &publish.payload, Local::now());
            }
            Ok(Event::Incoming(Incoming::Disconnect)) => handler.on_connection_change(false),
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                handler.on_connection_change(false);
                break;
            }
            Ok(other) => trace!("mqtt event: {:?}", other),
            Err(e) => {
                handler.on_connection_change(false);
                match e {
                    ConnectionError::ConnectionRefused(code) => {
                        warn!("Broker: {}", refusal_reason(code))
                    }
                    other => warn!("MQTT connection error: {}", other),
                }
                info!("Reconnecting in {}s", RECONNECT_DELAY.as_secs());
                if !sleep_unless_shutdown(RECONNECT_DELAY, shutdown) {
                    break;
                }
            }
        }
    }

    debug!("MQTT event loop stopped");
}

/// Sleep for `duration`; returns `false` if shutdown was requested meanwhile
fn sleep_unless_shutdown(duration: Duration, shutdown: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        if shutdown.load(Ordering::Acquire) {
            return false;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        thread::sleep(SHUTDOWN_POLL_INTERVAL.min(remaining));
    }
    !shutdown.load(Ordering::Acquire)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_follow_config() {
        let config = BrokerConfig {
            host: "broker.local".into(),
            port: 1884,
            username: Some("admin".into()),
            password: Some("secret".into()),
            keep_alive_secs: 45,
            ..BrokerConfig::default()
        };

        let options = mqtt_options(&config);
        assert_eq!(
            options.broker_address(),
            ("broker.local".to_string(), 1884)
        );
        assert_eq!(options.client_id(), "fftscope");
        assert_eq!(options.keep_alive(), Duration::from_secs(45));
        assert_eq!(
            options.credentials(),
            Some(("admin".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn test_options_without_credentials() {
        let options = mqtt_options(&BrokerConfig::default());
        assert_eq!(options.credentials(), None);
    }

    #[test]
    fn test_refusal_reasons() {
        assert_eq!(
            refusal_reason(ConnectReturnCode::BadUserNamePassword),
            "connection refused - bad username or password"
        );
        assert!(refusal_reason(ConnectReturnCode::NotAuthorized).contains("not authorized"));
    }

    #[test]
    fn test_sleep_is_cut_short_by_shutdown() {
        let shutdown = AtomicBool::new(true);
        let started = Instant::now();
        assert!(!sleep_unless_shutdown(Duration::from_secs(5), &shutdown));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
