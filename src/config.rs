//! Client configuration, mirroring the server's env-override pattern.

use crate::constants::buffers::{INPUT_BUFFER_SIZE, INTERPOLATION_DELAY_MS, SNAPSHOT_BUFFER_SIZE};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebTransport URL of the server, e.g. `https://play.orbit.example:4433/game`.
    pub server_url: String,
    /// Base64 SHA-256 certificate pin; `None` validates against native CAs.
    pub cert_pin_base64: Option<String>,
    /// Display name sent in `JoinRequest`.
    pub player_name: String,
    /// Join as a spectator rather than a player.
    pub spectate: bool,
    /// Fixed render-time lag, in milliseconds.
    pub interpolation_delay_ms: f64,
    /// Maximum retained snapshots in the interpolation buffer.
    pub snapshot_buffer_size: usize,
    /// Maximum retained unacknowledged inputs in the predictor.
    pub input_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "https://127.0.0.1:4433/game".to_string(),
            cert_pin_base64: None,
            player_name: "Player".to_string(),
            spectate: false,
            interpolation_delay_ms: INTERPOLATION_DELAY_MS,
            snapshot_buffer_size: SNAPSHOT_BUFFER_SIZE,
            input_buffer_size: INPUT_BUFFER_SIZE,
        }
    }
}

impl ClientConfig {
    /// Load config from environment variables, falling back to defaults
    /// for anything unset or unparsable.
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("ORBIT_SERVER_URL") {
            config.server_url = url;
        }

        if let Ok(pin) = std::env::var("ORBIT_CERT_PIN") {
            config.cert_pin_base64 = Some(pin);
        }

        if let Ok(name) = std::env::var("ORBIT_PLAYER_NAME") {
            config.player_name = name;
        }

        if let Ok(spectate) = std::env::var("ORBIT_SPECTATE") {
            config.spectate = spectate == "1" || spectate.eq_ignore_ascii_case("true");
        }

        if let Ok(delay) = std::env::var("ORBIT_INTERPOLATION_DELAY_MS") {
            if let Ok(parsed) = delay.parse() {
                config.interpolation_delay_ms = parsed;
            }
        }

        if let Ok(size) = std::env::var("ORBIT_SNAPSHOT_BUFFER_SIZE") {
            if let Ok(parsed) = size.parse() {
                config.snapshot_buffer_size = parsed;
            }
        }

        if let Ok(size) = std::env::var("ORBIT_INPUT_BUFFER_SIZE") {
            if let Ok(parsed) = size.parse() {
                config.input_buffer_size = parsed;
            }
        }

        config
    }
}
