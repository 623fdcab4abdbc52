//! Thin CLI demo: connects to an Orbit Royale server, joins, and prints the
//! HUD state as snapshots and events arrive. Exercises the library end to
//! end without any rendering layer.

use orbit_client_core::config::ClientConfig;
use orbit_client_core::net::transport::{CertPin, Transport, WebTransportClient};
use orbit_client_core::session::{ConnectionPhase, SessionController};
use orbit_client_core::{Clock, SystemClock};
use tracing::{error, info, warn, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).with_target(false).init();

    let config = ClientConfig::load_or_default();
    info!(url = %config.server_url, name = %config.player_name, "connecting to orbit server");

    let cert_pin = config.cert_pin_base64.as_deref().map(CertPin::from_base64);
    let mut transport = WebTransportClient::connect(&config.server_url, cert_pin.as_ref()).await?;

    let clock = SystemClock::new();
    let mut session = SessionController::new();

    let join = session.begin_join(config.player_name.clone(), 0, config.spectate);
    transport
        .send_reliable(&orbit_client_core::codec::encode_client_message(&join))
        .await?;

    loop {
        match transport.recv_reliable().await {
            Ok(bytes) => {
                let now_ms = clock.now_ms();
                match session.handle_frame(&bytes, now_ms) {
                    Ok(Some(event)) => info!(?event, "game event"),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "dropped inbound frame"),
                }
            }
            Err(e) => {
                error!(error = %e, "transport closed");
                break;
            }
        }

        if matches!(session.phase(), ConnectionPhase::Disconnecting { .. }) {
            break;
        }
    }

    transport.close().await;
    Ok(())
}
