//! Module `data_channel`
//!
//! Opens the per-transfer data connection. Passive mode connects to the
//! address the server advertises in its PASV reply; active mode listens on a
//! local port, advertises it with PORT and accepts the server's connection.
//!
//! The two modes order the control traffic differently. Passive sends the
//! transfer command before the server's 150 is known; active needs the PORT
//! acknowledgment before the transfer command goes out.

use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::control::ControlChannel;
use crate::error::{ConnectionError, DataChannelError, FtpClientError, Result};
use crate::protocol::responses::{ENTERING_PASSIVE_MODE, OPENING_DATA_CONNECTION};
use crate::protocol::{Command, build_active_command, parse_passive_reply};
use crate::transfer::modes::{DataEndpoint, TransferMode};

/// Everything data channel setup needs from the session and configuration
#[derive(Debug, Clone)]
pub struct DataChannelSettings {
    pub mode: TransferMode,
    pub local_ip: IpAddr,
    pub port_min: u16,
    pub port_max: u16,
    pub bind_attempts: usize,
    pub accept_timeout: Option<Duration>,
    pub reply_timeout: Duration,
    pub buffer_size: usize,
}

/// Opens a data connection for `command` in the configured mode.
pub async fn establish(
    control: &mut ControlChannel,
    settings: &DataChannelSettings,
    command: &Command,
) -> Result<TcpStream> {
    match settings.mode {
        TransferMode::Passive => establish_passive(control, settings, command).await,
        TransferMode::Active => establish_active(control, settings, command).await,
    }
}

/// Passive mode: PASV, send `command`, connect, expect 150.
///
/// An unusable PASV reply aborts before `command` is sent. Once it is sent,
/// every failure first consumes the reply the server owes for it.
pub async fn establish_passive(
    control: &mut ControlChannel,
    settings: &DataChannelSettings,
    command: &Command,
) -> Result<TcpStream> {
    // 1. Ask the server where to connect
    let reply = control.exchange_command(&Command::Pasv).await?;
    if reply.code != ENTERING_PASSIVE_MODE {
        return Err(DataChannelError::Rejected(reply).into());
    }
    let addr = parse_passive_reply(&reply.text)?.socket_addr();
    debug!("Data endpoint: {}", DataEndpoint::Connect(addr));

    // 2. Transfer command goes out before the data connection
    control.send_command(command).await?;

    // 3. Open the data connection
    let stream = match TcpStream::connect(addr).await {
        Ok(stream) => stream,
        Err(e) => {
            let err = ConnectionError::DataConnect(addr, e).into();
            return Err(settle(control, settings, err).await);
        }
    };

    // 4. Server must announce the transfer
    let reply = control.receive().await?;
    if reply.code != OPENING_DATA_CONNECTION {
        warn!("Closing data connection to {}: {}", addr, reply);
        drop(stream);
        let preliminary = reply.is_preliminary();
        let err = DataChannelError::Rejected(reply).into();
        if preliminary {
            return Err(settle(control, settings, err).await);
        }
        return Err(err);
    }

    info!("Passive data connection open to {}", addr);
    Ok(stream)
}

/// Active mode: listen, PORT, send `command`, accept, read the preliminary
/// reply.
pub async fn establish_active(
    control: &mut ControlChannel,
    settings: &DataChannelSettings,
    command: &Command,
) -> Result<TcpStream> {
    let ip = match settings.local_ip {
        IpAddr::V4(ip) => ip,
        other => return Err(DataChannelError::UnsupportedLocalAddress(other.to_string()).into()),
    };

    // 1. Listen before advertising anything
    let listener = bind_listener(settings).await?;
    let port = listener
        .local_addr()
        .map_err(ConnectionError::Accept)?
        .port();
    debug!("Data endpoint: {}", DataEndpoint::Listen(port));

    // 2. PORT must be acknowledged before the transfer command
    let port_command = build_active_command(&ip.to_string(), port);
    debug!("--> {}", port_command);
    let reply = control.exchange(&port_command).await?;
    if !reply.is_success() {
        return Err(DataChannelError::Rejected(reply).into());
    }

    // 3. Transfer command
    control.send_command(command).await?;

    // 4. Wait for the server to connect. A reply that shows up first is either
    // the preliminary mark or a refusal.
    let mut early_reply = None;
    let accepted = tokio::select! {
        accepted = accept_data_connection(&listener, settings.accept_timeout) => accepted,
        reply = control.receive() => {
            let reply = reply?;
            if !reply.is_preliminary() {
                return Err(DataChannelError::Rejected(reply).into());
            }
            early_reply = Some(reply);
            accept_data_connection(&listener, settings.accept_timeout).await
        }
    };
    drop(listener);
    let (stream, peer) = match accepted {
        Ok(accepted) => accepted,
        Err(err) => return Err(settle(control, settings, err).await),
    };
    info!("Active data connection accepted from {}", peer);

    // 5. Post-accept reply
    let reply = match early_reply {
        Some(reply) => reply,
        None => control.receive().await?,
    };
    if !reply.is_preliminary() {
        drop(stream);
        return Err(DataChannelError::Rejected(reply).into());
    }

    Ok(stream)
}

/// The transfer command went out but no data connection came of it. Reads
/// and discards the reply the server still owes for it, never as success.
/// When that reply does not arrive in time the control error wins.
async fn settle(
    control: &mut ControlChannel,
    settings: &DataChannelSettings,
    err: FtpClientError,
) -> FtpClientError {
    match control.drain_final_reply(settings.reply_timeout).await {
        Ok(reply) => {
            debug!("Discarding reply to abandoned transfer: {}", reply);
            err
        }
        Err(control_err) => {
            warn!("Control channel out of step after {}: {}", err, control_err);
            control_err
        }
    }
}

/// Binds a listener on a random port in the configured range.
async fn bind_listener(settings: &DataChannelSettings) -> Result<TcpListener> {
    for attempt in 1..=settings.bind_attempts {
        let port = rand::thread_rng().gen_range(settings.port_min..=settings.port_max);
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);

        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                debug!(
                    "Port {} in use (attempt {}/{})",
                    port, attempt, settings.bind_attempts
                );
            }
            Err(e) => return Err(ConnectionError::DataBind(addr, e).into()),
        }
    }

    Err(DataChannelError::NoAvailablePort(settings.port_min, settings.port_max).into())
}

async fn accept_data_connection(
    listener: &TcpListener,
    deadline: Option<Duration>,
) -> Result<(TcpStream, SocketAddr)> {
    let accepted = match deadline {
        Some(limit) => timeout(limit, listener.accept())
            .await
            .map_err(|_| ConnectionError::AcceptTimeout(limit.as_secs()))?,
        None => listener.accept().await,
    };
    Ok(accepted.map_err(ConnectionError::Accept)?)
}
