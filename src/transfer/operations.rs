//! Transfer operations
//!
//! Drives RETR, STOR, LIST/NLST and REST: opens the data channel, streams
//! the bytes, then consumes the final control reply.

use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::control::ControlChannel;
use crate::error::{ConnectionError, FtpClientError, ProtocolError, Result};
use crate::protocol::{Command, Reply};
use crate::transfer::data_channel::{DataChannelSettings, establish};
use crate::transfer::results::{ListResult, TransferDirection, TransferReport};

/// Lifecycle of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Idle,
    AwaitingDataChannel,
    DataChannelOpen,
    Streaming,
    Completed,
    Failed,
}

/// Bookkeeping for one transfer, used to report throughput
#[derive(Debug)]
pub struct TransferRecord {
    path: String,
    direction: TransferDirection,
    bytes: u64,
    started: Instant,
    state: TransferState,
}

impl TransferRecord {
    pub fn new(path: &str, direction: TransferDirection) -> Self {
        Self {
            path: path.to_string(),
            direction,
            bytes: 0,
            started: Instant::now(),
            state: TransferState::Idle,
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    fn advance(&mut self, next: TransferState) {
        debug!("Transfer {}: {:?} -> {:?}", self.path, self.state, next);
        self.state = next;
    }

    fn fail(&mut self, err: FtpClientError) -> FtpClientError {
        warn!("Transfer {} failed in {:?}: {}", self.path, self.state, err);
        self.state = TransferState::Failed;
        err
    }

    /// Accepts the final reply. Only a 2xx completes the transfer.
    fn finish(&mut self, reply: Reply) -> Result<TransferReport> {
        if !reply.is_success() {
            return Err(self.fail(
                ProtocolError::UnexpectedReply {
                    expected: "transfer complete",
                    reply,
                }
                .into(),
            ));
        }

        self.advance(TransferState::Completed);
        let report = TransferReport {
            path: self.path.clone(),
            direction: self.direction,
            bytes: self.bytes,
            elapsed: self.started.elapsed(),
            reply,
        };
        info!("Transfer {} complete: {}", self.path, report);
        Ok(report)
    }
}

/// Downloads `remote_path` into `sink`.
///
/// The sink is opened only once the data channel is up, in append mode when
/// `resuming` and truncated otherwise.
pub async fn download(
    control: &mut ControlChannel,
    settings: &DataChannelSettings,
    remote_path: &str,
    sink: &Path,
    resuming: bool,
) -> Result<TransferReport> {
    let mut record = TransferRecord::new(remote_path, TransferDirection::Download);

    record.advance(TransferState::AwaitingDataChannel);
    let command = Command::Retr(remote_path.to_string());
    let mut data = establish(control, settings, &command)
        .await
        .map_err(|e| record.fail(e))?;
    record.advance(TransferState::DataChannelOpen);

    let mut file = match open_sink(sink, resuming).await {
        Ok(file) => file,
        Err(e) => return Err(abort(control, settings, data, record.fail(e.into())).await),
    };
    if resuming {
        info!("Resuming transfer of {} into {}", remote_path, sink.display());
    }

    record.advance(TransferState::Streaming);
    let mut buffer = vec![0u8; settings.buffer_size];
    loop {
        let n = match data.read(&mut buffer).await {
            Ok(n) => n,
            Err(e) => {
                let err = ConnectionError::DataIo(e).into();
                return Err(abort(control, settings, data, record.fail(err)).await);
            }
        };
        if n == 0 {
            break;
        }
        if let Err(e) = file.write_all(&buffer[..n]).await {
            return Err(abort(control, settings, data, record.fail(e.into())).await);
        }
        record.bytes += n as u64;
    }
    drop(data);

    file.flush().await.map_err(|e| record.fail(e.into()))?;

    let reply = control.receive().await.map_err(|e| record.fail(e))?;
    record.finish(reply)
}

/// Uploads the local file at `path`, stored remotely under the same name.
pub async fn upload(
    control: &mut ControlChannel,
    settings: &DataChannelSettings,
    path: &str,
) -> Result<TransferReport> {
    let mut record = TransferRecord::new(path, TransferDirection::Upload);

    let mut source = File::open(path).await?;
    let size = source.metadata().await?.len();
    debug!("Uploading {} ({} bytes)", path, size);

    record.advance(TransferState::AwaitingDataChannel);
    let command = Command::Stor(path.to_string());
    let mut data = establish(control, settings, &command)
        .await
        .map_err(|e| record.fail(e))?;
    record.advance(TransferState::DataChannelOpen);

    record.advance(TransferState::Streaming);
    match tokio::io::copy(&mut source, &mut data).await {
        Ok(n) => record.bytes = n,
        Err(e) => return Err(abort(control, settings, data, record.fail(e.into())).await),
    }
    if let Err(e) = data.shutdown().await {
        let err = ConnectionError::DataIo(e).into();
        return Err(abort(control, settings, data, record.fail(err)).await);
    }
    drop(data);

    let reply = control.receive().await.map_err(|e| record.fail(e))?;
    record.finish(reply)
}

/// Fetches a directory listing. `names_only` selects NLST over LIST.
pub async fn list(
    control: &mut ControlChannel,
    settings: &DataChannelSettings,
    path: &str,
    names_only: bool,
) -> Result<ListResult> {
    let mut record = TransferRecord::new(path, TransferDirection::Listing);

    record.advance(TransferState::AwaitingDataChannel);
    let command = if names_only {
        Command::Nlst(path.to_string())
    } else {
        Command::List(path.to_string())
    };
    let mut data = establish(control, settings, &command)
        .await
        .map_err(|e| record.fail(e))?;
    record.advance(TransferState::DataChannelOpen);

    record.advance(TransferState::Streaming);
    let mut raw = Vec::new();
    if let Err(e) = data.read_to_end(&mut raw).await {
        let err = ConnectionError::DataIo(e).into();
        return Err(abort(control, settings, data, record.fail(err)).await);
    }
    record.bytes = raw.len() as u64;
    drop(data);

    let reply = control.receive().await.map_err(|e| record.fail(e))?;
    let report = record.finish(reply)?;
    Ok(ListResult {
        listing: String::from_utf8_lossy(&raw).into_owned(),
        reply: report.reply,
    })
}

/// Asks the server to start the next RETR at `offset`. 2xx and 3xx accept.
pub async fn request_restart(control: &mut ControlChannel, offset: u64) -> Result<Reply> {
    let reply = control.exchange_command(&Command::Rest(offset)).await?;
    if reply.is_success() || reply.is_intermediate() {
        Ok(reply)
    } else {
        Err(FtpClientError::ResumeRejected(reply))
    }
}

async fn open_sink(path: &Path, resuming: bool) -> std::io::Result<File> {
    if resuming {
        OpenOptions::new().create(true).append(true).open(path).await
    } else {
        File::create(path).await
    }
}

/// Releases the data socket after a failure mid-transfer and drains the
/// server's final reply so the control channel stays in step. The reply is
/// never taken as success.
async fn abort(
    control: &mut ControlChannel,
    settings: &DataChannelSettings,
    data: TcpStream,
    err: FtpClientError,
) -> FtpClientError {
    drop(data);
    match control.drain_final_reply(settings.reply_timeout).await {
        Ok(reply) => {
            debug!("Discarding final reply of failed transfer: {}", reply);
            err
        }
        Err(control_err) => control_err,
    }
}
