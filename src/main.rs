//! RAX FTP Client - Entry Point
//!
//! Interactive command-line FTP client.

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info};
use tokio::io::BufReader;

use rax_ftp_client::crypto::RsaBlockCipher;
use rax_ftp_client::shell::Shell;
use rax_ftp_client::shell::terminal::read_hidden_line;
use rax_ftp_client::{ClientConfig, Session};

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match ClientConfig::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Launching FTP client...");
    println!("ftp client start, type help for commands");

    let session = Session::new(config, Arc::new(RsaBlockCipher));
    let mut shell = Shell::new(session, BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    if std::io::stdin().is_terminal() {
        shell = shell.with_secret_reader(read_hidden_line);
    }

    match shell.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Shell terminated: {}", e);
            ExitCode::FAILURE
        }
    }
}
