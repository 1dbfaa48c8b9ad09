use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use rax_ftp_client::crypto::{Cipher, KeyMaterial, RsaBlockCipher};
use rax_ftp_client::error::handlers::is_recoverable;
use rax_ftp_client::error::{
    CipherError, ConnectionError, DataChannelError, FtpClientError, ProtocolError, SessionError,
};
use rax_ftp_client::shell::Shell;
use rax_ftp_client::transfer::TransferMode;
use rax_ftp_client::{ClientConfig, Session};

// Scripted server side of one control connection
struct MockServer {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl MockServer {
    async fn reply(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    // Reads one command line and checks its prefix
    async fn expect(&mut self, prefix: &str) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        let line = line.trim_end().to_string();
        assert!(line.starts_with(prefix), "expected {prefix}, got {line:?}");
        line
    }

    async fn login(&mut self) {
        self.reply("220 Welcome to mock FTP").await;
        self.expect("USER user").await;
        self.reply("331 Password required").await;
        self.expect("PASS secret").await;
        self.reply("230 Login successful").await;
        self.expect("TYPE I").await;
        self.reply("200 Switching to binary mode").await;
    }

    // Answers PASV with a fresh loopback listener
    async fn passive(&mut self) -> TcpListener {
        self.expect("PASV").await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        self.reply(&format!(
            "227 Entering Passive Mode (127,0,0,1,{},{})",
            port / 256,
            port % 256
        ))
        .await;
        listener
    }

    // Answers PORT and returns the advertised data address
    async fn active(&mut self) -> String {
        let line = self.expect("PORT ").await;
        let fields: Vec<u16> = line[5..].split(',').map(|f| f.parse().unwrap()).collect();
        assert_eq!(fields.len(), 6);
        self.reply("200 PORT command successful").await;
        format!(
            "{}.{}.{}.{}:{}",
            fields[0],
            fields[1],
            fields[2],
            fields[3],
            fields[4] * 256 + fields[5]
        )
    }
}

async fn spawn_server<F, Fut, T>(script: F) -> (u16, JoinHandle<T>)
where
    F: FnOnce(MockServer) -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, writer) = stream.into_split();
        script(MockServer {
            reader: BufReader::new(read),
            writer,
        })
        .await
    });
    (port, handle)
}

fn session_with(config: ClientConfig, cipher: Arc<dyn Cipher>) -> Session {
    Session::new(Arc::new(config), cipher)
}

async fn logged_in(port: u16) -> Session {
    let mut session = session_with(ClientConfig::default(), Arc::new(RsaBlockCipher));
    session.connect("127.0.0.1", port).await.unwrap();
    session.login("user", "secret").await.unwrap();
    session
}

fn active_config() -> ClientConfig {
    ClientConfig {
        active_port_min: 40000,
        active_port_max: 60000,
        bind_attempts: 20,
        ..ClientConfig::default()
    }
}

fn path_str(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_connect_and_login() {
    let (port, server) = spawn_server(|mut s| async move { s.login().await }).await;

    let mut session = session_with(ClientConfig::default(), Arc::new(RsaBlockCipher));
    let greeting = session.connect("127.0.0.1", port).await.unwrap();
    assert_eq!(greeting.code, 220);

    let login = session.login("user", "secret").await.unwrap();
    assert!(login.binary);
    assert_eq!(login.reply.code, 230);
    assert!(session.state().is_logged_in());
    assert_eq!(session.state().username(), Some("user"));
    assert_eq!(session.state().remote(), Some(("127.0.0.1", port)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_login_rejected() {
    let (port, server) = spawn_server(|mut s| async move {
        s.reply("220 Welcome").await;
        s.expect("USER nobody").await;
        s.reply("530 Invalid username").await;
    })
    .await;

    let mut session = session_with(ClientConfig::default(), Arc::new(RsaBlockCipher));
    session.connect("127.0.0.1", port).await.unwrap();
    let err = session.login("nobody", "x").await.unwrap_err();
    assert!(matches!(
        err,
        FtpClientError::Session(SessionError::LoginRejected(ref reply)) if reply.code == 530
    ));
    assert!(!session.state().is_logged_in());
    server.await.unwrap();
}

#[tokio::test]
async fn test_operations_require_connection() {
    let mut session = session_with(ClientConfig::default(), Arc::new(RsaBlockCipher));
    let err = session.list(None, false).await.unwrap_err();
    assert!(matches!(err, FtpClientError::Session(SessionError::NotConnected)));
    let err = session.close().await.unwrap_err();
    assert!(matches!(err, FtpClientError::Session(SessionError::NotConnected)));
}

#[tokio::test]
async fn test_passive_download() {
    let dir = tempfile::tempdir().unwrap();
    let target = path_str(&dir.path().join("payload.bin"));
    let expected_retr = format!("RETR {}", target);

    let (port, server) = spawn_server(move |mut s| async move {
        s.login().await;
        let listener = s.passive().await;
        s.expect(&expected_retr).await;
        let (mut data, _) = listener.accept().await.unwrap();
        s.reply("150 Opening BINARY mode data connection").await;
        data.write_all(&[7u8; 1000]).await.unwrap();
        drop(data);
        s.reply("226 Transfer complete").await;
    })
    .await;

    let mut session = logged_in(port).await;
    let report = session.download(&target).await.unwrap();

    assert_eq!(report.bytes, 1000);
    assert_eq!(report.reply.code, 226);
    assert!(report.throughput_kbps() > 0.0);
    assert_eq!(std::fs::read(&target).unwrap(), vec![7u8; 1000]);
    server.await.unwrap();
}

#[tokio::test]
async fn test_passive_upload() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("upload.txt");
    std::fs::write(&source, vec![b'x'; 2048]).unwrap();
    let source = path_str(&source);
    let expected_stor = format!("STOR {}", source);

    let (port, server) = spawn_server(move |mut s| async move {
        s.login().await;
        let listener = s.passive().await;
        s.expect(&expected_stor).await;
        let (mut data, _) = listener.accept().await.unwrap();
        s.reply("150 Ok to send data").await;
        let mut received = Vec::new();
        data.read_to_end(&mut received).await.unwrap();
        s.reply("226 Transfer complete").await;
        received.len()
    })
    .await;

    let mut session = logged_in(port).await;
    let report = session.upload(&source).await.unwrap();

    assert_eq!(report.bytes, 2048);
    assert_eq!(server.await.unwrap(), 2048);
}

#[tokio::test]
async fn test_upload_missing_file_sends_nothing() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.expect("QUIT").await;
        s.reply("221 Goodbye").await;
    })
    .await;

    let mut session = logged_in(port).await;
    let err = session.upload("/definitely/not/here.txt").await.unwrap_err();
    assert!(matches!(err, FtpClientError::Io(_)));
    assert!(is_recoverable(&err));

    session.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_resume_appends_to_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("partial.bin");
    std::fs::write(&target, vec![b'a'; 300]).unwrap();
    let target = path_str(&target);
    let expected_retr = format!("RETR {}", target);

    let (port, server) = spawn_server(move |mut s| async move {
        s.login().await;
        s.expect("REST 300").await;
        s.reply("350 Restarting at 300").await;
        let listener = s.passive().await;
        s.expect(&expected_retr).await;
        let (mut data, _) = listener.accept().await.unwrap();
        s.reply("150 Opening data connection").await;
        data.write_all(&[b'b'; 200]).await.unwrap();
        drop(data);
        s.reply("226 Transfer complete").await;
    })
    .await;

    let mut session = logged_in(port).await;
    let resumed = session.resume(&target).await.unwrap();

    assert_eq!(resumed.offset, 300);
    assert_eq!(resumed.restart_reply.code, 350);
    assert_eq!(resumed.report.bytes, 200);
    assert!(!session.state().is_resume_pending());

    let contents = std::fs::read(&target).unwrap();
    assert_eq!(contents.len(), 500);
    assert!(contents[..300].iter().all(|b| *b == b'a'));
    assert!(contents[300..].iter().all(|b| *b == b'b'));
    server.await.unwrap();
}

#[tokio::test]
async fn test_resume_rejected_skips_download() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("partial.bin");
    std::fs::write(&target, b"12345").unwrap();
    let target = path_str(&target);

    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.expect("REST 5").await;
        s.reply("502 Command not implemented").await;
        s.expect("QUIT").await;
        s.reply("221 Goodbye").await;
    })
    .await;

    let mut session = logged_in(port).await;
    let err = session.resume(&target).await.unwrap_err();
    assert!(matches!(err, FtpClientError::ResumeRejected(ref r) if r.code == 502));
    assert!(!session.state().is_resume_pending());
    assert_eq!(std::fs::read(&target).unwrap(), b"12345");

    session.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_passive_connect_refused() {
    let dir = tempfile::tempdir().unwrap();
    let target = path_str(&dir.path().join("never.bin"));

    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.expect("PASV").await;
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_port = closed.local_addr().unwrap().port();
        drop(closed);
        s.reply(&format!(
            "227 Entering Passive Mode (127,0,0,1,{},{})",
            dead_port / 256,
            dead_port % 256
        ))
        .await;
        s.expect("RETR").await;
        s.reply("425 Can't open data connection").await;
        s.expect("MKD reports").await;
        s.reply("257 \"reports\" created").await;
    })
    .await;

    let mut session = logged_in(port).await;
    let err = session.download(&target).await.unwrap_err();
    assert!(matches!(
        err,
        FtpClientError::Connection(ConnectionError::DataConnect(_, _))
    ));
    assert!(is_recoverable(&err));
    assert!(!Path::new(&target).exists());

    // the refusal was consumed, so the next command gets its own reply
    let reply = session.make_directory("reports").await.unwrap();
    assert_eq!(reply.code, 257);
    server.await.unwrap();
}

#[tokio::test]
async fn test_passive_connect_refused_without_reply_resets() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.expect("PASV").await;
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_port = closed.local_addr().unwrap().port();
        drop(closed);
        s.reply(&format!(
            "227 Entering Passive Mode (127,0,0,1,{},{})",
            dead_port / 256,
            dead_port % 256
        ))
        .await;
        s.expect("STOR").await;
        // stay silent until the client hangs up
        let mut rest = String::new();
        let _ = s.reader.read_line(&mut rest).await;
    })
    .await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("up.txt");
    std::fs::write(&source, b"data").unwrap();

    let config = ClientConfig {
        reply_timeout_secs: 1,
        ..ClientConfig::default()
    };
    let mut session = session_with(config, Arc::new(RsaBlockCipher));
    session.connect("127.0.0.1", port).await.unwrap();
    session.login("user", "secret").await.unwrap();

    let err = session.upload(&path_str(&source)).await.unwrap_err();
    assert!(matches!(
        err,
        FtpClientError::Connection(ConnectionError::ReplyTimeout(1))
    ));
    assert!(!is_recoverable(&err));

    drop(session);
    server.await.unwrap();
}

#[tokio::test]
async fn test_passive_transfer_refused_by_server() {
    let dir = tempfile::tempdir().unwrap();
    let target = path_str(&dir.path().join("missing.bin"));

    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        let listener = s.passive().await;
        s.expect("RETR").await;
        let (_data, _) = listener.accept().await.unwrap();
        s.reply("550 File not found").await;
    })
    .await;

    let mut session = logged_in(port).await;
    let err = session.download(&target).await.unwrap_err();
    assert!(matches!(
        err,
        FtpClientError::DataChannel(DataChannelError::Rejected(ref r)) if r.code == 550
    ));
    assert!(!Path::new(&target).exists());
    server.await.unwrap();
}

#[tokio::test]
async fn test_malformed_passive_reply() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.expect("PASV").await;
        s.reply("227 Entering Passive Mode (127,0,0,1)").await;
        s.expect("QUIT").await;
        s.reply("221 Goodbye").await;
    })
    .await;

    let mut session = logged_in(port).await;
    let err = session.list(None, false).await.unwrap_err();
    assert!(matches!(err, FtpClientError::Protocol(_)));

    session.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_list_and_nlist() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;

        let listener = s.passive().await;
        s.expect("LIST ./").await;
        let (mut data, _) = listener.accept().await.unwrap();
        s.reply("150 Here comes the directory listing").await;
        data.write_all(b"-rw-r--r-- 1 ftp ftp 12 a.txt\r\n").await.unwrap();
        drop(data);
        s.reply("226 Directory send OK").await;

        let listener = s.passive().await;
        s.expect("NLST /pub").await;
        let (mut data, _) = listener.accept().await.unwrap();
        s.reply("150 Here comes the directory listing").await;
        data.write_all(b"a.txt\r\nb.txt\r\n").await.unwrap();
        drop(data);
        s.reply("226 Directory send OK").await;
    })
    .await;

    let mut session = logged_in(port).await;

    let listing = session.list(None, false).await.unwrap();
    assert!(listing.listing.contains("a.txt"));
    assert_eq!(listing.reply.code, 226);

    let names = session.list(Some("/pub"), true).await.unwrap();
    let names: Vec<&str> = names.listing.lines().collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    server.await.unwrap();
}

#[tokio::test]
async fn test_active_download() {
    let dir = tempfile::tempdir().unwrap();
    let target = path_str(&dir.path().join("active.bin"));
    let expected_retr = format!("RETR {}", target);

    let (port, server) = spawn_server(move |mut s| async move {
        s.login().await;
        let addr = s.active().await;
        s.expect(&expected_retr).await;
        let mut data = TcpStream::connect(&addr).await.unwrap();
        s.reply("150 Opening data connection").await;
        data.write_all(b"hello from the server").await.unwrap();
        drop(data);
        s.reply("226 Transfer complete").await;
        addr
    })
    .await;

    let mut session = session_with(active_config(), Arc::new(RsaBlockCipher));
    session.connect("127.0.0.1", port).await.unwrap();
    session.login("user", "secret").await.unwrap();
    session.set_mode(TransferMode::Active);

    let report = session.download(&target).await.unwrap();
    assert_eq!(report.bytes, 21);
    assert_eq!(std::fs::read(&target).unwrap(), b"hello from the server");

    let addr = server.await.unwrap();
    assert!(addr.starts_with("127.0.0.1:"));
    let data_port: u16 = addr.rsplit(':').next().unwrap().parse().unwrap();
    assert!((40000..=60000).contains(&data_port));
}

#[tokio::test]
async fn test_active_port_rejected_skips_command() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.expect("PORT ").await;
        s.reply("500 Illegal PORT command").await;
        s.expect("QUIT").await;
        s.reply("221 Goodbye").await;
    })
    .await;

    let mut session = session_with(active_config(), Arc::new(RsaBlockCipher));
    session.connect("127.0.0.1", port).await.unwrap();
    session.login("user", "secret").await.unwrap();
    session.set_mode(TransferMode::Active);

    let err = session.list(None, true).await.unwrap_err();
    assert!(matches!(
        err,
        FtpClientError::DataChannel(DataChannelError::Rejected(ref r)) if r.code == 500
    ));

    session.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_active_refusal_before_accept() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.active().await;
        s.expect("RETR").await;
        s.reply("550 Permission denied").await;
    })
    .await;

    let mut session = session_with(active_config(), Arc::new(RsaBlockCipher));
    session.connect("127.0.0.1", port).await.unwrap();
    session.login("user", "secret").await.unwrap();
    session.set_mode(TransferMode::Active);

    let dir = tempfile::tempdir().unwrap();
    let target = path_str(&dir.path().join("denied.bin"));
    let err = session.download(&target).await.unwrap_err();
    assert!(matches!(
        err,
        FtpClientError::DataChannel(DataChannelError::Rejected(ref r)) if r.code == 550
    ));
    assert!(!Path::new(&target).exists());
    server.await.unwrap();
}

#[tokio::test]
async fn test_active_accept_timeout_keeps_session_in_step() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.active().await;
        s.expect("LIST").await;
        s.reply("150 Opening data connection").await;
        // never connect; give up after the client does
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        s.reply("425 Can't open data connection").await;
        s.expect("MKD reports").await;
        s.reply("257 \"reports\" created").await;
    })
    .await;

    let config = ClientConfig {
        accept_timeout_secs: 1,
        ..active_config()
    };
    let mut session = session_with(config, Arc::new(RsaBlockCipher));
    session.connect("127.0.0.1", port).await.unwrap();
    session.login("user", "secret").await.unwrap();
    session.set_mode(TransferMode::Active);

    let err = session.list(None, false).await.unwrap_err();
    assert!(matches!(
        err,
        FtpClientError::Connection(ConnectionError::AcceptTimeout(1))
    ));
    assert!(is_recoverable(&err));

    let reply = session.make_directory("reports").await.unwrap();
    assert_eq!(reply.code, 257);
    server.await.unwrap();
}

#[tokio::test]
async fn test_directory_commands() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.expect("MKD reports").await;
        s.reply("257 \"reports\" created").await;
        s.expect("CWD reports").await;
        s.reply("250 Directory changed").await;
        s.expect("RMD old").await;
        s.reply("550 Remove directory operation failed").await;
        s.expect("MULT").await;
        s.reply("200 multi-thread sending on").await;
    })
    .await;

    let mut session = logged_in(port).await;
    assert_eq!(session.make_directory("reports").await.unwrap().code, 257);
    assert_eq!(session.change_directory("reports").await.unwrap().code, 250);
    // failure replies are returned, not raised
    assert_eq!(session.remove_directory("old").await.unwrap().code, 550);
    assert_eq!(session.toggle_multithread().await.unwrap().code, 200);
    server.await.unwrap();
}

// Swaps ASCII letter case, leaving digits and line endings alone
struct SwapCase;

impl Cipher for SwapCase {
    fn encode(&self, plaintext: &str, _key: &KeyMaterial) -> Result<String, CipherError> {
        Ok(plaintext
            .chars()
            .map(|c| {
                if c.is_ascii_uppercase() {
                    c.to_ascii_lowercase()
                } else {
                    c.to_ascii_uppercase()
                }
            })
            .collect())
    }

    fn decode(&self, ciphertext: &str, key: &KeyMaterial) -> Result<String, CipherError> {
        self.encode(ciphertext, key)
    }
}

#[tokio::test]
async fn test_encryption_toggle() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;

        // on: key reply in clear, confirmation already encrypted
        s.expect("ENCR").await;
        s.reply("200 17,3233,2 public key").await;
        s.reply("200 eNCRYPTION ON").await;

        s.expect("mult").await;
        s.reply("200 MULTI-THREAD ON").await;

        // off: command encrypted, reply in clear
        s.expect("encr").await;
        s.reply("200 Encryption off").await;

        s.expect("MULT").await;
        s.reply("200 Multi-thread off").await;
    })
    .await;

    let mut session = session_with(ClientConfig::default(), Arc::new(SwapCase));
    session.connect("127.0.0.1", port).await.unwrap();
    session.login("user", "secret").await.unwrap();

    let reply = session.toggle_encryption().await.unwrap();
    assert_eq!(reply.text, "200 Encryption on");
    assert!(session.is_encrypted());
    let key = session.key_material().unwrap();
    assert_eq!((key.exponent.as_str(), key.modulus.as_str(), key.block_size), ("17", "3233", 2));

    let reply = session.toggle_multithread().await.unwrap();
    assert_eq!(reply.text, "200 multi-thread on");

    let reply = session.toggle_encryption().await.unwrap();
    assert_eq!(reply.text, "200 Encryption off");
    assert!(!session.is_encrypted());

    let reply = session.toggle_multithread().await.unwrap();
    assert_eq!(reply.text, "200 Multi-thread off");
    server.await.unwrap();
}

#[tokio::test]
async fn test_encryption_without_key_ends_session() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.expect("ENCR").await;
        s.reply("200 ready").await;
    })
    .await;

    let mut session = session_with(ClientConfig::default(), Arc::new(SwapCase));
    session.connect("127.0.0.1", port).await.unwrap();
    session.login("user", "secret").await.unwrap();

    let err = session.toggle_encryption().await.unwrap_err();
    assert!(matches!(
        err,
        FtpClientError::Protocol(ProtocolError::MalformedKeyMaterial(_))
    ));
    assert!(!is_recoverable(&err));
    assert!(!session.is_encrypted());
    server.await.unwrap();
}

#[tokio::test]
async fn test_close_resets_session() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        s.expect("QUIT").await;
        s.reply("221 Goodbye").await;
    })
    .await;

    let mut session = logged_in(port).await;
    session.set_mode(TransferMode::Active);

    let reply = session.close().await.unwrap();
    assert_eq!(reply.code, 221);
    assert!(!session.is_connected());
    assert!(!session.state().is_logged_in());
    assert_eq!(session.state().mode(), TransferMode::Passive);
    assert_eq!(session.state().remote(), None);
    server.await.unwrap();
}

#[tokio::test]
async fn test_control_loss_is_not_recoverable() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
    })
    .await;

    let mut session = logged_in(port).await;
    server.await.unwrap();

    let err = session.make_directory("x").await.unwrap_err();
    assert!(matches!(err, FtpClientError::Connection(_)));
    assert!(!is_recoverable(&err));

    session.reset();
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_shell_session() {
    let (port, server) = spawn_server(|mut s| async move {
        s.login().await;
        let listener = s.passive().await;
        s.expect("NLST ./").await;
        let (mut data, _) = listener.accept().await.unwrap();
        s.reply("150 Here comes the listing").await;
        data.write_all(b"notes.txt\r\n").await.unwrap();
        drop(data);
        s.reply("226 Directory send OK").await;
        s.expect("QUIT").await;
        s.reply("221 Goodbye").await;
    })
    .await;

    let input = format!("open 127.0.0.1 {}\nuser\nsecret\nnlist\nbye\n", port);
    let session = session_with(ClientConfig::default(), Arc::new(RsaBlockCipher));
    let mut shell = Shell::new(session, std::io::Cursor::new(input.into_bytes()), Vec::new());
    shell.run().await.unwrap();

    let output = String::from_utf8(shell.into_output()).unwrap();
    assert!(output.contains("220 Welcome to mock FTP"));
    assert!(output.contains("login successful as user"));
    assert!(output.contains("using binary."));
    assert!(output.contains("notes.txt"));
    assert!(output.contains("221 Goodbye"));
    assert!(output.contains("good luck"));
    server.await.unwrap();
}
