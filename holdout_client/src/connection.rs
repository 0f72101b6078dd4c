// Connection manager: the sole I/O boundary of the synchronization layer.
//
// Owns the TCP socket lifecycle and exposes send/receive to the rest of
// the crate. Architecture:
// - `connect()` performs the TCP connect on the calling thread, then
//   spawns a background reader thread.
// - The reader thread calls `read_frame()` in a loop and pushes raw
//   frames into an `mpsc` channel. It never decodes — interpretation
//   belongs to the router's drain loop, where malformed frames can be
//   dropped without touching the channel.
// - The main thread holds a `BufWriter<TcpStream>` for sending.
// - `poll()` drains the inbox non-blocking, preserving arrival order.
//
// State machine: `Disconnected → Connecting → Open → Closing →
// Disconnected`. `send` is only valid in `Open`; messages attempted in
// any other state are dropped and reported, never queued (at-most-once,
// no retry). EOF or a read error on the socket surfaces as
// `Inbound::Closed` through the same inbox, so the owner observes the
// peer-initiated teardown in order with the frames that preceded it.
//
// `close()` shuts the socket down both ways and joins the reader
// thread; `Drop` runs the same teardown, so the channel is released on
// every exit path.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, warn};

use holdout_protocol::codec::encode_client_message;
use holdout_protocol::framing::{read_frame, write_frame};
use holdout_protocol::message::ClientMessage;

use crate::error::ConnectionError;

/// Where the channel is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closing,
}

/// What the reader thread delivers: a raw frame, or the fact that the
/// stream ended (EOF or read error).
#[derive(Debug)]
pub enum Inbound {
    Frame(Vec<u8>),
    Closed,
}

/// Connection settings.
#[derive(Clone, Debug)]
pub struct ConnectConfig {
    pub endpoint: String,
    /// Bound on the TCP connect itself; `None` uses the OS default.
    pub connect_timeout: Option<Duration>,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:3000".into(),
            connect_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// The persistent server channel.
#[derive(Debug)]
pub struct Connection {
    writer: BufWriter<TcpStream>,
    stream: TcpStream,
    inbox: Receiver<Inbound>,
    reader_thread: Option<JoinHandle<()>>,
    state: ConnectionState,
}

impl Connection {
    /// Establish the channel and spawn the reader thread. Fails with
    /// `ConnectionError::Unreachable` if the endpoint cannot be reached.
    pub fn connect(config: &ConnectConfig) -> Result<Self, ConnectionError> {
        debug!("connecting to {}", config.endpoint);
        let state = ConnectionState::Connecting;

        let stream = match config.connect_timeout {
            Some(timeout) => connect_with_timeout(&config.endpoint, timeout)?,
            None => TcpStream::connect(&config.endpoint)?,
        };

        let reader_stream = stream.try_clone()?;
        let writer = BufWriter::new(stream.try_clone()?);

        let (tx, rx) = mpsc::channel();
        let reader_thread = thread::spawn(move || {
            reader_loop(BufReader::new(reader_stream), tx);
        });

        debug!("connection open ({state:?} -> Open)");
        Ok(Self {
            writer,
            stream,
            inbox: rx,
            reader_thread: Some(reader_thread),
            state: ConnectionState::Open,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Fire-and-forget send. In any state but `Open` the message is
    /// dropped (not queued) and `NotConnected` is reported. A broken
    /// write half tears the channel down and reports `Closed`.
    pub fn send(&mut self, msg: &ClientMessage) -> Result<(), ConnectionError> {
        if self.state != ConnectionState::Open {
            return Err(ConnectionError::NotConnected);
        }

        let payload = match encode_client_message(msg) {
            Ok(payload) => payload,
            Err(err) => {
                // Serialization of our own closed message set cannot
                // fail in practice; drop the message rather than kill
                // the channel if it somehow does.
                error!("failed to encode outbound message: {err}");
                return Ok(());
            }
        };

        if let Err(err) = write_frame(&mut self.writer, &payload) {
            warn!("write failed, closing channel: {err}");
            self.teardown();
            return Err(ConnectionError::Closed);
        }
        Ok(())
    }

    /// Drain everything the reader thread has delivered, in arrival
    /// order. Observing `Inbound::Closed` transitions the channel to
    /// `Disconnected`.
    pub fn poll(&mut self) -> Vec<Inbound> {
        let mut inbound = Vec::new();
        while let Ok(item) = self.inbox.try_recv() {
            if matches!(item, Inbound::Closed) {
                debug!("peer closed the channel");
                self.state = ConnectionState::Disconnected;
            }
            inbound.push(item);
        }
        inbound
    }

    /// Scoped shutdown: close the socket both ways and join the reader
    /// thread. Idempotent; also runs on `Drop`.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Disconnected {
            return;
        }
        self.state = ConnectionState::Closing;
        self.teardown();
    }

    fn teardown(&mut self) {
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
        self.state = ConnectionState::Disconnected;
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Resolve the endpoint and connect with a bound, trying each resolved
/// address in order.
fn connect_with_timeout(endpoint: &str, timeout: Duration) -> Result<TcpStream, ConnectionError> {
    let addrs: Vec<_> = endpoint.to_socket_addrs()?.collect();
    let mut last_err = std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        format!("no addresses for {endpoint}"),
    );
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = err,
        }
    }
    Err(ConnectionError::Unreachable(last_err))
}

/// Reader thread: read framed payloads in a loop, push raw bytes to the
/// inbox. On EOF/read error, push `Closed` and exit.
fn reader_loop(mut reader: BufReader<TcpStream>, tx: Sender<Inbound>) {
    loop {
        match read_frame(&mut reader) {
            Ok(frame) => {
                if tx.send(Inbound::Frame(frame)).is_err() {
                    break; // Owner dropped the receiver.
                }
            }
            Err(_) => {
                let _ = tx.send(Inbound::Closed);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Instant;

    use holdout_protocol::framing::write_frame;

    use super::*;

    fn listener_config() -> (TcpListener, ConnectConfig) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ConnectConfig {
            endpoint: listener.local_addr().unwrap().to_string(),
            connect_timeout: Some(Duration::from_secs(1)),
        };
        (listener, config)
    }

    /// Poll until at least one inbound item arrives or the timeout hits.
    fn poll_until_inbound(conn: &mut Connection) -> Vec<Inbound> {
        let start = Instant::now();
        loop {
            let items = conn.poll();
            if !items.is_empty() {
                return items;
            }
            assert!(
                start.elapsed() < Duration::from_secs(2),
                "timed out waiting for inbound"
            );
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn connect_reaches_open_state() {
        let (listener, config) = listener_config();
        let conn = Connection::connect(&config).unwrap();
        let _accepted = listener.accept().unwrap();
        assert_eq!(conn.state(), ConnectionState::Open);
        assert!(conn.is_open());
    }

    #[test]
    fn connect_to_unreachable_endpoint_fails() {
        // Port 1 is essentially never listening on loopback.
        let config = ConnectConfig {
            endpoint: "127.0.0.1:1".into(),
            connect_timeout: Some(Duration::from_millis(200)),
        };
        match Connection::connect(&config) {
            Err(ConnectionError::Unreachable(_)) => {}
            other => panic!("expected Unreachable, got {other:?}"),
        }
    }

    #[test]
    fn send_writes_a_decodable_frame() {
        let (listener, config) = listener_config();
        let mut conn = Connection::connect(&config).unwrap();
        let (server, _) = listener.accept().unwrap();

        conn.send(&ClientMessage::ReloadRequest).unwrap();

        let mut reader = BufReader::new(server);
        let frame = read_frame(&mut reader).unwrap();
        let msg: ClientMessage = serde_json::from_slice(&frame).unwrap();
        assert_eq!(msg, ClientMessage::ReloadRequest);
    }

    #[test]
    fn send_after_close_reports_not_connected() {
        let (listener, config) = listener_config();
        let mut conn = Connection::connect(&config).unwrap();
        let _accepted = listener.accept().unwrap();

        conn.close();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        match conn.send(&ClientMessage::ReloadRequest) {
            Err(ConnectionError::NotConnected) => {}
            other => panic!("expected NotConnected, got {other:?}"),
        }
    }

    #[test]
    fn close_is_idempotent() {
        let (listener, config) = listener_config();
        let mut conn = Connection::connect(&config).unwrap();
        let _accepted = listener.accept().unwrap();

        conn.close();
        conn.close();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn inbound_frames_arrive_in_order() {
        let (listener, config) = listener_config();
        let mut conn = Connection::connect(&config).unwrap();
        let (server, _) = listener.accept().unwrap();

        let mut writer = BufWriter::new(server);
        write_frame(&mut writer, b"first").unwrap();
        write_frame(&mut writer, b"second").unwrap();

        let mut collected = Vec::new();
        let start = Instant::now();
        while collected.len() < 2 {
            for item in conn.poll() {
                match item {
                    Inbound::Frame(bytes) => collected.push(bytes),
                    Inbound::Closed => panic!("unexpected close"),
                }
            }
            assert!(
                start.elapsed() < Duration::from_secs(2),
                "timed out waiting for frames"
            );
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(collected[0], b"first");
        assert_eq!(collected[1], b"second");
    }

    #[test]
    fn peer_close_surfaces_as_closed_and_disconnects() {
        let (listener, config) = listener_config();
        let mut conn = Connection::connect(&config).unwrap();
        let (server, _) = listener.accept().unwrap();
        drop(server);

        let items = poll_until_inbound(&mut conn);
        assert!(matches!(items.last(), Some(Inbound::Closed)));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }
}
