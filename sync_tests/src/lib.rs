// Test-only scripted server for end-to-end client tests.
//
// `StubServer` binds a real TCP listener; `StubPeer` is the accepted
// connection, able to send scripted `ServerMessage` frames (or raw
// bytes, for malformed-input tests) and to receive and decode the
// client's outbound `ClientMessage`s. No game logic runs here — the
// scripts in `tests/` are the server's entire behavior.
//
// The only test-specific machinery is the synchronous pumping helper
// (`pump_until`), which interleaves `GameClient::tick` with short
// sleeps until a condition holds. Everything else goes through the same
// code paths as a live session: real sockets, real framing, real codec.

use std::io::{BufReader, BufWriter};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use holdout_client::{ConnectConfig, GameClient};
use holdout_protocol::framing::{read_frame, write_frame};
use holdout_protocol::message::{ClientMessage, ServerMessage};

/// Nominal frame delta for pumped ticks (~60 Hz).
pub const FRAME_DT: f32 = 0.016;

/// How long `pump_until` and `StubPeer::recv` wait before failing.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Sleep between pump iterations.
const PUMP_INTERVAL: Duration = Duration::from_millis(5);

/// A bound listener waiting for the client under test.
pub struct StubServer {
    listener: TcpListener,
}

impl StubServer {
    /// Bind on a random loopback port.
    pub fn bind() -> (Self, ConnectConfig) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let config = ConnectConfig {
            endpoint: listener.local_addr().expect("local addr").to_string(),
            connect_timeout: Some(Duration::from_secs(1)),
        };
        (Self { listener }, config)
    }

    /// Accept the client's connection.
    pub fn accept(&self) -> StubPeer {
        let (stream, _) = self.listener.accept().expect("accept client");
        stream
            .set_read_timeout(Some(WAIT_TIMEOUT))
            .expect("set read timeout");
        let reader_stream = stream.try_clone().expect("clone stream");
        StubPeer {
            writer: BufWriter::new(stream),
            reader: BufReader::new(reader_stream),
        }
    }
}

/// The server's side of one client connection.
pub struct StubPeer {
    writer: BufWriter<TcpStream>,
    reader: BufReader<TcpStream>,
}

impl StubPeer {
    /// Send one scripted message.
    pub fn send(&mut self, msg: &ServerMessage) {
        let json = serde_json::to_vec(msg).expect("serialize ServerMessage");
        write_frame(&mut self.writer, &json).expect("write frame");
    }

    /// Send raw frame bytes (for unknown-tag and malformed-input tests).
    pub fn send_raw(&mut self, payload: &[u8]) {
        write_frame(&mut self.writer, payload).expect("write raw frame");
    }

    /// Receive and decode the client's next outbound message. Panics
    /// after the read timeout.
    pub fn recv(&mut self) -> ClientMessage {
        let frame = read_frame(&mut self.reader).expect("read client frame");
        serde_json::from_slice(&frame).expect("decode ClientMessage")
    }

    /// Close the server side of the connection.
    pub fn close(self) {
        drop(self);
    }
}

/// Bind a stub, connect a real client to it, accept the connection.
pub fn start_session() -> (StubPeer, GameClient) {
    let (server, config) = StubServer::bind();
    let client = GameClient::connect(&config).expect("client connect");
    let peer = server.accept();
    (peer, client)
}

/// Tick the client until `condition` holds, failing after the timeout.
pub fn pump_until(client: &mut GameClient, what: &str, mut condition: impl FnMut(&GameClient) -> bool) {
    let start = Instant::now();
    loop {
        client.tick(FRAME_DT);
        if condition(client) {
            return;
        }
        assert!(
            start.elapsed() < WAIT_TIMEOUT,
            "timed out waiting for {what}"
        );
        thread::sleep(PUMP_INTERVAL);
    }
}

/// Tick the client a fixed number of times (for "nothing should happen"
/// assertions, where there is no condition to wait on).
pub fn pump(client: &mut GameClient, ticks: usize) {
    for _ in 0..ticks {
        client.tick(FRAME_DT);
        thread::sleep(Duration::from_millis(1));
    }
}
