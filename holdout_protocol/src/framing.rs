// Length-delimited message framing over a byte stream.
//
// The server connection is a persistent TCP stream carrying one whole
// JSON message per frame: a 4-byte big-endian length prefix followed by
// the UTF-8 payload. Both `write_frame` and `read_frame` operate on raw
// `&[u8]` / `Vec<u8>` — the codec handles JSON separately, keeping this
// module format-agnostic.
//
// `MAX_FRAME_SIZE` protects against unbounded allocation from malformed
// or malicious length prefixes. The largest expected frame is a full
// player state (inventory + weapon + ammo), which is a few kilobytes;
// 64 KB is generous headroom.

use std::io::{self, Read, Write};

/// Maximum allowed frame size (64 KB).
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

/// Write a length-delimited frame: 4-byte big-endian length, then payload.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let len = payload.len();
    if len > MAX_FRAME_SIZE as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("frame too large: {len} bytes (max {MAX_FRAME_SIZE})"),
        ));
    }
    #[expect(clippy::cast_possible_truncation)]
    let len_bytes = (len as u32).to_be_bytes();
    writer.write_all(&len_bytes)?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read a length-delimited frame: 4-byte big-endian length, then payload.
///
/// Returns `UnexpectedEof` if the stream closes before or during a
/// frame. Returns `InvalidData` if the length exceeds `MAX_FRAME_SIZE`.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {len} bytes (max {MAX_FRAME_SIZE})"),
        ));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
