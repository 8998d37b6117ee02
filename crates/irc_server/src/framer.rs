//! The Line Framer (spec.md §4.2): splits a connection's inbound byte
//! stream into CR-LF-terminated command lines.
//!
//! Grounded in spirit on the `Lines` codec in
//! `examples/UnHumbleBen-tokio-tutorial/line-chat/src/main.rs` (accumulate
//! into a buffer, scan for the `\r\n` window, split it off, leave the
//! remainder buffered) — reworked here as a plain synchronous buffer since
//! this crate's reactor (`net.rs`) owns the actual socket reads and only
//! needs the framing step to be a pure function of the bytes fed to it.

#[derive(Debug, Default)]
pub struct Framer {
    buf: Vec<u8>,
}

impl Framer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Appends freshly-read bytes to the inbound buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Extracts every complete CR-LF-terminated line currently buffered,
    /// in arrival order, leaving any trailing partial line buffered.
    /// Empty lines (a lone CR-LF) are preserved as empty strings, per
    /// spec.md §4.2.
    pub fn extract_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            let Some(pos) = self.buf.windows(2).position(|w| w == b"\r\n") else {
                break;
            };
            let line_bytes: Vec<u8> = self.buf.drain(..pos + 2).collect();
            let line = &line_bytes[..line_bytes.len() - 2];
            lines.push(String::from_utf8_lossy(line).into_owned());
        }
        lines
    }
}
