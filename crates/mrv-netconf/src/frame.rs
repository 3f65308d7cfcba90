//! NETCONF 1.0 end-of-message framing.
//!
//! Every message on the wire is terminated by the `]]>]]>` sentinel.
//! [`frame_message`] appends it for outgoing messages; [`FrameReader`]
//! accumulates incoming bytes and yields complete messages.

use crate::error::{NetconfError, NetconfResult};

/// End-of-message delimiter defined by RFC 4742.
pub const EOM: &str = "]]>]]>";

/// Frames an outgoing message by appending the end-of-message sentinel.
pub fn frame_message(body: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + EOM.len() + 1);
    out.extend_from_slice(body.as_bytes());
    out.extend_from_slice(EOM.as_bytes());
    out.push(b'\n');
    out
}

/// Incremental splitter for the inbound byte stream.
///
/// Bytes arrive in arbitrary chunks from the SSH channel; the reader
/// buffers them and hands back one complete message at a time.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: Vec<u8>,
}

impl FrameReader {
    /// Creates an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of inbound bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pops the next complete message, if one has fully arrived.
    ///
    /// Returns an error if the buffered bytes up to the delimiter are
    /// not valid UTF-8.
    pub fn next_message(&mut self) -> NetconfResult<Option<String>> {
        let delim = EOM.as_bytes();
        let pos = self
            .buf
            .windows(delim.len())
            .position(|w| w == delim);

        let Some(pos) = pos else {
            return Ok(None);
        };

        let message: Vec<u8> = self.buf.drain(..pos).collect();
        self.buf.drain(..delim.len());

        let text = String::from_utf8(message)
            .map_err(|e| NetconfError::framing(format!("invalid UTF-8 in reply: {}", e)))?;
        Ok(Some(text.trim().to_string()))
    }

    /// Returns the number of buffered (incomplete) bytes.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_message_appends_eom() {
        let framed = frame_message("<hello/>");
        let text = String::from_utf8(framed).unwrap();
        assert!(text.starts_with("<hello/>"));
        assert!(text.contains("]]>]]>"));
    }

    #[test]
    fn test_reader_single_message() {
        let mut reader = FrameReader::new();
        reader.push(b"<rpc-reply><ok/></rpc-reply>]]>]]>");
        let msg = reader.next_message().unwrap().unwrap();
        assert_eq!(msg, "<rpc-reply><ok/></rpc-reply>");
        assert!(reader.next_message().unwrap().is_none());
    }

    #[test]
    fn test_reader_split_across_chunks() {
        let mut reader = FrameReader::new();
        reader.push(b"<rpc-reply>");
        assert!(reader.next_message().unwrap().is_none());
        reader.push(b"<ok/></rpc-reply>]]");
        assert!(reader.next_message().unwrap().is_none());
        reader.push(b">]]>");
        let msg = reader.next_message().unwrap().unwrap();
        assert_eq!(msg, "<rpc-reply><ok/></rpc-reply>");
    }

    #[test]
    fn test_reader_two_messages_in_one_chunk() {
        let mut reader = FrameReader::new();
        reader.push(b"<a/>]]>]]><b/>]]>]]>");
        assert_eq!(reader.next_message().unwrap().unwrap(), "<a/>");
        assert_eq!(reader.next_message().unwrap().unwrap(), "<b/>");
        assert!(reader.next_message().unwrap().is_none());
        assert_eq!(reader.pending(), 0);
    }

    #[test]
    fn test_reader_rejects_invalid_utf8() {
        let mut reader = FrameReader::new();
        reader.push(&[0xff, 0xfe]);
        reader.push(b"]]>]]>");
        assert!(reader.next_message().is_err());
    }
}
