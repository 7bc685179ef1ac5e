//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! NETCONF message framing over a byte stream (`spec.md` §4.F, §6):
//! legacy `]]>]]>`-terminated framing, upgraded to RFC 6242 chunked
//! framing once both peers' `<hello>` advertise
//! `urn:ietf:params:netconf:base:1.1`.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use netconf_xml::framing::TrailerScanner;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingMode {
    Legacy,
    Chunked,
}

/// Per-session framing state. Holds the legacy trailer scanner so partial
/// matches survive across reads.
#[derive(Debug, Default)]
pub struct Framing {
    mode_legacy_scanner: TrailerScanner,
    buf: Vec<u8>,
}

impl Framing {
    pub fn new() -> Framing {
        Framing::default()
    }

    /// Reads one complete message from `reader` under `mode`, returning its
    /// bytes with framing stripped. Returns `Ok(None)` on clean EOF before
    /// any byte of a new message arrived.
    pub async fn read_message<R>(
        &mut self,
        reader: &mut R,
        mode: FramingMode,
    ) -> Result<Option<Vec<u8>>, Error>
    where
        R: AsyncRead + Unpin,
    {
        match mode {
            FramingMode::Legacy => self.read_legacy(reader).await,
            FramingMode::Chunked => self.read_chunked(reader).await,
        }
    }

    async fn read_legacy<R>(&mut self, reader: &mut R) -> Result<Option<Vec<u8>>, Error>
    where
        R: AsyncRead + Unpin,
    {
        self.mode_legacy_scanner.reset();
        self.buf.clear();
        let mut byte = [0u8; 1];
        loop {
            let n = reader.read(&mut byte).await?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(Error::Framing("stream closed mid-message".to_string()));
            }
            if self.mode_legacy_scanner.feed(byte[0]) {
                const TRAILER_LEN: usize = 6;
                self.buf.truncate(self.buf.len().saturating_sub(TRAILER_LEN - 1));
                return Ok(Some(std::mem::take(&mut self.buf)));
            }
            self.buf.push(byte[0]);
        }
    }

    async fn read_chunked<R>(&mut self, reader: &mut R) -> Result<Option<Vec<u8>>, Error>
    where
        R: AsyncRead + Unpin,
    {
        self.buf.clear();
        let mut first = true;
        loop {
            let header = read_chunk_header(reader, first).await?;
            first = false;
            match header {
                None => return Ok(if self.buf.is_empty() { None } else { Some(std::mem::take(&mut self.buf)) }),
                Some(ChunkHeader::End) => {
                    return Ok(Some(std::mem::take(&mut self.buf)));
                }
                Some(ChunkHeader::Size(size)) => {
                    let mut chunk = vec![0u8; size];
                    reader.read_exact(&mut chunk).await?;
                    self.buf.extend_from_slice(&chunk);
                }
            }
        }
    }

    /// Frames `message` for output under `mode`.
    pub async fn write_message<W>(
        &self,
        writer: &mut W,
        mode: FramingMode,
        message: &[u8],
    ) -> Result<(), Error>
    where
        W: AsyncWrite + Unpin,
    {
        match mode {
            FramingMode::Legacy => {
                writer.write_all(message).await?;
                writer.write_all(b"]]>]]>").await?;
            }
            FramingMode::Chunked => {
                writer
                    .write_all(format!("\n#{}\n", message.len()).as_bytes())
                    .await?;
                writer.write_all(message).await?;
                writer.write_all(b"\n##\n").await?;
            }
        }
        writer.flush().await?;
        Ok(())
    }
}

enum ChunkHeader {
    Size(usize),
    End,
}

async fn read_chunk_header<R>(reader: &mut R, first: bool) -> Result<Option<ChunkHeader>, Error>
where
    R: AsyncRead + Unpin,
{
    let mut byte = [0u8; 1];
    let n = reader.read(&mut byte).await?;
    if n == 0 {
        return Ok(None);
    }
    if byte[0] != b'\n' {
        return Err(Error::Framing("expected chunk header to start with LF".to_string()));
    }
    let _ = first;
    let n = reader.read(&mut byte).await?;
    if n == 0 {
        return Err(Error::Framing("truncated chunk header".to_string()));
    }
    if byte[0] == b'#' {
        let mut digits = Vec::new();
        loop {
            let n = reader.read(&mut byte).await?;
            if n == 0 {
                return Err(Error::Framing("truncated chunk header".to_string()));
            }
            if byte[0] == b'\n' {
                break;
            }
            digits.push(byte[0]);
        }
        if digits == b"#" {
            return Ok(Some(ChunkHeader::End));
        }
        let size: usize = std::str::from_utf8(&digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::Framing("invalid chunk size".to_string()))?;
        return Ok(Some(ChunkHeader::Size(size)));
    }
    Err(Error::Framing("malformed chunk header".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn reads_legacy_framed_message() {
        let (mut client, mut server) = duplex(256);
        client.write_all(b"<a/>]]>]]>").await.unwrap();
        let mut framing = Framing::new();
        let msg = framing
            .read_message(&mut server, FramingMode::Legacy)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(msg, b"<a/>");
    }

    #[tokio::test]
    async fn reads_chunked_framed_message() {
        let (mut client, mut server) = duplex(256);
        client.write_all(b"\n#4\n<a/>\n##\n").await.unwrap();
        let mut framing = Framing::new();
        let msg = framing
            .read_message(&mut server, FramingMode::Chunked)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(msg, b"<a/>");
    }

    #[tokio::test]
    async fn write_legacy_appends_trailer() {
        let (mut client, mut server) = duplex(256);
        let framing = Framing::new();
        framing
            .write_message(&mut server, FramingMode::Legacy, b"<a/>")
            .await
            .unwrap();
        let mut buf = vec![0u8; 10];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"<a/>]]>]]>");
    }
}
