//! The clamd INSTREAM wire protocol.
//!
//! Byte-exact protocol, identical over TCP and Unix sockets:
//!
//! 1. ASCII `zINSTREAM` followed by a single NUL byte.
//! 2. A chunk: 4-byte big-endian unsigned length, then that many raw
//!    file bytes. The whole file is sent as one chunk.
//! 3. A terminating zero-length chunk: 4-byte big-endian zero.
//! 4. One newline-terminated response line.
//!
//! The version query writes ASCII `VERSION\n` and reads one line.

use crate::core::{FileReference, ScanError, ScanVerdict};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// INSTREAM command token, including the trailing NUL.
const INSTREAM_COMMAND: &[u8] = b"zINSTREAM\0";

/// Version query command.
const VERSION_COMMAND: &[u8] = b"VERSION\n";

/// Streams a file over an established daemon connection and returns the
/// trimmed response line.
///
/// The connection and file handle are dropped by the caller on every
/// exit path; this function only borrows the stream.
pub(crate) async fn scan_stream<S>(stream: &mut S, file: &FileReference) -> Result<String, ScanError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // The chunk header is a 32-bit length; larger files cannot be framed.
    let len = u32::try_from(file.size()).map_err(|_| ScanError::FileTooLarge {
        size: file.size(),
        max: u64::from(u32::MAX),
    })?;

    stream.write_all(INSTREAM_COMMAND).await?;
    stream.write_all(&len.to_be_bytes()).await?;

    let mut reader = tokio::fs::File::open(file.path()).await?;
    tokio::io::copy(&mut reader, stream).await?;
    drop(reader);

    // Zero-length chunk terminates the stream.
    stream.write_all(&0u32.to_be_bytes()).await?;
    stream.flush().await?;

    read_line(stream).await
}

/// Queries the daemon version over an established connection.
pub(crate) async fn query_version<S>(stream: &mut S) -> Result<String, ScanError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(VERSION_COMMAND).await?;
    stream.flush().await?;
    read_line(stream).await
}

/// Reads a single response line and trims trailing whitespace.
async fn read_line<S>(stream: &mut S) -> Result<String, ScanError>
where
    S: AsyncRead + Unpin,
{
    let mut line = String::new();
    BufReader::new(stream).read_line(&mut line).await?;
    Ok(line.trim_end().to_string())
}

/// Parses a daemon response line into a verdict.
///
/// Three patterns, in order: exact `stream: OK` is clean, `stream: <X>
/// FOUND` is infected with virus name `<X>`, and anything else
/// (including `stream: <X> ERROR`, empty lines, and garbage) is
/// unchecked.
pub(crate) fn parse_verdict(response: &str) -> ScanVerdict {
    if response == "stream: OK" {
        return ScanVerdict::Clean;
    }

    if let Some(name) = response
        .strip_prefix("stream: ")
        .and_then(|rest| rest.strip_suffix(" FOUND"))
    {
        return ScanVerdict::infected(name);
    }

    ScanVerdict::Unchecked
}
