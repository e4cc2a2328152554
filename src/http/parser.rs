use bytes::BytesMut;
use percent_encoding::percent_decode_str;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::request::Request;

/// Longest request line the server is willing to buffer.
pub const MAX_REQUEST_LINE: usize = 8192;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("request line has fewer than 3 tokens")]
    Malformed,
    #[error("request line exceeds {0} bytes")]
    TooLong(usize),
    #[error("failed to read request line: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads the request line: every byte up to, not including, the first CR or LF.
///
/// Headers and body are left unread. Returns `Ok(None)` when the peer closes
/// the stream before sending anything. EOF after some bytes ends the line.
pub async fn read_request_line<R>(reader: &mut R) -> Result<Option<String>, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(1024);
    let mut scanned = 0;

    loop {
        if let Some(offset) = buffer[scanned..].iter().position(|&b| b == b'\r' || b == b'\n') {
            let end = scanned + offset;
            if end > MAX_REQUEST_LINE {
                return Err(ParseError::TooLong(MAX_REQUEST_LINE));
            }
            return Ok(Some(String::from_utf8_lossy(&buffer[..end]).into_owned()));
        }
        scanned = buffer.len();

        if buffer.len() > MAX_REQUEST_LINE {
            return Err(ParseError::TooLong(MAX_REQUEST_LINE));
        }

        let n = reader.read_buf(&mut buffer).await?;
        if n == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            return Ok(Some(String::from_utf8_lossy(&buffer).into_owned()));
        }
    }
}

/// Splits a request line into method, path and protocol.
///
/// Tokens are separated by single spaces; trailing empty tokens are ignored.
/// Fewer than three tokens is the only hard failure. An unsupported method or
/// protocol is recorded on the [`Request`] instead.
pub fn parse_request_line(line: &str) -> Result<Request, ParseError> {
    let mut tokens: Vec<&str> = line.split(' ').collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }

    if tokens.len() < 3 {
        return Err(ParseError::Malformed);
    }

    Ok(Request::new(tokens[0], decode_path(tokens[1]), tokens[2]))
}

/// Percent-decodes a request target after dropping any query or fragment.
///
/// Invalid UTF-8 is not fatal: the lossy decoding is used and a warning logged.
pub fn decode_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let raw = &raw[..end];

    match percent_decode_str(raw).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(e) => {
            tracing::warn!(path = %raw, error = %e, "Request path is not valid UTF-8, using lossy decoding");
            percent_decode_str(raw).decode_utf8_lossy().into_owned()
        }
    }
}
