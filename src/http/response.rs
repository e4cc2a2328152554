use std::fmt;
use std::time::SystemTime;

use crate::format::http_date;
use crate::html;

/// Value of the `Server` header.
pub const SERVER_NAME: &str = concat!("webroot/", env!("CARGO_PKG_VERSION"));

/// HTTP status codes the server can emit.
///
/// - `Ok` (200): file or listing served
/// - `BadRequest` (400): malformed request line or non-HTTP protocol
/// - `NotFound` (404): missing target, or one outside the server root
/// - `InternalServerError` (500): target exists but could not be read
/// - `NotImplemented` (501): any method other than GET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use webroot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// What a connection decided to answer. Every variant maps to exactly one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    Ok {
        body: Vec<u8>,
        content_type: &'static str,
    },
    NotFound,
    BadRequest,
    NotImplemented,
    InternalError,
}

impl ResponseOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            ResponseOutcome::Ok { .. } => StatusCode::Ok,
            ResponseOutcome::NotFound => StatusCode::NotFound,
            ResponseOutcome::BadRequest => StatusCode::BadRequest,
            ResponseOutcome::NotImplemented => StatusCode::NotImplemented,
            ResponseOutcome::InternalError => StatusCode::InternalServerError,
        }
    }

    /// Builds the full response. Non-OK outcomes get a status page body.
    ///
    /// `last_modified` is the target's mtime; the Unix epoch is used when the
    /// target does not exist.
    pub fn into_response(self, last_modified: Option<SystemTime>, now: SystemTime) -> Response {
        let status = self.status();
        let (body, content_type) = match self {
            ResponseOutcome::Ok { body, content_type } => (body, content_type),
            _ => (status_page(status).into_bytes(), "text/html"),
        };

        ResponseBuilder::new(status)
            .header("Date", http_date(now))
            .header("Server", SERVER_NAME)
            .header("Last-Modified", http_date(last_modified.unwrap_or(SystemTime::UNIX_EPOCH)))
            .header("Content-Length", body.len().to_string())
            .header("Content-Type", format!("{content_type}; charset=utf-8"))
            .body(body)
            .build()
    }
}

/// Page carrying only a heading with the status text.
pub fn status_page(status: StatusCode) -> String {
    html::render(html::PAGE_TITLE, &html::heading(&status.to_string()))
}

/// A complete HTTP response ready to be sent to a client.
///
/// Headers keep their insertion order, which is the order they go on the wire.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/plain; charset=utf-8")
///     .body(b"hello".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Appends a header, or replaces the value in place if the name is already set.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(existing) => existing.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Appends a Content-Length header from the body size if none was set.
    pub fn build(mut self) -> Response {
        if !self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("Content-Length")) {
            self.headers.push(("Content-Length".to_string(), self.body.len().to_string()));
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}
