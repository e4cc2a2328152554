/// The only method the server implements.
pub const SUPPORTED_METHOD: &str = "GET";

/// A parsed HTTP request line.
///
/// Built once per connection by the parser and never mutated afterwards.
/// Method and protocol problems are carried as flags rather than errors so the
/// connection can still answer with a well-formed rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The method token exactly as sent (e.g. "GET", "POST")
    pub method: String,
    /// The percent-decoded request path, without query or fragment
    pub path: String,
    /// The protocol token (typically "HTTP/1.0")
    pub version: String,
    /// `true` when the method is GET
    pub method_valid: bool,
    /// `true` when the protocol token starts with "HTTP/", ignoring case
    pub protocol_valid: bool,
}

impl Request {
    /// Creates a request from its three tokens, deriving the validity flags.
    ///
    /// # Example
    ///
    /// ```
    /// # use webroot::http::request::Request;
    /// let req = Request::new("POST", "/a.txt", "http/1.0");
    /// assert!(!req.method_valid);
    /// assert!(req.protocol_valid);
    /// ```
    pub fn new(method: impl Into<String>, path: impl Into<String>, version: impl Into<String>) -> Self {
        let method = method.into();
        let version = version.into();
        let method_valid = method == SUPPORTED_METHOD;
        let protocol_valid = version.to_uppercase().starts_with("HTTP/");

        Self {
            method,
            path: path.into(),
            version,
            method_valid,
            protocol_valid,
        }
    }
}
