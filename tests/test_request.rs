use webroot::http::request::Request;

#[test]
fn test_request_get_is_valid() {
    let req = Request::new("GET", "/", "HTTP/1.0");
    assert!(req.method_valid);
    assert!(req.protocol_valid);
}

#[test]
fn test_request_method_is_case_sensitive() {
    let req = Request::new("Get", "/", "HTTP/1.0");
    assert!(!req.method_valid);
}

#[test]
fn test_request_protocol_prefix_only() {
    assert!(Request::new("GET", "/", "HTTP/").protocol_valid);
    assert!(Request::new("GET", "/", "hTtP/0.9").protocol_valid);
    assert!(!Request::new("GET", "/", "XHTTP/1.0").protocol_valid);
}

#[test]
fn test_request_clone_is_equal() {
    let req = Request::new("POST", "/upload", "HTTP/1.0");
    assert_eq!(req.clone(), req);
}
