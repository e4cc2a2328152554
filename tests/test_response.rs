use std::time::{Duration, SystemTime};

use webroot::http::response::{ResponseBuilder, ResponseOutcome, SERVER_NAME, StatusCode, status_page};
use webroot::http::writer::{ResponseWriter, serialize_head};

fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
}

#[test]
fn test_status_code_display() {
    assert_eq!(StatusCode::Ok.to_string(), "200 OK");
    assert_eq!(StatusCode::NotImplemented.to_string(), "501 Not Implemented");
    assert_eq!(
        StatusCode::InternalServerError.to_string(),
        "500 Internal Server Error"
    );
}

#[test]
fn test_outcome_status_mapping() {
    let ok = ResponseOutcome::Ok {
        body: vec![],
        content_type: "text/plain",
    };
    assert_eq!(ok.status(), StatusCode::Ok);
    assert_eq!(ResponseOutcome::NotFound.status(), StatusCode::NotFound);
    assert_eq!(ResponseOutcome::BadRequest.status(), StatusCode::BadRequest);
    assert_eq!(ResponseOutcome::NotImplemented.status(), StatusCode::NotImplemented);
    assert_eq!(ResponseOutcome::InternalError.status(), StatusCode::InternalServerError);
}

#[test]
fn test_header_block_order_and_crlf() {
    let response = ResponseOutcome::Ok {
        body: b"hello".to_vec(),
        content_type: "text/plain",
    }
    .into_response(Some(at(784_111_777)), at(784_111_777));

    let head = String::from_utf8(serialize_head(&response)).unwrap();
    let expected = format!(
        "HTTP/1.0 200 OK\r\n\
         Date: Sun, 06 Nov 1994 08:49:37 GMT\r\n\
         Server: {SERVER_NAME}\r\n\
         Last-Modified: Sun, 06 Nov 1994 08:49:37 GMT\r\n\
         Content-Length: 5\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         \r\n"
    );

    assert_eq!(head, expected);
    assert_eq!(response.body, b"hello".to_vec());
}

#[test]
fn test_missing_target_uses_epoch_last_modified() {
    let response = ResponseOutcome::NotFound.into_response(None, at(0));

    assert_eq!(response.header("Last-Modified"), Some("Thu, 01 Jan 1970 00:00:00 GMT"));
    assert_eq!(response.header("Content-Type"), Some("text/html; charset=utf-8"));
}

#[test]
fn test_status_page_body_and_length() {
    let response = ResponseOutcome::NotImplemented.into_response(None, at(0));
    let body = String::from_utf8(response.body.clone()).unwrap();

    assert!(body.contains("<h1>501 Not Implemented</h1>"));
    assert_eq!(body, status_page(StatusCode::NotImplemented));
    assert_eq!(response.header("content-length"), Some(body.len().to_string().as_str()));
}

#[test]
fn test_response_builder_auto_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(b"This is the body".to_vec())
        .build();

    assert_eq!(response.header("Content-Length"), Some("16"));
}

#[test]
fn test_response_builder_replaces_header_in_place() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Server", "a")
        .header("Content-Type", "text/plain")
        .header("server", "b")
        .build();

    let names: Vec<&str> = response.headers.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, ["Server", "Content-Type", "Content-Length"]);
    assert_eq!(response.header("Server"), Some("b"));
}

#[tokio::test]
async fn test_writer_sends_head_then_body() {
    let response = ResponseOutcome::Ok {
        body: vec![0, 1, 2, 3],
        content_type: "application/octet-stream",
    }
    .into_response(None, at(0));
    let head = serialize_head(&response);

    let mut out: Vec<u8> = Vec::new();
    ResponseWriter::new(response).write_to_stream(&mut out).await.unwrap();

    assert_eq!(&out[..head.len()], head.as_slice());
    assert_eq!(&out[head.len()..], &[0, 1, 2, 3]);
}

#[tokio::test]
async fn test_writer_stops_when_peer_is_gone() {
    let response = ResponseOutcome::Ok {
        body: vec![7u8; 64],
        content_type: "text/plain",
    }
    .into_response(None, at(0));

    let (mut server, client) = tokio::io::duplex(16);
    drop(client);

    let result = ResponseWriter::new(response).write_to_stream(&mut server).await;
    assert!(result.is_err());
}
