// SPDX-License-Identifier: MIT

//! Wire format tests: length-prefix framing and JSON encoding.

use super::*;

#[test]
fn encode_returns_json_without_length_prefix() {
    let response = Response::Ok;
    let encoded = encode(&response).expect("encode failed");

    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(json_str.starts_with('{'), "should be JSON object: {json_str}");
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.expect("write failed");

    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;

    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn read_message_rejects_oversized_length_prefix() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(MAX_MESSAGE_BYTES + 1).to_be_bytes());

    let mut cursor = std::io::Cursor::new(buffer);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TooLarge(_, _)));
}

#[tokio::test]
async fn read_request_write_response_roundtrip() {
    let request = Request::ManualDeploy { workspace: "app".to_string(), mode: Some("busy".to_string()) };

    let mut buffer = Vec::new();
    let bytes = encode(&request).expect("encode failed");
    write_message(&mut buffer, &bytes).await.expect("write failed");

    let mut cursor = std::io::Cursor::new(buffer);
    let decoded = read_request(&mut cursor).await.expect("read_request failed");
    assert_eq!(decoded, request);

    let mut response_buffer = Vec::new();
    write_response(&mut response_buffer, &Response::Ok).await.expect("write_response failed");
    let mut response_cursor = std::io::Cursor::new(response_buffer);
    let response_bytes = read_message(&mut response_cursor).await.expect("read failed");
    let response: Response = decode(&response_bytes).expect("decode failed");
    assert_eq!(response, Response::Ok);
}
