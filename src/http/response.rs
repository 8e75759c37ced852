use super::{content_length, fill_buffer, owned_headers, read_body, MAX_HEADERS};
use crate::errors::Result;
use serde::Serialize;
use std::io::{BufReader, Read};

/// An HTTP response, either built by the server or parsed by the client
#[derive(Debug)]
pub struct Response {
    /// Status code of the response. Optional because that's what httparse returns, but it
    /// shouldn't happen in practice since we control the responses.
    pub status: Option<u16>,
    /// Headers for the response. Content-Length is added on serialization.
    pub headers: Vec<(String, String)>,
    /// Body of the response. Give an empty string for an empty body
    pub body: String,
}

impl Response {
    /// Creates an OK (200) response with the given body
    pub fn ok_with_body(body: String) -> Response {
        Response {
            status: Some(200),
            headers: vec![],
            body,
        }
    }

    /// Serialize `value` into a JSON response with the given status
    pub fn json<T: Serialize>(status: u16, value: &T) -> Result<Response> {
        Ok(Response {
            status: Some(status),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: serde_json::to_string(value)?,
        })
    }

    /// Creates an error response with no body.
    ///
    /// Codes outside of the 4xx/5xx range are turned into a 500.
    pub fn error(code: u16) -> Response {
        let code = if (400..600).contains(&code) { code } else { 500 };
        Response {
            status: Some(code),
            headers: vec![],
            body: String::new(),
        }
    }

    /// Creates an Internal Server Error (500) response.
    pub fn internal_server_error() -> Response {
        Self::error(500)
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(code) if (200..300).contains(&code))
    }
}

/// Parse an HTTP response from a byte stream
pub fn parse_response<T>(mut buf_reader: BufReader<T>) -> Result<Response>
where
    T: Read,
{
    let mut buf = Vec::new();

    loop {
        fill_buffer(&mut buf_reader, &mut buf)?;

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut resp = httparse::Response::new(&mut headers);

        if let httparse::Status::Complete(parsed_len) = resp.parse(&buf)? {
            let status = resp.code;
            let headers = owned_headers(resp.headers);
            let body_len = content_length(&headers);

            let body = read_body(&mut buf_reader, buf, parsed_len, body_len)?;
            return Ok(Response {
                status,
                headers,
                body,
            });
        }
    }
}
