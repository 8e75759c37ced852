use super::{content_length, fill_buffer, owned_headers, read_body, MAX_HEADERS};
use crate::errors::Result;
use std::io::{BufReader, Read};

/// Represents an HTTP request.
#[derive(Debug)]
pub struct Request {
    /// The HTTP method used in the request
    pub method: String,
    /// The full path of the request
    pub path: String,
    /// Headers of the request
    pub headers: Vec<(String, String)>,
    /// Body of the request
    pub body: String,
}

impl Request {
    /// Create a new request from scratch
    pub fn new(method: &str, path: &str, headers: Vec<(String, String)>, body: String) -> Request {
        Request {
            method: method.to_string(),
            path: path.to_string(),
            headers,
            body,
        }
    }

    /// Create a new GET request for the given path, with an empty body
    pub fn get(path: &str) -> Request {
        Request::new("GET", path, vec![], String::new())
    }

    /// Create a new POST request for the given path, with the given body
    pub fn post(path: &str, body: String) -> Request {
        Request::new("POST", path, vec![], body)
    }

    /// Create a new DELETE request for the given path, with an empty body
    pub fn delete(path: &str) -> Request {
        Request::new("DELETE", path, vec![], String::new())
    }
}

/// Parse an HTTP request from a byte stream
///
/// The head is accumulated until httparse sees it complete, then the body is read
/// according to Content-Length.
pub fn parse_request<T>(mut buf_reader: BufReader<T>) -> Result<Request>
where
    T: Read,
{
    let mut buf = Vec::new();

    loop {
        fill_buffer(&mut buf_reader, &mut buf)?;

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers);

        if let httparse::Status::Complete(parsed_len) = req.parse(&buf)? {
            let method = req.method.unwrap_or("GET").to_string();
            let path = req.path.unwrap_or("/").to_string();
            let headers = owned_headers(req.headers);
            let body_len = content_length(&headers);

            let body = read_body(&mut buf_reader, buf, parsed_len, body_len)?;
            return Ok(Request {
                method,
                path,
                headers,
                body,
            });
        }
    }
}
