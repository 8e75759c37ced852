use crate::errors::Result;
use crate::http::{parse_response, Response};
use std::io::{BufReader, Write};
use std::net::TcpStream;
use tracing::debug;

/// Simple HTTP client
///
/// It sends HTTP requests from a set of parameters, then parses and yields the server response.
pub struct HttpClient {
    host: String,
    stream: TcpStream,
}

impl HttpClient {
    /// Create a new client connected to the given server.
    ///
    /// An error is returned if the connection cannot be made for whatever reason
    pub fn new(server: &str) -> Result<Self> {
        Ok(HttpClient {
            host: server.to_string(),
            stream: TcpStream::connect(server)?,
        })
    }

    /// Send an HTTP request on the open connection and wait for the answer.
    ///
    /// The request asks the server to close the connection, so drop the object once the
    /// response is retrieved.
    pub fn send(&mut self, method: &str, endpoint: &str, body: &str) -> Result<Response> {
        debug!(method, endpoint, bytes = body.len(), "sending request");

        let content_type = if body.is_empty() {
            ""
        } else {
            "Content-Type: application/json\r\n"
        };
        self.stream.write_all(
            format!(
                "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n{}Content-Length: {}\r\n\r\n{}",
                method,
                endpoint,
                self.host,
                content_type,
                body.len(),
                body
            )
            .as_bytes(),
        )?;

        let response = parse_response(BufReader::new(&mut self.stream))?;
        debug!(method, endpoint, status = ?response.status, "received response");
        Ok(response)
    }
}
