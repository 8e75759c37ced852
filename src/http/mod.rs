pub mod server;
pub use server::*;

pub mod request;
pub use request::*;

pub mod response;
pub use response::*;

pub mod client;
pub use client::*;

use crate::errors::{Error, Result};
use std::io::{BufReader, Read};

/// Size of the chunks read from the socket while assembling a message
const CHUNK_SIZE: usize = 4096;

/// Maximum number of headers accepted in a single message
pub(crate) const MAX_HEADERS: usize = 64;

/// Read another chunk from the stream into `buf`.
///
/// A closed stream in the middle of a message is reported as `ConnectionReset`.
pub(crate) fn fill_buffer<T: Read>(reader: &mut BufReader<T>, buf: &mut Vec<u8>) -> Result<()> {
    let mut chunk = [0; CHUNK_SIZE];
    let bytes_read = reader.read(&mut chunk)?;
    if bytes_read == 0 {
        return Err(Error::ConnectionReset);
    }
    buf.extend_from_slice(&chunk[..bytes_read]);
    Ok(())
}

/// Copy the headers parsed by httparse into owned pairs
pub(crate) fn owned_headers(headers: &[httparse::Header<'_>]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|h| {
            (
                h.name.to_string(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect()
}

/// Value of the Content-Length header, 0 when absent or unreadable
pub(crate) fn content_length(headers: &[(String, String)]) -> usize {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0)
}

/// Finish reading a message whose head ends at `parsed_len`.
///
/// Anything past the announced body length is dropped. There is no keep-alive, so a
/// connection never carries a second message.
pub(crate) fn read_body<T: Read>(
    reader: &mut BufReader<T>,
    mut buf: Vec<u8>,
    parsed_len: usize,
    body_len: usize,
) -> Result<String> {
    while buf.len() - parsed_len < body_len {
        fill_buffer(reader, &mut buf)?;
    }
    Ok(String::from_utf8_lossy(&buf[parsed_len..parsed_len + body_len]).to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_content_length_lookup() {
        let headers = vec![
            ("Host".to_string(), "localhost".to_string()),
            ("content-length".to_string(), " 12".to_string()),
        ];
        assert_eq!(content_length(&headers), 12);
        assert_eq!(content_length(&[]), 0);
    }

    #[test]
    fn test_loopback_exchange() {
        // Fixed port, may collide with another process on a busy machine
        static ADDR: &str = "127.0.0.1:18422";

        let handle = std::thread::spawn(|| {
            let server = HttpServer::new(ADDR);
            match server {
                Ok(s) => {
                    if let Err(err) = s.serve_once(|request| {
                        Response::ok_with_body(format!("{} {}", request.method, request.body))
                    }) {
                        eprintln!("Server failed: {}", err);
                    }
                }
                Err(err) => eprintln!("Failed to spawn server: {}", err),
            }
        });

        let mut client = (|| {
            for _ in 1..10 {
                match HttpClient::new(ADDR) {
                    Ok(c) => return Some(c),
                    Err(_) => std::thread::sleep(std::time::Duration::from_millis(10)),
                }
            }
            None
        })()
        .expect("Failed to connect client");

        let resp = client
            .send("POST", "/favorites", "{\"id\": 1}")
            .expect("Failed to communicate with server");

        assert_eq!(resp.status, Some(200));
        assert_eq!(resp.body, "POST {\"id\": 1}");

        handle.join().unwrap();
    }
}
