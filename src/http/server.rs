use crate::errors::Result;
use crate::http::{parse_request, Request, Response};
use crate::threadpool::ThreadPool;
use std::io::{BufReader, Write};
use std::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

/// Turn an HTTP status code into its reason phrase
pub fn code_to_string(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// This is the main server.
///
/// It listens for incoming connections on a TCP socket, parses the requests and dispatches them
/// to a handler. Whatever the handler produces is then converted in an HTTP response and sent
/// back to the client.
pub struct HttpServer {
    listener: TcpListener,
}

impl HttpServer {
    /// Create a new server listening on the given address
    pub fn new(addr: &str) -> Result<Self> {
        Ok(HttpServer {
            listener: TcpListener::bind(addr)?,
        })
    }

    /// Address the server is actually bound to
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Start the server
    ///
    /// Calls the handler with the incoming requests, on a threadpool sized after the
    /// available parallelism. Blocks until the listener fails.
    pub fn serve<F>(&self, handler: F)
    where
        F: Fn(Request) -> Response + Send + Sync + 'static + Clone,
    {
        let threadpool = ThreadPool::new(
            std::thread::available_parallelism()
                .map(|x| x.into())
                .unwrap_or(4),
        );
        for stream in self.listener.incoming() {
            match stream {
                Ok(mut stream) => {
                    let handler = handler.clone();
                    threadpool.execute(move || handle_stream(&mut stream, &handler))
                }
                Err(err) => warn!("Failed to accept connection: {}", err),
            }
        }
    }

    /// Listen to a single connection, process its request and return.
    pub fn serve_once<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(Request) -> Response,
    {
        let (mut stream, _) = self.listener.accept()?;
        handle_stream(&mut stream, &handler);
        Ok(())
    }
}

/// Parse an HTTP request from a TCP stream, calls the handler and write back the answer
fn handle_stream<F>(stream: &mut TcpStream, handler: F)
where
    F: Fn(Request) -> Response,
{
    let response = match parse_request(BufReader::new(&mut *stream)) {
        Ok(req) => {
            debug!(method = %req.method, path = %req.path, "handling request");
            handler(req)
        }
        Err(err) => {
            debug!("Rejecting unreadable request: {}", err);
            Response::error(400)
        }
    };
    respond(stream, response);
}

/// Writes an HTTP response to a stream
fn respond(stream: &mut TcpStream, resp: Response) {
    let code = resp.status.unwrap_or(500);
    let status = stream.write_all(
        format!(
            "HTTP/1.1 {} {}\r\nConnection: close\r\nContent-Length: {}\r\n{}\r\n{}",
            code,
            code_to_string(code),
            resp.body.len(),
            resp.headers
                .iter()
                .map(|(k, v)| format!("{}: {}\r\n", k, v))
                .collect::<Vec<_>>()
                .join(""),
            resp.body
        )
        .as_bytes(),
    );

    if let Err(err) = status {
        warn!("Failed to respond: {}", err);
    }
}
