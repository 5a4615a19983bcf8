//! [`TarballServer`], a minimal HTTP server for download tests.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

/// Path the tarball is served at; every other path answers 404.
pub const TARBALL_PATH: &str = "/tarball.tar.gz";

/// Serves a tarball over plain HTTP on a loopback port.
///
/// The body is produced per request, so edits to a fixture between two
/// downloads are visible to the second one. The server stops when dropped.
pub struct TarballServer {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl TarballServer {
    pub fn serve<F>(body: F) -> Self
    where
        F: Fn() -> Vec<u8> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(AtomicBool::new(false));
        let requests = Arc::new(AtomicUsize::new(0));

        let handle = {
            let shutdown = Arc::clone(&shutdown);
            let requests = Arc::clone(&requests);
            thread::spawn(move || {
                for stream in listener.incoming() {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Ok(stream) = stream {
                        requests.fetch_add(1, Ordering::SeqCst);
                        let _ = respond(stream, &body);
                    }
                }
            })
        };

        Self {
            addr,
            shutdown,
            requests,
            handle: Some(handle),
        }
    }

    /// URL of the served tarball.
    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, TARBALL_PATH)
    }

    /// URL of a path that answers 404.
    pub fn missing_url(&self) -> String {
        format!("http://{}/missing.tar.gz", self.addr)
    }

    /// Number of connections handled so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for TarballServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the accept loop so it can observe the flag
        let _ = TcpStream::connect(self.addr);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn respond<F>(mut stream: TcpStream, body: &F) -> std::io::Result<()>
where
    F: Fn() -> Vec<u8>,
{
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (status, content) = if path == TARBALL_PATH {
        ("200 OK", body())
    } else {
        ("404 Not Found", b"not found".to_vec())
    };

    write!(
        stream,
        "HTTP/1.1 {status}\r\nContent-Type: application/gzip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        content.len()
    )?;
    stream.write_all(&content)?;
    stream.flush()
}
