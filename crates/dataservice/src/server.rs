#![forbid(unsafe_code)]

use crate::db::{DataError, Database};
use fm_core::EntityId;
use serde_json::{Value, json};
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

const MAX_HEADER_BYTES: usize = 16 * 1024;
/// Floor plans and space images travel inline as data URIs.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Option<Value>,
}

impl Reply {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    fn from_data_error(err: &DataError) -> Self {
        Self::error(err.status(), err.to_string())
    }

    pub fn is_mutation_success(&self, method: &str) -> bool {
        (200..300).contains(&self.status) && method != "GET" && method != "OPTIONS"
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        413 => "Payload Too Large",
        _ => "Internal Server Error",
    }
}

fn parse_body(body: &[u8]) -> Result<Value, Reply> {
    serde_json::from_slice(body).map_err(|err| Reply::error(400, format!("invalid JSON: {err}")))
}

/// Non-empty path segments, percent-decoded one by one. `None` when a segment does not
/// decode to UTF-8.
fn segments(path: &str) -> Option<Vec<String>> {
    let path = path.split('?').next().unwrap_or(path);
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::decode(s).ok().map(|decoded| decoded.into_owned()))
        .collect()
}

/// Resolve one request against the database. Socket-free so the routing table can be
/// exercised directly.
pub fn route(db: &mut Database, method: &str, path: &str, body: &[u8]) -> Reply {
    if method == "OPTIONS" {
        return Reply {
            status: 204,
            body: None,
        };
    }
    let Some(decoded) = segments(path) else {
        return Reply::error(400, format!("malformed path {path}"));
    };
    let parts: Vec<&str> = decoded.iter().map(String::as_str).collect();
    let result = match parts.as_slice() {
        ["db"] if method == "GET" => Ok(Reply::json(200, db.to_document())),
        [collection] => match method {
            "GET" => db
                .list(collection)
                .map(|records| {
                    let rows = records.iter().cloned().map(Value::Object).collect();
                    Reply::json(200, Value::Array(rows))
                }),
            "POST" => match parse_body(body) {
                Ok(value) => db
                    .insert(collection, value)
                    .map(|record| Reply::json(201, Value::Object(record))),
                Err(reply) => return reply,
            },
            _ => return Reply::error(405, format!("{method} not allowed on /{collection}")),
        },
        [collection, raw_id] => {
            let Ok(id) = EntityId::try_new(*raw_id) else {
                return Reply::error(404, format!("{collection}/{raw_id} not found"));
            };
            match method {
                "GET" => db
                    .get(collection, &id)
                    .map(|record| Reply::json(200, Value::Object(record.clone()))),
                "PATCH" | "PUT" => match parse_body(body) {
                    Ok(value) if method == "PATCH" => db
                        .patch(collection, &id, value)
                        .map(|record| Reply::json(200, Value::Object(record))),
                    Ok(value) => db
                        .replace(collection, &id, value)
                        .map(|record| Reply::json(200, Value::Object(record))),
                    Err(reply) => return reply,
                },
                "DELETE" => db
                    .remove(collection, &id)
                    .map(|_| Reply::json(200, json!({}))),
                _ => {
                    return Reply::error(405, format!("{method} not allowed on /{collection}/{raw_id}"));
                }
            }
        }
        _ => return Reply::error(404, format!("no route for {path}")),
    };
    result.unwrap_or_else(|err| Reply::from_data_error(&err))
}

struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

enum ReadOutcome {
    Request(HttpRequest),
    TooLarge,
    Empty,
}

/// One read from a socket with a read timeout; a timeout counts as end of input.
fn read_chunk(stream: &mut TcpStream, buf: &mut [u8]) -> std::io::Result<usize> {
    match stream.read(buf) {
        Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(0),
        other => other,
    }
}

fn find_blank_line(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4)
}

/// Request line and the one header the service cares about.
struct Head {
    method: String,
    path: String,
    content_length: usize,
}

fn parse_head(head: &[u8]) -> Option<Head> {
    let text = String::from_utf8_lossy(head);
    let mut lines = text.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_ascii_uppercase();
    let path = request_line.next().unwrap_or("/").to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0);
    Some(Head {
        method,
        path,
        content_length,
    })
}

fn read_request(stream: &mut TcpStream) -> std::io::Result<ReadOutcome> {
    let mut buf = [0u8; 8192];
    let mut data = Vec::new();
    let head_end = loop {
        if let Some(end) = find_blank_line(&data) {
            break end;
        }
        if data.len() > MAX_HEADER_BYTES {
            break data.len();
        }
        let read = read_chunk(stream, &mut buf)?;
        if read == 0 {
            break data.len();
        }
        data.extend_from_slice(&buf[..read]);
    };

    let Some(head) = parse_head(&data[..head_end]) else {
        return Ok(ReadOutcome::Empty);
    };
    if head.content_length > MAX_BODY_BYTES {
        return Ok(ReadOutcome::TooLarge);
    }

    let mut body = data.split_off(head_end);
    while body.len() < head.content_length {
        let read = read_chunk(stream, &mut buf)?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&buf[..read]);
    }
    body.truncate(head.content_length);

    Ok(ReadOutcome::Request(HttpRequest {
        method: head.method,
        path: head.path,
        body,
    }))
}

fn write_response(stream: &mut TcpStream, reply: &Reply) -> std::io::Result<()> {
    let body = match &reply.body {
        Some(value) => serde_json::to_vec(value)?,
        None => Vec::new(),
    };
    let mut headers = String::new();
    headers.push_str(&format!("HTTP/1.1 {} {}\r\n", reply.status, reason(reply.status)));
    headers.push_str("Content-Type: application/json; charset=utf-8\r\n");
    headers.push_str("Cache-Control: no-store\r\n");
    headers.push_str("Access-Control-Allow-Origin: *\r\n");
    headers.push_str("Access-Control-Allow-Methods: GET, POST, PUT, PATCH, DELETE, OPTIONS\r\n");
    headers.push_str("Access-Control-Allow-Headers: Content-Type\r\n");
    headers.push_str("Connection: close\r\n");
    headers.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));

    stream.write_all(headers.as_bytes())?;
    stream.write_all(&body)?;
    stream.flush()
}

fn lock(db: &Mutex<Database>) -> MutexGuard<'_, Database> {
    db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Shared {
    db: Mutex<Database>,
    persist: Option<PathBuf>,
}

fn handle_connection(mut stream: TcpStream, shared: &Shared) -> std::io::Result<()> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let request = match read_request(&mut stream)? {
        ReadOutcome::Request(request) => request,
        ReadOutcome::TooLarge => {
            return write_response(&mut stream, &Reply::error(413, "request body too large"));
        }
        ReadOutcome::Empty => return Ok(()),
    };

    let reply = {
        let mut db = lock(&shared.db);
        let reply = route(&mut db, &request.method, &request.path, &request.body);
        if reply.is_mutation_success(&request.method)
            && let Some(path) = &shared.persist
            && let Err(err) = db.save(path)
        {
            tracing::warn!(path = %path.display(), error = %err, "failed to persist database");
        }
        reply
    };
    tracing::info!(
        method = %request.method,
        path = %request.path,
        status = reply.status,
        "request"
    );
    write_response(&mut stream, &reply)
}

fn serve(listener: TcpListener, shared: Arc<Shared>, shutdown: Arc<AtomicBool>) -> std::io::Result<()> {
    listener.set_nonblocking(true)?;
    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, _)) => {
                // Accepted sockets inherit nonblocking mode on some platforms.
                let _ = stream.set_nonblocking(false);
                if let Err(err) = handle_connection(stream, &shared) {
                    tracing::debug!(error = %err, "connection dropped");
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(err) => {
                tracing::debug!(error = %err, "accept failed");
            }
        }
    }
    Ok(())
}

/// A running service on a loopback port. Dropping it stops the accept loop.
pub struct DataService {
    addr: SocketAddr,
    shared: Arc<Shared>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl std::fmt::Debug for DataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataService")
            .field("addr", &self.addr)
            .finish_non_exhaustive()
    }
}

impl DataService {
    /// Bind `127.0.0.1:port` (0 picks a free port) and serve on a background thread.
    pub fn start(db: Database, port: u16) -> std::io::Result<Self> {
        Self::start_with(db, port, None)
    }

    /// Like [`DataService::start`], writing the document to `persist` after every mutation.
    pub fn start_with(db: Database, port: u16, persist: Option<PathBuf>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port))?;
        let addr = listener.local_addr()?;
        let shared = Arc::new(Shared {
            db: Mutex::new(db),
            persist,
        });
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = {
            let shared = Arc::clone(&shared);
            let shutdown = Arc::clone(&shutdown);
            std::thread::Builder::new()
                .name("fm-dataservice".to_string())
                .spawn(move || serve(listener, shared, shutdown))?
        };
        tracing::info!(%addr, "data service listening");
        Ok(Self {
            addr,
            shared,
            shutdown,
            handle: Some(handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn snapshot(&self) -> Value {
        lock(&self.shared.db).to_document()
    }

    /// Block the calling thread until the accept loop exits.
    pub fn join(mut self) -> std::io::Result<()> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("data service thread panicked"))),
            None => Ok(()),
        }
    }

    pub fn shutdown(mut self) -> std::io::Result<()> {
        self.shutdown.store(true, Ordering::Relaxed);
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("data service thread panicked"))),
            None => Ok(()),
        }
    }
}

impl Drop for DataService {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
