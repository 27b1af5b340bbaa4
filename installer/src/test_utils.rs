//! Shared test utilities for the installer crate.
//!
//! Builds ZIP fixtures and runs a local HTTP server so download, extraction
//! and install steps can be exercised without network access.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use zip::write::SimpleFileOptions;

/// One entry to place in a fixture archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    name: String,
    contents: Option<Vec<u8>>,
    mode: Option<u32>,
}

impl ArchiveEntry {
    /// A file entry with the given contents.
    pub fn file(name: &str, contents: &[u8]) -> Self {
        Self {
            name: name.to_owned(),
            contents: Some(contents.to_vec()),
            mode: None,
        }
    }

    /// A directory entry.
    pub fn dir(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            contents: None,
            mode: None,
        }
    }

    /// Record a Unix mode for this entry.
    #[must_use]
    pub const fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Write a ZIP archive containing `entries` to `path`.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn write_zip(path: &Path, entries: &[ArchiveEntry]) {
    let file = File::create(path).expect("create fixture archive");
    let mut writer = zip::ZipWriter::new(file);
    for entry in entries {
        let mut options = SimpleFileOptions::default();
        if let Some(mode) = entry.mode {
            options = options.unix_permissions(mode);
        }
        match &entry.contents {
            Some(contents) => {
                writer
                    .start_file(entry.name.as_str(), options)
                    .expect("start fixture entry");
                writer.write_all(contents).expect("write fixture entry");
            }
            None => writer
                .add_directory(entry.name.as_str(), options)
                .expect("add fixture directory"),
        }
    }
    writer.finish().expect("finish fixture archive");
}

/// Build a ZIP archive in memory.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn zip_bytes(entries: &[ArchiveEntry]) -> Vec<u8> {
    let temp = tempfile::tempdir().expect("fixture temp dir");
    let path = temp.path().join("fixture.zip");
    write_zip(&path, entries);
    std::fs::read(&path).expect("read fixture archive")
}

/// The response a fixture server sends to every request.
#[derive(Debug, Clone)]
pub struct ServedResponse {
    status: u16,
    body: Vec<u8>,
}

impl ServedResponse {
    /// A 200 response with the given body.
    pub const fn ok(body: Vec<u8>) -> Self {
        Self { status: 200, body }
    }

    /// An empty response with the given status.
    pub const fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

/// A local HTTP server answering every request with a fixed response.
///
/// The server stops when dropped.
pub struct ArchiveServer {
    server: Arc<tiny_http::Server>,
    url: String,
    requests: Arc<AtomicUsize>,
    worker: Option<JoinHandle<()>>,
}

impl ArchiveServer {
    /// URL of the served archive.
    pub fn url(&self) -> String {
        self.url.clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for ArchiveServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                // The worker only panics if responding panicked; nothing to clean up.
            }
        }
    }
}

/// Start a server on a free local port.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub fn serve(response: ServedResponse) -> ArchiveServer {
    let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").expect("bind fixture server"));
    let port = server
        .server_addr()
        .to_ip()
        .expect("fixture server has an IP address")
        .port();
    let requests = Arc::new(AtomicUsize::new(0));

    let worker = {
        let listener = Arc::clone(&server);
        let counter = Arc::clone(&requests);
        std::thread::spawn(move || {
            for request in listener.incoming_requests() {
                counter.fetch_add(1, Ordering::SeqCst);
                let reply = tiny_http::Response::from_data(response.body.clone())
                    .with_status_code(response.status);
                if request.respond(reply).is_err() {
                    // Client hung up; keep serving.
                }
            }
        })
    };

    ArchiveServer {
        server,
        url: format!("http://127.0.0.1:{port}/wintun.zip"),
        requests,
        worker: Some(worker),
    }
}
