//! Test utilities and fixtures for fmtv tests.
//!
//! Provides the tracks and candidates most tests start from, so each test
//! only spells out what it changes.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{air_track, official_candidate};
//!
//! let track = Track { played_at: 2000, ..air_track() };
//! ```

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use crate::model::{Track, VideoCandidate};

/// The canonical end-to-end track: Air, "La Femme D'Argent", played at 1000.
pub fn air_track() -> Track {
    Track::new("Air", "La Femme D'Argent", "Moon Safari", 1000)
}

/// A track with the given title by the same artist, played at `played_at`.
pub fn track_at(title: &str, played_at: i64) -> Track {
    Track::new("Air", title, "Moon Safari", played_at)
}

/// An "official" search hit with a thumbnail.
pub fn official_candidate() -> VideoCandidate {
    VideoCandidate {
        url: "https://www.youtube.com/watch?v=air-official".to_string(),
        title: "Air - La Femme D'Argent (Official Video)".to_string(),
        description: Some("Taken from Moon Safari".to_string()),
        thumbnail_url: Some("https://i.ytimg.com/vi/air-official/hqdefault.jpg".to_string()),
    }
}

/// Minimal HTTP server for client tests.
///
/// Answers every GET with `200` and the JSON body returned by `respond` for
/// the request target, and records the targets in arrival order.
pub struct StubServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn serve(respond: impl Fn(&str) -> String + Send + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let Ok(read_half) = stream.try_clone() else { continue };
                let mut reader = BufReader::new(read_half);

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut header = String::new();
                    match reader.read_line(&mut header) {
                        Ok(0) | Err(_) => break,
                        Ok(_) if header == "\r\n" => break,
                        Ok(_) => {}
                    }
                }

                let target = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or_default()
                    .to_string();
                let body = respond(&target);
                log.lock().unwrap().push(target);

                let _ = write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
            }
        });

        Self { base_url, requests }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request targets (path and query) seen so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Value of `key` in a request target's query string, undecoded.
pub fn query_param(target: &str, key: &str) -> Option<String> {
    let (_, query) = target.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}
