//! Common test utilities and helpers
//!
//! Scripted stand-ins for the scanner, check-in server, display and audio
//! that all write into one time-stamped journal, plus a one-shot HTTP
//! server for exercising the real check-in client.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::Instant;

use attendance_kiosk::checkin::{CheckinClient, CheckinOutcome, ScanPayload};
use attendance_kiosk::render::{AudioCue, AudioError, Cue, KioskDisplay, ResultView};
use attendance_kiosk::scanner::{QrScanner, ScannerError};

/// Ordered record of everything the scan loop did, with the time since the
/// journal was created
#[derive(Clone)]
pub struct Journal {
    start: Instant,
    entries: Arc<Mutex<Vec<(Duration, String)>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries
            .lock()
            .unwrap()
            .push((self.start.elapsed(), entry.into()));
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    /// Time of the n-th (0-based) entry starting with `prefix`
    pub fn time_of(&self, prefix: &str, nth: usize) -> Duration {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e)| e.starts_with(prefix))
            .nth(nth)
            .map(|(at, _)| *at)
            .unwrap_or_else(|| panic!("no entry #{nth} starting with '{prefix}'"))
    }
}

/// Scanner that yields a fixed script of decodes, each after a delay
pub struct ScriptedScanner {
    journal: Journal,
    script: VecDeque<(Duration, String)>,
    fail_start: bool,
    paused: bool,
}

impl ScriptedScanner {
    pub fn new(journal: &Journal, script: &[(u64, &str)]) -> Self {
        Self {
            journal: journal.clone(),
            script: script
                .iter()
                .map(|(ms, text)| (Duration::from_millis(*ms), text.to_string()))
                .collect(),
            fail_start: false,
            paused: false,
        }
    }

    pub fn unavailable(journal: &Journal) -> Self {
        Self {
            fail_start: true,
            ..Self::new(journal, &[])
        }
    }
}

#[async_trait]
impl QrScanner for ScriptedScanner {
    async fn start(&mut self) -> Result<(), ScannerError> {
        if self.fail_start {
            return Err(ScannerError::Unavailable {
                source_name: "camera".to_string(),
                reason: "NotFoundError: Requested device not found".to_string(),
            });
        }
        self.journal.record("scanner:start");
        Ok(())
    }

    async fn next_decode(&mut self) -> Result<Option<ScanPayload>, ScannerError> {
        if self.paused {
            return Err(ScannerError::Paused);
        }
        match self.script.pop_front() {
            Some((delay, text)) => {
                tokio::time::sleep(delay).await;
                self.journal.record(format!("scanner:decode {text}"));
                Ok(Some(ScanPayload::new(text)))
            }
            None => Ok(None),
        }
    }

    fn pause(&mut self) {
        self.paused = true;
        self.journal.record("scanner:pause");
    }

    fn resume(&mut self) {
        self.paused = false;
        self.journal.record("scanner:resume");
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Check-in client answering from a queue of outcomes after a fixed latency
pub struct MockClient {
    journal: Journal,
    outcomes: Mutex<VecDeque<CheckinOutcome>>,
    latency: Duration,
}

impl MockClient {
    pub fn new(journal: &Journal, latency_ms: u64, outcomes: Vec<CheckinOutcome>) -> Self {
        Self {
            journal: journal.clone(),
            outcomes: Mutex::new(outcomes.into()),
            latency: Duration::from_millis(latency_ms),
        }
    }
}

#[async_trait]
impl CheckinClient for MockClient {
    async fn submit(&self, payload: &ScanPayload) -> CheckinOutcome {
        self.journal.record(format!("client:submit {payload}"));
        tokio::time::sleep(self.latency).await;
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("more submissions than scripted outcomes")
    }
}

/// Display that journals every call
pub struct RecordingDisplay {
    journal: Journal,
}

impl RecordingDisplay {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl KioskDisplay for RecordingDisplay {
    fn set_status(&mut self, loading: bool, text: &str) {
        let spinner = if loading { "spinner " } else { "" };
        self.journal.record(format!("display:status {spinner}{text}"));
    }

    fn show_result(&mut self, view: &ResultView) {
        self.journal.record(format!(
            "display:show {:?} {} [{} {}] {} @ {}",
            view.tone, view.name, view.badge_class, view.badge_text, view.message, view.time
        ));
    }

    fn hide_result(&mut self) {
        self.journal.record("display:hide");
    }
}

/// Audio that journals cues, optionally failing every one of them
pub struct RecordingAudio {
    journal: Journal,
    fail: bool,
}

impl RecordingAudio {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail: false,
        }
    }

    pub fn failing(journal: &Journal) -> Self {
        Self {
            fail: true,
            ..Self::new(journal)
        }
    }
}

impl AudioCue for RecordingAudio {
    fn play(&self, cue: Cue) -> Result<(), AudioError> {
        self.journal.record(format!("audio:{cue:?}"));
        if self.fail {
            return Err(AudioError::Spawn {
                program: "paplay".to_string(),
                reason: "playback blocked".to_string(),
            });
        }
        Ok(())
    }
}

/// What the one-shot server received
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

/// HTTP server that answers exactly one request with a canned response
pub struct OneShotServer {
    pub base_url: String,
    pub request: oneshot::Receiver<CapturedRequest>,
}

pub async fn serve_once(status: u16, body: &str) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();
    let body = body.to_string();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let _ = tx.send(request);

        let response = format!(
            "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    OneShotServer {
        base_url,
        request: rx,
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before request head");
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buffer.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    CapturedRequest {
        head,
        body: String::from_utf8_lossy(&buffer[head_end..]).to_string(),
    }
}
