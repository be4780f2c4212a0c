//! Line oriented scanner adapter
//!
//! Hardware QR readers in keyboard-wedge mode type the decoded text followed
//! by Enter, so one input line is one decode event. The same adapter reads
//! from a FIFO fed by a camera decoder process, or replays a regular file of
//! recorded codes.
//!
//! Live inputs (terminal, pipe, FIFO, device) drop whatever arrived while the
//! scanner was paused. Regular files are replayed line by line.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::error::{Result, ScannerError};
use super::traits::QrScanner;
use crate::checkin::ScanPayload;

/// Decodes buffered between the reader task and the scan loop
const LINE_BUFFER: usize = 64;

type BoxedReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Where decoded lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanSource {
    Stdin,
    File(PathBuf),
}

impl ScanSource {
    /// `-` means stdin, anything else is a path
    pub fn parse(value: &str) -> Self {
        if value == "-" {
            ScanSource::Stdin
        } else {
            ScanSource::File(PathBuf::from(value))
        }
    }
}

impl fmt::Display for ScanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanSource::Stdin => write!(f, "stdin"),
            ScanSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How lines queued while the scanner is paused are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Decodes happen in real time; anything queued while paused is stale
    Live,
    /// Recorded codes; every line is delivered in order
    Recorded,
}

impl InputKind {
    fn of_metadata(metadata: &std::fs::Metadata) -> Self {
        if metadata.is_file() {
            InputKind::Recorded
        } else {
            InputKind::Live
        }
    }
}

/// Kind of whatever stdin is connected to; `kiosk < codes.txt` is recorded
fn stdin_kind() -> InputKind {
    #[cfg(unix)]
    {
        use std::os::fd::AsFd;

        if let Ok(metadata) = std::io::stdin()
            .as_fd()
            .try_clone_to_owned()
            .map(std::fs::File::from)
            .and_then(|file| file.metadata())
        {
            return InputKind::of_metadata(&metadata);
        }
    }
    InputKind::Live
}

pub struct LineScanner {
    name: String,
    kind: InputKind,
    source: Option<ScanSource>,
    reader: Option<BoxedReader>,
    lines: Option<mpsc::Receiver<String>>,
    reader_task: Option<JoinHandle<()>>,
    paused: bool,
}

impl LineScanner {
    pub fn new(source: ScanSource) -> Self {
        Self {
            name: source.to_string(),
            kind: InputKind::Live,
            source: Some(source),
            reader: None,
            lines: None,
            reader_task: None,
            paused: false,
        }
    }

    /// Scanner over an already open reader
    pub fn from_reader<R>(name: impl Into<String>, reader: R, kind: InputKind) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self {
            name: name.into(),
            kind,
            source: None,
            reader: Some(Box::new(reader)),
            lines: None,
            reader_task: None,
            paused: false,
        }
    }

    async fn open(&mut self) -> Result<BoxedReader> {
        if let Some(reader) = self.reader.take() {
            return Ok(reader);
        }

        match &self.source {
            Some(ScanSource::Stdin) => {
                self.kind = stdin_kind();
                Ok(Box::new(BufReader::new(tokio::io::stdin())))
            }
            Some(ScanSource::File(path)) => {
                let name = self.name.clone();
                let unavailable = |e: std::io::Error| ScannerError::Unavailable {
                    source_name: name.clone(),
                    reason: e.to_string(),
                };
                let file = tokio::fs::File::open(path).await.map_err(unavailable)?;
                let metadata = file.metadata().await.map_err(unavailable)?;
                self.kind = InputKind::of_metadata(&metadata);
                Ok(Box::new(BufReader::new(file)))
            }
            None => Err(ScannerError::Unavailable {
                source_name: self.name.clone(),
                reason: "no input configured".to_string(),
            }),
        }
    }
}

fn spawn_reader(name: String, reader: BoxedReader, tx: mpsc::Sender<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    log::debug!("scanner input {name} reached end of input");
                    break;
                }
                Err(e) => {
                    log::warn!("scanner input {name} failed: {e}");
                    break;
                }
            }
        }
    })
}

#[async_trait]
impl QrScanner for LineScanner {
    async fn start(&mut self) -> Result<()> {
        if self.lines.is_some() {
            return Err(ScannerError::AlreadyStarted);
        }

        let reader = self.open().await?;
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        self.reader_task = Some(spawn_reader(self.name.clone(), reader, tx));
        self.lines = Some(rx);
        log::info!("scanner started on {} ({:?} input)", self.name, self.kind);
        Ok(())
    }

    async fn next_decode(&mut self) -> Result<Option<ScanPayload>> {
        if self.paused {
            return Err(ScannerError::Paused);
        }
        let lines = self.lines.as_mut().ok_or(ScannerError::NotStarted)?;

        while let Some(line) = lines.recv().await {
            let text = line.trim_end_matches(['\r', '\n']);
            if text.is_empty() {
                continue;
            }
            return Ok(Some(ScanPayload::new(text)));
        }
        Ok(None)
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        if !self.paused {
            return;
        }

        self.paused = false;
        if self.kind == InputKind::Recorded {
            return;
        }

        // Anything queued while paused is stale
        let mut dropped = 0usize;
        if let Some(lines) = self.lines.as_mut() {
            while lines.try_recv().is_ok() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::warn!(
                "dropped {dropped} decode(s) received on {} while paused",
                self.name
            );
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl Drop for LineScanner {
    fn drop(&mut self) {
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
    }
}
