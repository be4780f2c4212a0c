//! Scanner capability trait

use async_trait::async_trait;

use super::error::Result;
use crate::checkin::ScanPayload;

/// Capability surface of a QR scanner.
///
/// * `start` acquires the device; it fails when no device is available.
/// * `next_decode` yields the next decode event, `Ok(None)` once the input is
///   exhausted. It is an error to ask for a decode while paused.
/// * `pause` stops decode delivery without releasing the device; `resume`
///   re-enables it. Both are idempotent and nothing decoded while paused is
///   delivered after `resume`.
#[async_trait]
pub trait QrScanner: Send {
    async fn start(&mut self) -> Result<()>;

    async fn next_decode(&mut self) -> Result<Option<ScanPayload>>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// Human readable name of the input, for logs
    fn describe(&self) -> String;
}
