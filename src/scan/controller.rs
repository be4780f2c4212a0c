//! Scan loop controller
//!
//! Feeds scanner, network and timer events into the state machine and
//! carries out the effects it returns. Only one event source is live at a
//! time: the scanner while scanning, the submission while awaiting a
//! response, the resume timer while a result is showing.

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::Instant;

use super::error::{Result, ScanError};
use super::state::{transition, CycleId, Effect, ScanEvent, ScanLoopState, ScanTiming};
use super::stats::{EventKind, ScanStatistics};
use crate::checkin::{CheckinClient, ScanPayload};
use crate::render::{AudioCue, KioskDisplay, KioskMessages};
use crate::scanner::QrScanner;

pub struct ScanLoopController {
    scanner: Box<dyn QrScanner>,
    client: Arc<dyn CheckinClient>,
    display: Box<dyn KioskDisplay>,
    audio: Box<dyn AudioCue>,
    timing: ScanTiming,
    messages: KioskMessages,
    state: ScanLoopState,
    in_flight: Option<(CycleId, ScanPayload)>,
    resume_at: Option<(CycleId, Instant)>,
    stats: ScanStatistics,
}

impl ScanLoopController {
    pub fn new(
        scanner: Box<dyn QrScanner>,
        client: Arc<dyn CheckinClient>,
        display: Box<dyn KioskDisplay>,
        audio: Box<dyn AudioCue>,
    ) -> Self {
        Self {
            scanner,
            client,
            display,
            audio,
            timing: ScanTiming::default(),
            messages: KioskMessages::default(),
            state: ScanLoopState::initial(),
            in_flight: None,
            resume_at: None,
            stats: ScanStatistics::default(),
        }
    }

    pub fn with_timing(mut self, timing: ScanTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_messages(mut self, messages: KioskMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn state(&self) -> &ScanLoopState {
        &self.state
    }

    pub fn statistics(&self) -> &ScanStatistics {
        &self.stats
    }

    /// Run check-in cycles until shutdown or until the scanner input ends.
    ///
    /// A scanner that cannot be started leaves a persistent status message on
    /// the display and ends the loop with `ScanError::ScannerUnavailable`.
    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<ScanStatistics> {
        if let Err(e) = self.scanner.start().await {
            log::error!("scanner {} unavailable: {e}", self.scanner.describe());
            self.display
                .set_status(false, &self.messages.scanner_unavailable);
            return Err(ScanError::ScannerUnavailable(e));
        }
        self.display.set_status(false, &self.messages.ready);

        loop {
            let event = tokio::select! {
                _ = shutdown_rx.recv() => {
                    log::info!("shutdown requested, stopping scan loop in state {}", self.state.name());
                    break;
                }
                event = self.next_event() => event?,
            };

            match event {
                Some(event) => self.dispatch(event),
                None => {
                    log::info!("scanner input exhausted");
                    break;
                }
            }
        }

        log::info!("{}", self.stats);
        Ok(self.stats)
    }

    /// Wait for the one event the current cycle is waiting on
    async fn next_event(&mut self) -> Result<Option<ScanEvent>> {
        if let Some((cycle, payload)) = self.in_flight.take() {
            log::debug!("cycle {cycle}: submitting '{payload}'");
            let outcome = self.client.submit(&payload).await;
            return Ok(Some(ScanEvent::Responded { cycle, outcome }));
        }

        if let Some((cycle, deadline)) = self.resume_at.take() {
            tokio::time::sleep_until(deadline).await;
            return Ok(Some(ScanEvent::ResumeElapsed { cycle }));
        }

        let decoded = self.scanner.next_decode().await?;
        Ok(decoded.map(ScanEvent::Decoded))
    }

    /// Apply one event to the state machine and execute the resulting effects
    pub fn dispatch(&mut self, event: ScanEvent) {
        let kind = EventKind::of(&event);
        let next = transition(&self.state, event, &self.timing, &self.messages);
        self.stats.record(kind, next.ignored);

        if next.ignored {
            log::debug!("ignored {kind:?} event in state {}", self.state.name());
            return;
        }

        log::debug!("{} -> {}", self.state.name(), next.state.name());
        self.state = next.state;
        for effect in next.effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::PauseScanner => self.scanner.pause(),
            Effect::SetStatus { loading, text } => self.display.set_status(loading, &text),
            Effect::Submit { cycle, payload } => {
                log::info!("cycle {cycle}: scan received");
                self.in_flight = Some((cycle, payload));
            }
            Effect::ShowResult(view) => {
                log::info!("{}: {} ({})", view.name, view.badge_text, view.message);
                self.display.show_result(&view);
            }
            // Best-effort: a missing player or a closed terminal never stalls the loop
            Effect::PlayCue(cue) => {
                if let Err(e) = self.audio.play(cue) {
                    log::debug!("audio cue {cue:?} not played: {e}");
                }
            }
            Effect::ScheduleResume { cycle, after } => {
                self.resume_at = Some((cycle, Instant::now() + after));
            }
            Effect::HideResult => self.display.hide_result(),
            Effect::ResumeScanner => self.scanner.resume(),
        }
    }
}
