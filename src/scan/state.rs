//! Check-in cycle state machine
//!
//! `transition` is pure: it maps the current state and one event to the next
//! state plus the list of effects the controller must carry out. Nothing in
//! here touches the scanner, the network, the display or audio.

use std::time::Duration;

use crate::checkin::{CheckinOutcome, ScanPayload};
use crate::render::{Cue, KioskMessages, ResultView};

/// Sequence number of a check-in cycle, starting at 1
pub type CycleId = u64;

/// Delay after a rendered result before scanning resumes
pub const DEFAULT_RESULT_DELAY: Duration = Duration::from_millis(3000);

/// Delay after a transport failure before scanning resumes
pub const DEFAULT_ERROR_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTiming {
    pub result_delay: Duration,
    pub error_delay: Duration,
}

impl Default for ScanTiming {
    fn default() -> Self {
        Self {
            result_delay: DEFAULT_RESULT_DELAY,
            error_delay: DEFAULT_ERROR_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanLoopState {
    /// Scanner live; `last_cycle` is the most recently completed cycle
    Scanning { last_cycle: CycleId },
    /// Scanner paused, one submission outstanding
    AwaitingResponse { cycle: CycleId, payload: ScanPayload },
    /// Scanner paused until the resume delay elapses
    ShowingResult { cycle: CycleId, panel_visible: bool },
}

impl ScanLoopState {
    pub fn initial() -> Self {
        ScanLoopState::Scanning { last_cycle: 0 }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScanLoopState::Scanning { .. } => "Scanning",
            ScanLoopState::AwaitingResponse { .. } => "AwaitingResponse",
            ScanLoopState::ShowingResult { .. } => "ShowingResult",
        }
    }
}

impl Default for ScanLoopState {
    fn default() -> Self {
        Self::initial()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Decoded(ScanPayload),
    Responded { cycle: CycleId, outcome: CheckinOutcome },
    ResumeElapsed { cycle: CycleId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PauseScanner,
    SetStatus { loading: bool, text: String },
    Submit { cycle: CycleId, payload: ScanPayload },
    ShowResult(ResultView),
    PlayCue(Cue),
    ScheduleResume { cycle: CycleId, after: Duration },
    HideResult,
    ResumeScanner,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ScanLoopState,
    pub effects: Vec<Effect>,
    /// The event was not admissible in the current state and was dropped
    pub ignored: bool,
}

impl Transition {
    fn to(state: ScanLoopState, effects: Vec<Effect>) -> Self {
        Self {
            state,
            effects,
            ignored: false,
        }
    }

    fn ignore(state: &ScanLoopState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
            ignored: true,
        }
    }
}

pub fn transition(
    state: &ScanLoopState,
    event: ScanEvent,
    timing: &ScanTiming,
    messages: &KioskMessages,
) -> Transition {
    match (state, event) {
        (ScanLoopState::Scanning { last_cycle }, ScanEvent::Decoded(payload)) => {
            let cycle = last_cycle + 1;
            Transition::to(
                ScanLoopState::AwaitingResponse {
                    cycle,
                    payload: payload.clone(),
                },
                vec![
                    Effect::PauseScanner,
                    Effect::SetStatus {
                        loading: true,
                        text: messages.validating.clone(),
                    },
                    Effect::Submit { cycle, payload },
                ],
            )
        }

        (
            ScanLoopState::AwaitingResponse { cycle, .. },
            ScanEvent::Responded {
                cycle: answered,
                outcome,
            },
        ) if *cycle == answered => match outcome {
            CheckinOutcome::Answered(response) => {
                let view = ResultView::from_response(&response, messages);
                let cue = view.cue();
                Transition::to(
                    ScanLoopState::ShowingResult {
                        cycle: *cycle,
                        panel_visible: true,
                    },
                    vec![
                        Effect::ShowResult(view),
                        Effect::PlayCue(cue),
                        Effect::ScheduleResume {
                            cycle: *cycle,
                            after: timing.result_delay,
                        },
                    ],
                )
            }
            // Transport failures skip the result card and resume sooner
            unreachable @ CheckinOutcome::Unreachable(_) => Transition::to(
                ScanLoopState::ShowingResult {
                    cycle: *cycle,
                    panel_visible: false,
                },
                vec![
                    Effect::SetStatus {
                        loading: false,
                        text: unreachable
                            .response(&messages.connectivity_error)
                            .message()
                            .to_string(),
                    },
                    Effect::PlayCue(Cue::Error),
                    Effect::ScheduleResume {
                        cycle: *cycle,
                        after: timing.error_delay,
                    },
                ],
            ),
        },

        (
            ScanLoopState::ShowingResult {
                cycle,
                panel_visible,
            },
            ScanEvent::ResumeElapsed { cycle: elapsed },
        ) if *cycle == elapsed => {
            let effects = if *panel_visible {
                vec![
                    Effect::HideResult,
                    Effect::SetStatus {
                        loading: false,
                        text: messages.ready_next.clone(),
                    },
                    Effect::ResumeScanner,
                ]
            } else {
                // The connectivity message stays up until the next decode
                vec![Effect::ResumeScanner]
            };
            Transition::to(ScanLoopState::Scanning { last_cycle: *cycle }, effects)
        }

        (state, _) => Transition::ignore(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::{CheckinReceipt, CheckinResponse, TransportError};
    use crate::render::CardTone;

    fn step(state: &ScanLoopState, event: ScanEvent) -> Transition {
        transition(state, event, &ScanTiming::default(), &KioskMessages::default())
    }

    fn awaiting(cycle: CycleId) -> ScanLoopState {
        ScanLoopState::AwaitingResponse {
            cycle,
            payload: ScanPayload::new("EMP-1"),
        }
    }

    fn accepted() -> CheckinOutcome {
        CheckinOutcome::Answered(CheckinResponse::Accepted(CheckinReceipt {
            full_name: "Nguyen Van A".to_string(),
            status: Some("On time".to_string()),
            status_class: Some("success".to_string()),
            message: "Checked in".to_string(),
            time: Some("08:01".to_string()),
        }))
    }

    fn rejected() -> CheckinOutcome {
        CheckinOutcome::Answered(CheckinResponse::Rejected {
            message: "Already checked in".to_string(),
        })
    }

    fn unreachable() -> CheckinOutcome {
        CheckinOutcome::Unreachable(TransportError::Network {
            url: "http://attendance.local/scan-checkin".to_string(),
            reason: "dns error: failed to lookup address".to_string(),
        })
    }

    #[test]
    fn test_decode_pauses_then_submits() {
        let t = step(&ScanLoopState::initial(), ScanEvent::Decoded(ScanPayload::new("EMP-1")));
        assert!(!t.ignored);
        assert_eq!(t.state, awaiting(1));
        assert_eq!(
            t.effects,
            vec![
                Effect::PauseScanner,
                Effect::SetStatus {
                    loading: true,
                    text: "Validating data...".to_string()
                },
                Effect::Submit {
                    cycle: 1,
                    payload: ScanPayload::new("EMP-1")
                },
            ]
        );
    }

    #[test]
    fn test_decode_while_awaiting_is_ignored() {
        let state = awaiting(1);
        let t = step(&state, ScanEvent::Decoded(ScanPayload::new("EMP-2")));
        assert!(t.ignored);
        assert!(t.effects.is_empty());
        assert_eq!(t.state, state);
    }

    #[test]
    fn test_decode_while_showing_result_is_ignored() {
        let state = ScanLoopState::ShowingResult {
            cycle: 1,
            panel_visible: true,
        };
        let t = step(&state, ScanEvent::Decoded(ScanPayload::new("EMP-2")));
        assert!(t.ignored);
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::Submit { .. })));
    }

    #[test]
    fn test_accepted_response_renders_and_waits_long() {
        let t = step(
            &awaiting(3),
            ScanEvent::Responded {
                cycle: 3,
                outcome: accepted(),
            },
        );
        assert_eq!(
            t.state,
            ScanLoopState::ShowingResult {
                cycle: 3,
                panel_visible: true
            }
        );
        match &t.effects[..] {
            [Effect::ShowResult(view), Effect::PlayCue(Cue::Success), Effect::ScheduleResume { cycle: 3, after }] =>
            {
                assert_eq!(view.name, "Nguyen Van A");
                assert_eq!(view.badge_class, "bg-success");
                assert_eq!(view.badge_text, "On time");
                assert_eq!(view.message, "Checked in");
                assert_eq!(view.time, "08:01");
                assert_eq!(*after, Duration::from_millis(3000));
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_rejected_response_renders_error_card_and_waits_long() {
        let t = step(
            &awaiting(1),
            ScanEvent::Responded {
                cycle: 1,
                outcome: rejected(),
            },
        );
        match &t.effects[..] {
            [Effect::ShowResult(view), Effect::PlayCue(Cue::Error), Effect::ScheduleResume { after, .. }] => {
                assert_eq!(view.tone, CardTone::Error);
                assert_eq!(view.name, "Check-in error");
                assert_eq!(view.badge_class, "bg-danger");
                assert_eq!(view.badge_text, "Failed");
                assert_eq!(view.message, "Already checked in");
                assert_eq!(view.time, "--:--");
                assert_eq!(*after, DEFAULT_RESULT_DELAY);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_transport_failure_skips_card_and_waits_short() {
        let t = step(
            &awaiting(1),
            ScanEvent::Responded {
                cycle: 1,
                outcome: unreachable(),
            },
        );
        assert_eq!(
            t.state,
            ScanLoopState::ShowingResult {
                cycle: 1,
                panel_visible: false
            }
        );
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::ShowResult(_))));
        assert_eq!(
            t.effects,
            vec![
                Effect::SetStatus {
                    loading: false,
                    text: "Server connection error!".to_string()
                },
                Effect::PlayCue(Cue::Error),
                Effect::ScheduleResume {
                    cycle: 1,
                    after: Duration::from_millis(2000)
                },
            ]
        );
    }

    #[test]
    fn test_unreachable_status_uses_configured_connectivity_text() {
        let messages = KioskMessages {
            connectivity_error: "Lỗi kết nối Server!".to_string(),
            ..KioskMessages::default()
        };
        let t = transition(
            &awaiting(1),
            ScanEvent::Responded {
                cycle: 1,
                outcome: unreachable(),
            },
            &ScanTiming::default(),
            &messages,
        );
        assert_eq!(
            t.effects.first(),
            Some(&Effect::SetStatus {
                loading: false,
                text: "Lỗi kết nối Server!".to_string()
            })
        );
    }

    #[test]
    fn test_response_for_other_cycle_is_ignored() {
        let t = step(
            &awaiting(2),
            ScanEvent::Responded {
                cycle: 1,
                outcome: accepted(),
            },
        );
        assert!(t.ignored);
        assert_eq!(t.state, awaiting(2));
    }

    #[test]
    fn test_resume_after_result_hides_card_and_resumes_once() {
        let t = step(
            &ScanLoopState::ShowingResult {
                cycle: 4,
                panel_visible: true,
            },
            ScanEvent::ResumeElapsed { cycle: 4 },
        );
        assert_eq!(t.state, ScanLoopState::Scanning { last_cycle: 4 });
        assert_eq!(
            t.effects,
            vec![
                Effect::HideResult,
                Effect::SetStatus {
                    loading: false,
                    text: "Ready for the next scan...".to_string()
                },
                Effect::ResumeScanner,
            ]
        );
    }

    #[test]
    fn test_resume_after_transport_failure_only_resumes() {
        let t = step(
            &ScanLoopState::ShowingResult {
                cycle: 1,
                panel_visible: false,
            },
            ScanEvent::ResumeElapsed { cycle: 1 },
        );
        assert_eq!(t.effects, vec![Effect::ResumeScanner]);
    }

    #[test]
    fn test_stale_resume_is_ignored() {
        let t = step(&ScanLoopState::Scanning { last_cycle: 1 }, ScanEvent::ResumeElapsed { cycle: 1 });
        assert!(t.ignored);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_same_payload_twice_is_two_cycles() {
        let payload = ScanPayload::new("EMP-1");
        let mut state = ScanLoopState::initial();
        let mut submits = Vec::new();

        for _ in 0..2 {
            let t = step(&state, ScanEvent::Decoded(payload.clone()));
            let cycle = match &t.state {
                ScanLoopState::AwaitingResponse { cycle, .. } => *cycle,
                other => panic!("expected AwaitingResponse, got {other:?}"),
            };
            submits.extend(t.effects.into_iter().filter(|e| matches!(e, Effect::Submit { .. })));
            let t = step(&t.state, ScanEvent::Responded { cycle, outcome: accepted() });
            let t = step(&t.state, ScanEvent::ResumeElapsed { cycle });
            state = t.state;
        }

        assert_eq!(
            submits,
            vec![
                Effect::Submit {
                    cycle: 1,
                    payload: payload.clone()
                },
                Effect::Submit { cycle: 2, payload },
            ]
        );
        assert_eq!(state, ScanLoopState::Scanning { last_cycle: 2 });
    }

    #[test]
    fn test_custom_timing_is_honoured() {
        let timing = ScanTiming {
            result_delay: Duration::from_millis(500),
            error_delay: Duration::from_millis(100),
        };
        let t = transition(
            &awaiting(1),
            ScanEvent::Responded {
                cycle: 1,
                outcome: unreachable(),
            },
            &timing,
            &KioskMessages::default(),
        );
        assert!(t.effects.contains(&Effect::ScheduleResume {
            cycle: 1,
            after: Duration::from_millis(100)
        }));
    }
}
