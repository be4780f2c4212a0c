//! Pure mapping from a check-in response to the result card

use super::audio::Cue;
use super::messages::KioskMessages;
use crate::checkin::CheckinResponse;

/// Badge class used for every rejected check-in
pub const DANGER_BADGE: &str = "bg-danger";

/// Badge class when an accepted check-in carries no status class
pub const NEUTRAL_BADGE: &str = "bg-secondary";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTone {
    Success,
    Error,
}

/// Contents of the result card for one check-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub tone: CardTone,
    pub name: String,
    pub badge_class: String,
    pub badge_text: String,
    pub message: String,
    pub time: String,
}

impl ResultView {
    pub fn from_response(response: &CheckinResponse, messages: &KioskMessages) -> Self {
        match response {
            CheckinResponse::Accepted(receipt) => ResultView {
                tone: CardTone::Success,
                name: receipt.full_name.clone(),
                badge_class: receipt
                    .status_class
                    .as_deref()
                    .map(|class| format!("bg-{class}"))
                    .unwrap_or_else(|| NEUTRAL_BADGE.to_string()),
                badge_text: receipt
                    .status
                    .clone()
                    .unwrap_or_else(|| messages.success_badge.clone()),
                message: receipt.message.clone(),
                time: receipt
                    .time
                    .clone()
                    .unwrap_or_else(|| messages.time_placeholder.clone()),
            },
            CheckinResponse::Rejected { message } => ResultView {
                tone: CardTone::Error,
                name: messages.error_name.clone(),
                badge_class: DANGER_BADGE.to_string(),
                badge_text: messages.failed_badge.clone(),
                message: message.clone(),
                time: messages.time_placeholder.clone(),
            },
        }
    }

    /// Audio cue that accompanies this card
    pub fn cue(&self) -> Cue {
        match self.tone {
            CardTone::Success => Cue::Success,
            CardTone::Error => Cue::Error,
        }
    }
}
