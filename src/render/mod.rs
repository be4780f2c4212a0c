//! Result rendering
//!
//! `view` holds the pure mapping from a check-in response to what the kiosk
//! shows; `display` and `audio` are the side-effecting outputs.

pub mod audio;
pub mod display;
pub mod messages;
pub mod view;

pub use audio::{AudioCue, AudioError, AudioMode, CommandPlayer, Cue, Silent, TerminalBell};
pub use display::{KioskDisplay, TerminalDisplay};
pub use messages::KioskMessages;
pub use view::{CardTone, ResultView};
