//! Audio cues
//!
//! Playback is best-effort: the scan loop logs a failed cue and moves on.

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Success,
    Error,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to write bell: {0}")]
    Bell(#[from] std::io::Error),

    #[error("failed to start player '{program}': {reason}")]
    Spawn { program: String, reason: String },
}

/// Plays one of the two cues without waiting for playback to end
pub trait AudioCue: Send + Sync {
    fn play(&self, cue: Cue) -> Result<(), AudioError>;
}

/// How cues are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    Bell,
    Command,
    None,
}

impl FromStr for AudioMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bell" => Ok(AudioMode::Bell),
            "command" => Ok(AudioMode::Command),
            "none" | "off" => Ok(AudioMode::None),
            other => Err(format!(
                "unknown audio mode '{other}' (expected bell, command or none)"
            )),
        }
    }
}

/// Terminal bell on stderr: one BEL for success, two for an error
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AudioCue for TerminalBell {
    fn play(&self, cue: Cue) -> Result<(), AudioError> {
        let bells: &[u8] = match cue {
            Cue::Success => b"\x07",
            Cue::Error => b"\x07\x07",
        };
        let mut stderr = std::io::stderr();
        stderr.write_all(bells)?;
        stderr.flush()?;
        Ok(())
    }
}

/// Runs an external player (`paplay`, `aplay`, ...) with the cue's sound file
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    success_sound: PathBuf,
    error_sound: PathBuf,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, success_sound: PathBuf, error_sound: PathBuf) -> Self {
        Self {
            program: program.into(),
            success_sound,
            error_sound,
        }
    }

    fn sound_for(&self, cue: Cue) -> &PathBuf {
        match cue {
            Cue::Success => &self.success_sound,
            Cue::Error => &self.error_sound,
        }
    }
}

impl AudioCue for CommandPlayer {
    fn play(&self, cue: Cue) -> Result<(), AudioError> {
        let mut child = tokio::process::Command::new(&self.program)
            .arg(self.sound_for(cue))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AudioError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        let program = self.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    log::debug!("audio player {program} exited with {status}")
                }
                Ok(_) => {}
                Err(e) => log::debug!("audio player {program} could not be awaited: {e}"),
            }
        });
        Ok(())
    }
}

/// No audio at all
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioCue for Silent {
    fn play(&self, _cue: Cue) -> Result<(), AudioError> {
        Ok(())
    }
}
