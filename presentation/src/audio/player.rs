use docchat_domain::AudioClip;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::debug;

/// Errors raised while exporting or playing a clip
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Could not write audio to '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No audio player configured (set speech.player, e.g. \"mpv --no-video\")")]
    NoPlayer,

    #[error("Could not start player '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Player '{command}' exited with {status}")]
    PlayerFailed { command: String, status: ExitStatus },
}

/// Write the clip to `path`, creating parent directories.
pub fn save_clip(clip: &AudioClip, path: &Path) -> Result<(), AudioError> {
    let write_error = |source| AudioError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, clip.bytes()).map_err(write_error)?;
    debug!("Saved {} bytes of audio to {}", clip.len(), path.display());
    Ok(())
}

/// Play the clip through an external command.
///
/// The clip is written to a transient file whose path is appended to the
/// player's arguments; the file is removed once the player exits.
pub fn play_clip(clip: &AudioClip, player: &str) -> Result<(), AudioError> {
    let mut parts = player.split_whitespace();
    let program = parts.next().ok_or(AudioError::NoPlayer)?;

    let mut file = tempfile::Builder::new()
        .prefix("docchat-")
        .suffix(&format!(".{}", clip.format()))
        .tempfile()
        .map_err(|source| AudioError::Write {
            path: std::env::temp_dir(),
            source,
        })?;
    file.write_all(clip.bytes())
        .and_then(|_| file.flush())
        .map_err(|source| AudioError::Write {
            path: file.path().to_path_buf(),
            source,
        })?;

    debug!("Playing {} with '{}'", file.path().display(), player);
    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .map_err(|source| AudioError::Spawn {
            command: player.to_string(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(AudioError::PlayerFailed {
            command: player.to_string(),
            status,
        })
    }
}
