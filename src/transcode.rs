//! One-shot video transcoding through an external `ffmpeg` process

use crate::config::TranscodeSettings;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

#[derive(thiserror::Error, Debug)]
pub enum TranscodeError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command '{command}' returned non-zero exit status {status}")]
    Failed { command: String, status: ExitStatus },
}

/// A single `ffmpeg -i <input> <output>` invocation. The container and
/// codecs are inferred by the encoder from the file extensions.
#[derive(Debug, Clone)]
pub struct Transcoder {
    program: String,
    input: PathBuf,
    output: PathBuf,
}

impl Transcoder {
    pub fn new(program: impl Into<String>, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Transcoder {
            program: program.into(),
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn input(&self) -> &PathBuf {
        &self.input
    }

    pub fn output(&self) -> &PathBuf {
        &self.output
    }

    /// The command line as it would be typed in a shell
    pub fn command_line(&self) -> String {
        format!(
            "{} -i {} {}",
            self.program,
            self.input.display(),
            self.output.display()
        )
    }

    /// Run the encoder once and wait for it. Encoder output goes straight to
    /// this process's terminal. Partial output is left in place on failure.
    #[tracing::instrument(skip(self), fields(input = %self.input.display(), output = %self.output.display()))]
    pub async fn run(&self) -> Result<(), TranscodeError> {
        debug!("running {}", self.command_line());
        let status = Command::new(&self.program)
            .arg("-i")
            .arg(&self.input)
            .arg(&self.output)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| TranscodeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(TranscodeError::Failed {
                command: self.command_line(),
                status,
            });
        }

        info!("transcode finished");
        Ok(())
    }
}

impl From<&TranscodeSettings> for Transcoder {
    fn from(settings: &TranscodeSettings) -> Self {
        Transcoder::new(
            settings.ffmpeg.clone(),
            settings.input.clone(),
            settings.output.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_matches_invocation() {
        let t = Transcoder::new("ffmpeg", "in.avi", "out.mp4");
        assert_eq!(t.command_line(), "ffmpeg -i in.avi out.mp4");
    }

    #[test]
    fn settings_are_carried_over() {
        let settings = TranscodeSettings::default();
        let t = Transcoder::from(&settings);
        assert_eq!(t.input(), &PathBuf::from("input.avi"));
        assert_eq!(t.output(), &PathBuf::from("output.mp4"));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let t = Transcoder::new("./definitely-not-an-encoder", "in.avi", "out.mp4");
        let err = t.run().await.unwrap_err();
        assert!(matches!(err, TranscodeError::Spawn { .. }), "{err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        // `false` ignores its arguments and exits 1
        let t = Transcoder::new("false", "in.avi", "out.mp4");
        let err = t.run().await.unwrap_err();
        match err {
            TranscodeError::Failed { command, status } => {
                assert_eq!(command, "false -i in.avi out.mp4");
                assert_eq!(status.code(), Some(1));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let t = Transcoder::new("true", "in.avi", "out.mp4");
        t.run().await.unwrap();
    }
}
