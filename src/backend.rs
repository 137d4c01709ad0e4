//! The external lookup programs Reo shells out to.
//!
//! [`Backend`] is the seam the resolver depends on; [`CommandBackend`] runs the
//! real `dict`, `espeak`, `fortune` and `cowsay` binaries.

use crate::config::ReoConfig;
use crate::error::BackendError;
use crate::random::WordNetVersion;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Exit codes dict uses for "no databases" and "no match".
const DICT_NO_MATCH: &[i32] = &[20, 21];

/// Raw text sources. Blank output is a valid answer, not an error.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Raw dictionary entry for `term`.
    async fn define(&self, term: &str) -> Result<String, BackendError>;
    /// Raw IPA transcription of `term`.
    async fn pronounce(&self, term: &str) -> Result<String, BackendError>;
    /// Raw fuzzy-match listing for `term`.
    async fn similar(&self, term: &str) -> Result<String, BackendError>;
    async fn fortune(&self) -> Result<String, BackendError>;
    async fn cowsay(&self, text: &str) -> Result<String, BackendError>;
    /// Which WordNet release the dictionary serves, if it can tell.
    async fn probe_version(&self) -> Result<Option<WordNetVersion>, BackendError>;
}

#[derive(Debug, Clone)]
pub struct CommandBackend {
    dict: String,
    espeak: String,
    fortune: String,
    cowsay: String,
    database: String,
    strategy: String,
    voice: String,
    timeout: Duration,
}

impl CommandBackend {
    pub fn from_config(config: &ReoConfig) -> Self {
        Self {
            dict: config.dict_program.clone(),
            espeak: config.espeak_program.clone(),
            fortune: config.fortune_program.clone(),
            cowsay: config.cowsay_program.clone(),
            database: config.database.clone(),
            strategy: config.strategy.clone(),
            voice: config.voice.clone(),
            timeout: config.timeout(),
        }
    }

    /// Runs `program` to completion and returns its stdout.
    ///
    /// A non-zero exit is only a failure when it printed nothing and the code
    /// is not listed in `benign`.
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        benign: &[i32],
    ) -> Result<String, BackendError> {
        let started = Instant::now();
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| BackendError::TimedOut {
                program: program.to_string(),
                after: self.timeout,
            })?
            .map_err(|source| BackendError::Unavailable {
                program: program.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            program,
            status = %output.status,
            bytes = stdout.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend finished"
        );

        let benign_exit = output
            .status
            .code()
            .is_some_and(|code| benign.contains(&code));
        if output.status.success() || !stdout.trim().is_empty() || benign_exit {
            return Ok(stdout);
        }
        Err(BackendError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[async_trait]
impl Backend for CommandBackend {
    async fn define(&self, term: &str) -> Result<String, BackendError> {
        if is_option_like(term) {
            return Ok(String::new());
        }
        self.run(
            &self.dict,
            &["-d", self.database.as_str(), "--", term],
            DICT_NO_MATCH,
        )
        .await
    }

    async fn pronounce(&self, term: &str) -> Result<String, BackendError> {
        if is_option_like(term) {
            return Ok(String::new());
        }
        let voice = format!("-v{}", self.voice);
        self.run(&self.espeak, &[voice.as_str(), "--ipa", "-q", "--", term], &[])
            .await
    }

    async fn similar(&self, term: &str) -> Result<String, BackendError> {
        if is_option_like(term) {
            return Ok(String::new());
        }
        self.run(
            &self.dict,
            &[
                "-m",
                "-d",
                self.database.as_str(),
                "-s",
                self.strategy.as_str(),
                "--",
                term,
            ],
            DICT_NO_MATCH,
        )
        .await
    }

    async fn fortune(&self) -> Result<String, BackendError> {
        self.run(&self.fortune, &["-a"], &[]).await
    }

    async fn cowsay(&self, text: &str) -> Result<String, BackendError> {
        self.run(&self.cowsay, &["--", text], &[]).await
    }

    async fn probe_version(&self) -> Result<Option<WordNetVersion>, BackendError> {
        let banner = self
            .run(
                &self.dict,
                &["-d", self.database.as_str(), "--", "test"],
                DICT_NO_MATCH,
            )
            .await?;
        Ok(WordNetVersion::from_banner(&banner))
    }
}

/// Terms the lookup programs would read as flags never reach them; they get
/// the same blank answer as a word with no entry.
fn is_option_like(term: &str) -> bool {
    let option_like = term.trim_start().starts_with('-');
    if option_like {
        debug!(term, "refusing to pass an option-like term to a lookup program");
    }
    option_like
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::io;

    /// Canned backend answers. `None` behaves like a missing program.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct StubBackend {
        pub define: Option<String>,
        pub pronounce: Option<String>,
        pub similar: Option<String>,
        pub fortune: Option<String>,
        pub cowsay: Option<String>,
        pub version: Option<WordNetVersion>,
    }

    fn answer(program: &str, canned: &Option<String>) -> Result<String, BackendError> {
        canned.clone().ok_or_else(|| BackendError::Unavailable {
            program: program.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not installed"),
        })
    }

    #[async_trait]
    impl Backend for StubBackend {
        async fn define(&self, _term: &str) -> Result<String, BackendError> {
            answer("dict", &self.define)
        }

        async fn pronounce(&self, _term: &str) -> Result<String, BackendError> {
            answer("espeak", &self.pronounce)
        }

        async fn similar(&self, _term: &str) -> Result<String, BackendError> {
            answer("dict", &self.similar)
        }

        async fn fortune(&self) -> Result<String, BackendError> {
            answer("fortune", &self.fortune)
        }

        async fn cowsay(&self, text: &str) -> Result<String, BackendError> {
            answer("cowsay", &self.cowsay).map(|cow| format!("{cow}\n{text}"))
        }

        async fn probe_version(&self) -> Result<Option<WordNetVersion>, BackendError> {
            Ok(self.version)
        }
    }
}
