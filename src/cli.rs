//! Command-line arguments for `translate-locales`.

use crate::config::Config;
use crate::i18n::Language;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),

    #[error("{flag} expects a number, got '{value}'")]
    InvalidNumber { flag: &'static str, value: String },

    #[error("--chunk must be at least 1")]
    ZeroChunk,

    #[error("unknown option: {0}")]
    UnknownFlag(String),
}

/// Parsed command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Target language codes; empty means every supported target
    pub languages: Vec<String>,
    pub force: bool,
    pub chunk_size: Option<usize>,
    pub delay_ms: Option<u64>,
    pub quiet: bool,
    pub help: bool,
    pub list: bool,
    pub source: Option<String>,
    pub dir: Option<PathBuf>,
}

fn number<T: std::str::FromStr>(flag: &'static str, value: Option<String>) -> Result<T, CliError> {
    let value = value.ok_or(CliError::MissingValue(flag))?;
    value
        .parse()
        .map_err(|_| CliError::InvalidNumber { flag, value })
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--force" | "-f" => parsed.force = true,
                "--quiet" | "-q" => parsed.quiet = true,
                "--help" | "-h" => parsed.help = true,
                "--list" | "-l" => parsed.list = true,
                "--chunk" => {
                    let chunk: usize = number("--chunk", args.next())?;
                    if chunk == 0 {
                        return Err(CliError::ZeroChunk);
                    }
                    parsed.chunk_size = Some(chunk);
                }
                "--delay" => parsed.delay_ms = Some(number("--delay", args.next())?),
                "--source" => {
                    parsed.source = Some(args.next().ok_or(CliError::MissingValue("--source"))?)
                }
                "--dir" => {
                    parsed.dir = Some(PathBuf::from(
                        args.next().ok_or(CliError::MissingValue("--dir"))?,
                    ))
                }
                flag if flag.starts_with('-') => return Err(CliError::UnknownFlag(flag.to_string())),
                _ => parsed.languages.push(arg),
            }
        }

        Ok(parsed)
    }

    /// Apply command-line overrides on top of the environment configuration
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(chunk) = self.chunk_size {
            config.chunk_size = chunk;
        }
        if let Some(delay) = self.delay_ms {
            config.key_delay = Duration::from_millis(delay);
        }
        if let Some(code) = &self.source {
            config.source_language =
                Language::from_code(code).context("--source is not a supported language")?;
        }
        if let Some(dir) = &self.dir {
            config.locales_dir = dir.clone();
        }
        Ok(())
    }

    /// Requested targets, or every enabled language except the source
    pub fn target_codes(&self, source: Language) -> Vec<String> {
        if self.languages.is_empty() {
            Language::targets_for(source)
                .into_iter()
                .map(|l| l.code().to_string())
                .collect()
        } else {
            self.languages.clone()
        }
    }
}

pub fn usage() -> String {
    r#"
Translate locale files with a LibreTranslate-compatible backend

USAGE:
    translate-locales [OPTIONS] [LANG...]

    With no LANG, every supported language except the source is translated.

OPTIONS:
    -f, --force          Retranslate every key, ignoring existing files and the cache
        --chunk <n>      Keys translated concurrently (default: 10)
        --delay <ms>     Pause after each backend call (default: 1000)
        --source <code>  Source language (default: en)
        --dir <path>     Locales directory (default: locales)
    -l, --list           List supported languages
    -q, --quiet          Only log warnings and errors
    -h, --help           Show this help

ENVIRONMENT VARIABLES:
    TRANSLATE_API_URL            Backend endpoint (default: http://localhost:5000/translate)
    TRANSLATE_API_KEY            Backend API key
    LOCALES_DIR                  Locales directory
    TRANSLATION_CACHE_FILE       Cache file (default: <LOCALES_DIR>/cache.json)
    SOURCE_LANG                  Source language
    TRANSLATE_CHUNK_SIZE         Default for --chunk
    TRANSLATE_DELAY_MS           Default for --delay
    TRANSLATE_MAX_RETRIES        Attempts per key (default: 3)
    TRANSLATE_LANGUAGE_PAUSE_MS  Pause between languages (default: 2000)
    TRANSLATE_TIMEOUT_SECS       HTTP timeout (default: 30)

EXAMPLES:
    translate-locales tr de
    translate-locales --force --chunk 5 tr
"#
    .to_string()
}
