//! Shared building blocks for the admin portal.
//!
//! - `pagination`: normalize paged list responses
//! - `http_error`: classify failed HTTP calls into user-facing errors
//! - `tckn`: Turkish national identity number checks
//! - `i18n`: locale dictionary translation
//! - `config` / `cli` / `retry`: plumbing for the `translate-locales` binary

pub mod cli;
pub mod config;
pub mod http_error;
pub mod i18n;
pub mod pagination;
pub mod retry;
pub mod tckn;
