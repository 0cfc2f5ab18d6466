//! Translate the source locale file into every requested language.
//!
//! Usage:
//!   translate-locales                 # All supported languages
//!   translate-locales tr de           # Only Turkish and German
//!   translate-locales --force tr      # Retranslate everything for Turkish

use anyhow::Result;
use portal_toolkit::cli::{usage, CliArgs};
use portal_toolkit::config::Config;
use portal_toolkit::i18n::{LanguageRegistry, LocaleTranslator, RunSummary};
use std::process::ExitCode;
use tracing::info;

fn print_languages() {
    println!("Supported languages:");
    for lang in LanguageRegistry::get().list_enabled() {
        let marker = if lang.is_canonical { " (source)" } else { "" };
        println!(
            "    {:<4} {} / {}{}",
            lang.code, lang.name, lang.native_name, marker
        );
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!(
        "{:<4} {:<6} {:>10} {:>7} {:>7} {:>6}  {}",
        "", "LANG", "TRANSLATED", "CACHED", "FAILED", "HIT %", "OUTPUT"
    );
    for report in &summary.reports {
        let icon = if report.succeeded() { "✅" } else { "❌" };
        let detail = match (&report.error, &report.output) {
            (Some(error), _) => error.clone(),
            (None, Some(output)) => output.clone(),
            (None, None) => "up to date".to_string(),
        };
        println!(
            "{:<4} {:<6} {:>10} {:>7} {:>7} {:>6.1}  {}",
            icon,
            report.code,
            report.metrics.translated,
            report.metrics.cached,
            report.metrics.failed,
            report.metrics.cache_hit_rate,
            detail
        );
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file (ignored in CI)
    let _ = dotenvy::dotenv();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", usage());
            return Ok(ExitCode::from(2));
        }
    };

    if args.help {
        println!("{}", usage());
        return Ok(ExitCode::SUCCESS);
    }
    if args.list {
        print_languages();
        return Ok(ExitCode::SUCCESS);
    }

    // Initialize logging
    let level = if args.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("portal_toolkit={}", level).parse()?)
                .add_directive(format!("translate_locales={}", level).parse()?),
        )
        .init();

    // Load configuration from environment, then apply flags
    let mut config = Config::from_env()?;
    args.apply(&mut config)?;

    let backend = config.backend()?;
    let store = config.store();
    let targets = args.target_codes(config.source_language);
    info!(
        "Translating {} from {} in {} using {}",
        targets.join(", "),
        config.source_language.code(),
        store.dir().display(),
        backend.endpoint()
    );

    let translator = LocaleTranslator::new(backend, store, config.pipeline_options(args.force));
    let summary = translator.translate_languages(&targets).await;

    print_summary(&summary);

    if summary.all_succeeded() {
        info!("All languages translated successfully");
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
