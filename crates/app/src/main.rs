use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use img2txt_core::report;
use img2txt_core::Config;
use img2txt_ocr::{EngineHandle, OcrBackend, PipelineOptions};
use img2txt_translate::GoogleTranslator;
use tracing_subscriber::EnvFilter;

mod cli;
mod run;

use cli::{Args, USAGE};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // Diagnostics go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(image_path) = args.image.as_deref() else {
        println!("{USAGE}");
        return ExitCode::FAILURE;
    };

    if !image_path.exists() {
        println!("Error: Image file not found: {}", image_path.display());
        return ExitCode::FAILURE;
    }

    let options = PipelineOptions { preprocess: args.preprocess, clean: args.clean };
    execute(&config, image_path, args.target_language.as_deref(), options).await;
    ExitCode::SUCCESS
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(t) = args.threshold {
        config.confidence_threshold = t;
    }
    if !args.ocr_languages.is_empty() {
        config.ocr_languages = args.ocr_languages.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Print the header, then the report. Errors past this point are reported, not fatal.
async fn execute(config: &Config, image_path: &Path, translate_to: Option<&str>, options: PipelineOptions) {
    println!("{}", report::cli_header(image_path, config.confidence_threshold, translate_to));

    let translation = Arc::new(GoogleTranslator::new(config.translate_endpoint.clone()));
    let body = run::extract_and_report(
        engine_for(config),
        translation,
        config.confidence_threshold,
        image_path,
        translate_to,
        options,
    )
    .await;
    println!("{body}");
}

fn engine_for(config: &Config) -> EngineHandle {
    let tessdata = config.tessdata_path.clone();
    let languages = config.ocr_languages.clone();
    EngineHandle::new(move || {
        img2txt_ocr::default_backend(tessdata.as_deref(), &languages).map(Arc::<dyn OcrBackend>::from)
    })
}
