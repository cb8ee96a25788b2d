mod args;

use args::Args;
use captcha_tracker::captcha::{
    CaptchaSession, DEFAULT_CHANNEL_CAPACITY, SessionConfig, SessionEvent, SessionRunner,
    TemplateAssets, create_session_channels,
};
use captcha_tracker::capture::DirectoryFrameSource;
use captcha_tracker::error::CaptchaResult;
use captcha_tracker::names::NameCatalog;
use captcha_tracker::ocr::TesseractRecognizer;
use captcha_tracker::preprocess::YellowTextPreprocessor;
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;

/// Click target line read by the external actuator
#[derive(Serialize)]
struct TargetLine {
    frame: u64,
    x: i32,
    y: i32,
}

fn main() -> ExitCode {
    let Some(args) = Args::parse() else {
        return ExitCode::SUCCESS;
    };

    let default_filter = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> CaptchaResult<()> {
    let config = match &args.config_path {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    let assets = TemplateAssets::load(&args.assets_dir)?;
    let catalog = NameCatalog::from_file(&args.catalog_path)?;
    let source = DirectoryFrameSource::open(&args.frames_dir, args.stride)?;

    let preprocessor = YellowTextPreprocessor::default().with_crop(config.crop);
    let recognizer = TesseractRecognizer::new("tesseract", config.ocr_language.clone());
    let session = CaptchaSession::new(
        config,
        assets,
        catalog,
        Arc::new(recognizer),
        Arc::new(preprocessor),
    );

    let (handle, channels) = create_session_channels(DEFAULT_CHANNEL_CAPACITY);
    let (commands, mut events) = (handle.commands, handle.events);

    // Targets go to stdout as JSON lines; everything else is logged
    let printer = tokio::spawn(async move {
        // A frame's target arrives before that frame's FrameProcessed
        let mut pending = None;
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::TargetUpdated(position) => pending = Some(position),
                SessionEvent::FrameProcessed { index, .. } => {
                    let Some(position) = pending.take() else {
                        continue;
                    };
                    let line = TargetLine {
                        frame: index,
                        x: position.x,
                        y: position.y,
                    };
                    match serde_json::to_string(&line) {
                        Ok(json) => println!("{json}"),
                        Err(e) => log::warn!("⚠️ Failed to encode target: {e}"),
                    }
                }
                SessionEvent::ChallengeStarted { name, seed } => {
                    log::info!("🎯 Tracking '{}' from ({}, {})", name.canonical, seed.x, seed.y);
                }
                _ => {}
            }
        }
    });

    let mut runner = SessionRunner::new(session, source, channels);
    let summary = runner.run().await;
    drop(runner);
    drop(commands);
    printer.await?;

    log::info!(
        "📊 {} frame(s), {} challenge(s), {} target update(s), {} abort(s), {} unreadable frame(s)",
        summary.frames,
        summary.challenges,
        summary.targets,
        summary.aborts,
        summary.frame_errors
    );
    Ok(())
}
