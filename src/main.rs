mod app;

use app::StudyApp;
use clap::Parser;
use flashcards_study::api::{HttpTransport, StudyApi};
use flashcards_study::config::{self, CliOverrides};
use flashcards_study::error::AppError;
use flashcards_study::models::LearningSession;
use flashcards_study::{logging, math};
use std::path::PathBuf;
use tracing::info;

/// Review the flashcards that are due today
#[derive(Parser, Debug)]
#[command(name = "flashcards-study", version)]
struct Args {
    /// Study server base URL
    #[arg(long)]
    server: Option<String>,

    /// Session cookie of a signed-in user, e.g. "session=..."
    #[arg(long)]
    session: Option<String>,

    /// Show TeX in cards as written
    #[arg(long)]
    no_math: bool,

    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let config = {
        let file = config::load_config_with_precedence(args.config.clone())?;
        let merged = config::merge_config(file);
        let with_env = config::apply_env_overrides(merged);
        config::apply_cli_overrides(
            with_env,
            CliOverrides {
                server_url: args.server,
                session_cookie: args.session,
                no_math: args.no_math,
            },
        )
    };

    logging::init(&config.log_file_path)?;
    info!(
        server = %config.server_url,
        math = config.math,
        signed_in = config.session_cookie.is_some(),
        "configuration resolved"
    );

    let transport = HttpTransport::new(
        &config.server_url,
        config.session_cookie.as_deref(),
        config.request_timeout,
    )?;
    let api = StudyApi::new(transport);
    let session = LearningSession::new(math::formatter(config.math));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([500.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Flashcards Study",
        options,
        Box::new(move |cc| {
            let app = StudyApp::new(api, session, &cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
