use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

mod cli;
mod libmentor;

use crate::cli::TerminalConsole;
use crate::libmentor::backend::{MockBackend, OfflineBackend, TextBackend};
use crate::libmentor::pool::QuestionPool;
use crate::libmentor::scores::ScoreStore;

const QUIZ_FILE: &str = "quiz_questions.json";

#[derive(Parser, Debug)]
#[command(name = "EduMentor")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, default_value = "error")]
    log_level: String,
    /// Directory holding scores.json and quiz_questions.json
    #[arg(short, long, value_name = "DIR", env = "AI_EDU_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,
    #[arg(short, long, env = "GEMINI_MODEL", default_value = "gemini-1.5-flash")]
    model: String,
    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
    /// Never call the model, use local questions and canned replies
    #[arg(long, conflicts_with = "mock")]
    offline: bool,
    /// Answer every prompt with the built-in deterministic responder
    #[arg(long)]
    mock: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq)]
enum Commands {
    /// Play / Leaderboard / Exit menu (default)
    Quiz,
    /// Print the leaderboard and exit
    Leaderboard,
    /// Step-by-step tutor
    Tutor,
    /// Multi-turn chat
    Chat,
}

#[derive(Debug, Error)]
enum Error {
    #[error("cannot create data directory {path:?}: {source}")]
    DataDir { path: PathBuf, source: io::Error },
}

fn main() -> Result<(), Error> {
    //INIT START
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();
    debug!("[Setup] .env loaded: {}", dotenv_loaded);

    fs::create_dir_all(&args.data_dir).map_err(|source| Error::DataDir {
        path: args.data_dir.clone(),
        source,
    })?;
    let store = ScoreStore::in_dir(&args.data_dir);
    let pool = QuestionPool::load_or_builtin(&args.data_dir.join(QUIZ_FILE));
    let backend = build_backend(&args);
    info!(
        "[Setup] Scores at {:?}, {} local questions, backend available: {}",
        store.path(),
        pool.len(),
        backend.available()
    );
    // INIT DONE

    let mut console = TerminalConsole;
    match args.command.unwrap_or(Commands::Quiz) {
        Commands::Quiz => cli::menu_loop(&mut console, backend.as_ref(), &pool, &store),
        Commands::Leaderboard => cli::leaderboard(&mut console, &store),
        Commands::Tutor => cli::tutor_loop(&mut console, backend.as_ref()),
        Commands::Chat => cli::chat_loop(&mut console, backend.as_ref()),
    }

    Ok(())
}

fn build_backend(args: &Args) -> Box<dyn TextBackend> {
    if args.offline {
        info!("[Setup] Offline mode requested");
        return Box::new(OfflineBackend);
    }
    if args.mock {
        info!("[Setup] Using the mock responder");
        return Box::new(MockBackend);
    }

    online_backend(args)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "gemini")] {
        fn online_backend(args: &Args) -> Box<dyn TextBackend> {
            use crate::libmentor::backend::GeminiBackend;
            use std::time::Duration;

            let backend = GeminiBackend::new(
                &args.api_key,
                &args.model,
                Duration::from_secs(args.timeout),
            );
            if !backend.available() {
                warn!("[Setup] GEMINI_API_KEY not set, running offline");
            }
            Box::new(backend)
        }
    } else {
        fn online_backend(_args: &Args) -> Box<dyn TextBackend> {
            warn!("[Setup] Built without the `gemini` feature, running offline");
            Box::new(OfflineBackend)
        }
    }
}
