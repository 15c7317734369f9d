use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use tokio::sync::mpsc;

use vista::api::{ApiError, VideoBackend, VistaClient};
use vista::core::chat::{self, SendOutcome};
use vista::core::config::{self, ResolvedConfig};
use vista::core::conversation::ConversationStore;
use vista::core::lifecycle::{LifecycleController, LifecycleEvent};
use vista::core::state::App;
use vista::core::thoughts;
use vista::core::upload::VideoFile;
use vista::tui;

#[derive(Parser)]
#[command(name = "vista", about = "Ask questions about your videos")]
struct Args {
    /// Backend base URL (overrides config file and VISTA_API_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Launch the terminal UI (default)
    Tui {
        /// Resume an analysed session instead of uploading a new video
        #[arg(long)]
        session: Option<String>,
    },
    /// Upload a video and wait for the analysis
    Upload { file: PathBuf },
    /// Send one chat message to a session
    Ask { session: String, message: String },
    /// Run the analyze endpoint with a question
    Analyze { session: String, question: String },
    /// Manage sessions on the server
    Sessions {
        #[command(subcommand)]
        command: SessionsCommand,
    },
    /// Print a session's transcript
    Messages { session: String },
}

#[derive(Subcommand)]
enum SessionsCommand {
    List,
    Show { id: String },
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to vista.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Ok(log_file) = File::create("vista.log") {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("Warning: {e}. Using defaults.");
        config::VistaConfig::default()
    });
    let config = config::resolve(&file_config, args.base_url.as_deref());
    log::info!("Vista starting up against {}", config.base_url);

    let client = Arc::new(VistaClient::new(config.base_url.clone()));

    match args.command.unwrap_or(Command::Tui { session: None }) {
        Command::Tui { session } => {
            let app = match session {
                Some(id) => {
                    let info = client
                        .get_session(Some(&id))
                        .await
                        .map_err(|e| explain(&id, e))?;
                    let history = client.messages(Some(&id)).await?;
                    client.set_current_session_id(Some(id));
                    App::resume(&config, info, history)
                }
                None => App::new(&config),
            };
            tui::run(app, client, &config)?;
        }
        Command::Upload { file } => upload(&config, client.as_ref(), file).await?,
        Command::Ask { session, message } => ask(client.as_ref(), &session, &message).await?,
        Command::Analyze { session, question } => {
            let response = client.analyze(&question, Some(&session)).await?;
            println!("{}", response.answer);
            println!();
            println!(
                "keyframes: {}  relations: {}",
                response.keyframes_count,
                response.relations.values().map(Vec::len).sum::<usize>()
            );
        }
        Command::Sessions { command } => match command {
            SessionsCommand::List => {
                for s in client.list_sessions().await? {
                    println!(
                        "{}  {:<10} {}  {}",
                        s.session_id,
                        s.status.label(),
                        s.created_at.as_deref().unwrap_or("-"),
                        if s.has_video { "video" } else { "no video" }
                    );
                }
            }
            SessionsCommand::Show { id } => {
                let info = client
                    .get_session(Some(&id))
                    .await
                    .map_err(|e| explain(&id, e))?;
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
            SessionsCommand::Delete { id } => {
                client
                    .delete_session(Some(&id))
                    .await
                    .map_err(|e| explain(&id, e))?;
                println!("Deleted {id}");
            }
        },
        Command::Messages { session } => {
            let messages = client
                .messages(Some(&session))
                .await
                .map_err(|e| explain(&session, e))?;
            for message in messages {
                println!("[{:?}] {}", message.role, message.content);
            }
        }
    }

    Ok(())
}

/// Turns a 404 into a message naming the session.
fn explain(session_id: &str, error: ApiError) -> Box<dyn Error> {
    match error.status() {
        Some(404) => format!("session {session_id} not found").into(),
        _ => error.into(),
    }
}

async fn upload(config: &ResolvedConfig, backend: &dyn VideoBackend, path: PathBuf) -> Result<(), Box<dyn Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                LifecycleEvent::SessionCreated(id) => eprintln!("session {id}"),
                LifecycleEvent::Uploading => eprintln!("uploading..."),
                LifecycleEvent::Analyzing => eprintln!("analyzing..."),
                LifecycleEvent::PollAttempt {
                    attempt,
                    max_attempts,
                    status,
                } => eprintln!(
                    "  check {attempt}/{max_attempts}: {}",
                    status.map(|s| s.label()).unwrap_or("request failed")
                ),
            }
        }
    });

    let mut controller =
        LifecycleController::new(config.retry_policy(), config.max_upload_bytes).with_progress(tx);
    controller.select_file(VideoFile::from_path(&path)?)?;
    let result = controller.run(backend).await;
    drop(controller);
    let _ = printer.await;

    let info = result?;
    let summary = info.summary();
    println!("{}", info.session_id);
    println!(
        "keyframes: {}  relations: {}",
        summary.keyframes_count, summary.scene_graph_relations
    );
    Ok(())
}

async fn ask(backend: &dyn VideoBackend, session_id: &str, message: &str) -> Result<(), Box<dyn Error>> {
    let store = ConversationStore::new();
    match chat::send_message(&store, backend, session_id, message).await {
        SendOutcome::Answered { .. } => {
            let snapshot = store.snapshot();
            for entry in thoughts::panel_entries(&snapshot.messages, None) {
                eprintln!("# {}\n{}\n", entry.title, entry.body);
            }
            if let Some(answer) = snapshot.messages.last() {
                println!("{}", answer.content);
            }
            Ok(())
        }
        SendOutcome::Failed { error, .. } => Err(error.into()),
        SendOutcome::Ignored(reason) => Err(format!("nothing sent: {reason:?}").into()),
    }
}
