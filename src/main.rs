use std::path::PathBuf;
use std::sync::Arc;

use canvas::hit::ResizeDirection;
use canvas::note::{CanvasId, DEFAULT_TEXT_CONTENT, DEFAULT_TEXT_TITLE, Note, NoteId, NotePatch, parse_tags};
use canvas::viewport::Point;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use notecanvas::config::ClientConfig;
use notecanvas::remote::http::HttpRemote;
use notecanvas::remote::{MediaKind, RemoteError};
use notecanvas::session::{CanvasSession, SessionError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("note {0} not found on canvas")]
    NoteNotFound(NoteId),
    #[error("nothing to edit; pass at least one of --title, --content, --caption, --transcript, --tags")]
    EmptyEdit,
    #[error("failed to read {path}: {source}")]
    ReadFile { path: String, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "notecanvas", about = "Freeform notes canvas client")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "NOTECANVAS_API_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Canvas(CanvasCommand),
    Note(NoteCommand),
}

#[derive(Args, Debug)]
struct CanvasCommand {
    #[command(subcommand)]
    command: CanvasSubcommand,
}

#[derive(Subcommand, Debug)]
enum CanvasSubcommand {
    List,
    Create {
        #[arg(long, default_value = "Untitled canvas")]
        name: String,
    },
    Delete {
        canvas_id: CanvasId,
    },
}

#[derive(Args, Debug)]
struct NoteCommand {
    #[command(subcommand)]
    command: NoteSubcommand,
}

#[derive(Subcommand, Debug)]
enum NoteSubcommand {
    List {
        canvas_id: CanvasId,
    },
    AddText {
        canvas_id: CanvasId,
        #[arg(long, default_value = DEFAULT_TEXT_TITLE)]
        title: String,
        #[arg(long, default_value = DEFAULT_TEXT_CONTENT)]
        content: String,
    },
    Edit {
        canvas_id: CanvasId,
        note_id: NoteId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        caption: Option<String>,
        #[arg(long)]
        transcript: Option<String>,
        #[arg(long, help = "Comma-separated tags, e.g. \"work, ideas\"")]
        tags: Option<String>,
    },
    /// Drag a note so its top-left corner lands on (x, y).
    Move {
        canvas_id: CanvasId,
        note_id: NoteId,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },
    /// Resize a note by dragging one of its handles.
    Resize {
        canvas_id: CanvasId,
        note_id: NoteId,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        #[arg(long, default_value = "se", help = "Handle to drag: s, e or se")]
        direction: ResizeDirection,
    },
    Delete {
        canvas_id: CanvasId,
        note_id: NoteId,
    },
    Upload {
        canvas_id: CanvasId,
        #[arg(long, help = "image or audio")]
        kind: MediaKind,
        path: PathBuf,
    },
    Ocr {
        canvas_id: CanvasId,
        note_id: NoteId,
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    Transcribe {
        canvas_id: CanvasId,
        note_id: NoteId,
        #[arg(long, default_value_t = false)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "no .env file loaded");
    }

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.base_url.as_deref() {
        config = config.with_api_url(url);
    }
    info!(api_url = %config.api_url, "notecanvas client configured");

    let remote = Arc::new(HttpRemote::new(&config)?);
    let session = CanvasSession::new(remote, config.langs.clone());

    match cli.command {
        Command::Canvas(canvas) => run_canvas(&session, canvas).await,
        Command::Note(note) => run_note(&session, note).await,
    }
}

async fn run_canvas(session: &CanvasSession, canvas: CanvasCommand) -> Result<(), CliError> {
    match canvas.command {
        CanvasSubcommand::List => print_json(&session.list_canvases().await?),
        CanvasSubcommand::Create { name } => print_json(&session.create_canvas(&name).await?),
        CanvasSubcommand::Delete { canvas_id } => {
            session.delete_canvas(canvas_id).await?;
            print_json(&serde_json::json!({ "deleted": canvas_id }))
        }
    }
}

async fn run_note(session: &CanvasSession, note: NoteCommand) -> Result<(), CliError> {
    match note.command {
        NoteSubcommand::List { canvas_id } => {
            session.select_canvas(canvas_id).await;
            print_json(&session.notes())
        }
        NoteSubcommand::AddText { canvas_id, title, content } => {
            session.select_canvas(canvas_id).await;
            print_json(&session.create_text_note(&title, &content).await?)
        }
        NoteSubcommand::Edit { canvas_id, note_id, title, content, caption, transcript, tags } => {
            let patch = NotePatch {
                title,
                content,
                caption,
                transcript,
                tags: tags.as_deref().map(parse_tags),
                ..NotePatch::default()
            };
            if patch.is_empty() {
                return Err(CliError::EmptyEdit);
            }
            session.select_canvas(canvas_id).await;
            let saved = session.edit_note(note_id, &patch).await?.ok_or(CliError::NoteNotFound(note_id))?;
            print_json(&saved)
        }
        NoteSubcommand::Move { canvas_id, note_id, x, y } => {
            session.select_canvas(canvas_id).await;
            let current = find_note(session, note_id)?;
            let start = current.geometry().origin();
            session.begin_drag(note_id, start).settle().await;
            session.pointer_move(Point::new(x, y));
            session.pointer_up().settle().await;
            print_json(&find_note(session, note_id)?)
        }
        NoteSubcommand::Resize { canvas_id, note_id, width, height, direction } => {
            session.select_canvas(canvas_id).await;
            let g = find_note(session, note_id)?.geometry();
            session.begin_resize(note_id, direction).settle().await;
            session.pointer_move(Point::new(g.x + width, g.y + height));
            session.pointer_up().settle().await;
            print_json(&find_note(session, note_id)?)
        }
        NoteSubcommand::Delete { canvas_id, note_id } => {
            session.select_canvas(canvas_id).await;
            let deleted = session.delete_note(note_id).await?;
            print_json(&serde_json::json!({ "deleted": deleted, "note_id": note_id }))
        }
        NoteSubcommand::Upload { canvas_id, kind, path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|source| CliError::ReadFile { path: path.display().to_string(), source })?;
            let file_name = path
                .file_name()
                .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
            session.select_canvas(canvas_id).await;
            print_json(&session.upload_media(kind, &file_name, bytes).await?)
        }
        NoteSubcommand::Ocr { canvas_id, note_id, save } => {
            session.select_canvas(canvas_id).await;
            print_json(&session.recognize_text(note_id, save).await?)
        }
        NoteSubcommand::Transcribe { canvas_id, note_id, save } => {
            session.select_canvas(canvas_id).await;
            print_json(&session.transcribe(note_id, save).await?)
        }
    }
}

fn find_note(session: &CanvasSession, id: NoteId) -> Result<Note, CliError> {
    session.store().get(&id).ok_or(CliError::NoteNotFound(id))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
