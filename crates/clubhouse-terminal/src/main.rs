mod command;

use std::time::Instant;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use clubhouse_client::modal::FADE_DURATION;
use clubhouse_client::render::{Renderer, TextRenderer};
use clubhouse_client::session::FileStore;
use clubhouse_client::view::Screen;
use clubhouse_client::{ApiClient, App};

use crate::command::{AnnounceCommand, Command, joined};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they don't interleave with the screen.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubhouse_terminal=warn,clubhouse_client=warn".into()),
        )
        .init();

    // Config
    let api_url =
        std::env::var("CLUBHOUSE_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".into());
    let session_path = std::env::var("CLUBHOUSE_SESSION_PATH")
        .unwrap_or_else(|_| "clubhouse-session.json".into());

    let app = App::new(ApiClient::new(&api_url)?, FileStore::new(session_path));
    app.start().await;
    info!("Connected to {}", api_url);

    let renderer = TextRenderer;
    println!("{}", renderer.render(&settled(&app)));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        debug!("Running {:?}", command);

        if command == Command::Quit {
            break;
        }
        run(&app, command).await;
        println!("{}", renderer.render(&settled(&app)));
    }

    Ok(())
}

/// The screen once any fade started by the last command has finished.
fn settled(app: &App<FileStore>) -> Screen {
    app.screen_at(Instant::now() + FADE_DURATION)
}

async fn run(app: &App<FileStore>, command: Command) {
    // A failed login leaves its dialog up until the next command.
    if !matches!(command, Command::Login { .. }) {
        app.close_login();
    }

    match command {
        Command::Show | Command::Quit => {}
        Command::Refresh => {
            tokio::join!(app.fetch_activities(), app.fetch_active_announcements());
        }
        Command::Login { username, password } => {
            app.open_login();
            app.login(&username, &password).await;
        }
        Command::Logout => app.logout(),
        Command::Category { category } => app.set_category(category.into_option()),
        Command::Day { day } => app.set_day(day.into_option().as_deref()).await,
        Command::Time { range } => app.set_time_range(range.into_option()).await,
        Command::Search { text } => app.set_search(&joined(&text)),
        Command::Register { email, activity } => {
            app.open_registration(&joined(&activity));
            app.submit_registration(&email).await;
            app.close_registration();
        }
        Command::Unregister { email, activity } => {
            app.request_unregister(&joined(&activity), &email)
        }
        Command::Yes => app.confirm().await,
        Command::No => app.cancel_confirm(),
        Command::Announcements => app.open_announcement_manager().await,
        Command::Announce { action } => match action {
            AnnounceCommand::New => app.new_announcement(),
            AnnounceCommand::Edit { id } => app.edit_announcement(&id).await,
            AnnounceCommand::Message { text } => {
                let text = joined(&text);
                app.update_draft(|d| d.message = text)
            }
            AnnounceCommand::Start { date } => app.update_draft(|d| d.start_date = date),
            AnnounceCommand::Expires { date } => app.update_draft(|d| d.expiration_date = date),
            AnnounceCommand::Save => {
                app.save_announcement().await;
            }
            AnnounceCommand::Cancel => app.cancel_draft(),
            AnnounceCommand::Delete { id } => app.request_delete_announcement(&id),
            AnnounceCommand::Close => app.close_announcement_manager(),
        },
    }
}
