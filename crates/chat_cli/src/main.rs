use std::io;

use chat_api::ChatApiClient;
use chat_cli::commands::{parse_slash_command, CliFlags, SlashCommand, HELP_TEXT, USAGE};
use chat_cli::render::TerminalRenderer;
use chat_cli::startup::open_chat;
use healthmate_chat::{
    ChatOrchestrator, ClientConfig, HttpTransport, OrchestratorSettings, SendOutcome,
};
use session_identity::{FileSessionStorage, SessionIdentity};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    let flags = CliFlags::parse(std::env::args().skip(1)).map_err(io::Error::other)?;
    if flags.help {
        println!("{USAGE}");
        println!("{HELP_TEXT}");
        return Ok(());
    }

    init_tracing();

    let config = ClientConfig::load().map_err(io::Error::other)?;
    tracing::info!(
        base_url = %config.base_url,
        storage = %config.storage_dir.display(),
        "starting chat client"
    );

    let client = ChatApiClient::new(config.api_config()).map_err(io::Error::other)?;
    let transport = HttpTransport::new(client).with_history_limit(config.history_limit);

    let identity = SessionIdentity::new(FileSessionStorage::new(&config.storage_dir));
    let renderer = TerminalRenderer::new(io::stdout());
    let mut chat = ChatOrchestrator::new(
        identity,
        transport,
        renderer,
        OrchestratorSettings::from_config(&config),
    );

    open_chat(&mut chat, &flags).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        chat.observer_mut().prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_slash_command(&line) {
            Some(SlashCommand::Help) => chat.observer_mut().notice(HELP_TEXT),
            Some(SlashCommand::New) => {
                chat.observer_mut().begin_new_view();
                chat.start_new_session().await;
            }
            Some(SlashCommand::Clear) => {
                chat.observer_mut().begin_new_view();
                chat.clear_session().await;
            }
            Some(SlashCommand::Quit) => break,
            Some(SlashCommand::Unknown(command)) => chat
                .observer_mut()
                .notice(&format!("Unknown command: {command}")),
            None => {
                if chat.send(&line).await == SendOutcome::Rejected {
                    tracing::debug!("input not sent");
                }
            }
        }
    }

    tracing::info!("chat client exiting");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
