use healthmate_chat::{ChatObserver, ChatOrchestrator, ChatTransport, StartupOutcome};
use session_identity::SessionStorage;

use crate::commands::CliFlags;

/// Runs the startup sequence for one CLI invocation. `--new-session` goes
/// through the orchestrator so the server is told to drop the old id and
/// the fresh session skips the history request.
pub async fn open_chat<S, T, O>(
    chat: &mut ChatOrchestrator<S, T, O>,
    flags: &CliFlags,
) -> StartupOutcome
where
    S: SessionStorage,
    T: ChatTransport,
    O: ChatObserver,
{
    if flags.new_session && chat.start_new_session().await.is_none() {
        tracing::warn!("could not start a new session; resuming the stored one");
    }
    chat.start().await
}
