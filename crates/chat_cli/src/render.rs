//! Line-oriented terminal rendering of orchestrator updates.

use std::io::Write;

use healthmate_chat::{
    ChatObserver, Message, Role, ScrollAction, StreamSignal, Transcript, UiState,
};

const CLEAR_LINE: &str = "\r\x1b[2K";
const THINKING: &str = "…";
pub const AUTH_REQUIRED_NOTICE: &str =
    "Authentication required. Sign in and set HEALTHMATE_CHAT_AUTH_COOKIE, then restart.";

/// Prints committed messages once, streams pending text as it grows, and
/// never redraws what is already on screen.
pub struct TerminalRenderer<W: Write> {
    out: W,
    rendered: usize,
    streamed: usize,
    echo_user_input: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rendered: 0,
            streamed: 0,
            echo_user_input: false,
        }
    }

    /// Also print user messages appended during the session. Off by default
    /// because the terminal already echoes typed input.
    pub fn with_user_echo(mut self, echo: bool) -> Self {
        self.echo_user_input = echo;
        self
    }

    /// Next transcript change is drawn from the top.
    pub fn begin_new_view(&mut self) {
        self.rendered = 0;
        self.streamed = 0;
        self.line("");
    }

    pub fn notice(&mut self, text: &str) {
        self.line(&format!("* {text}"));
    }

    pub fn prompt(&mut self) {
        let _ = write!(self.out, "> ");
        let _ = self.out.flush();
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn write_message(&mut self, message: &Message) {
        let prefix = role_prefix(message.role);
        self.line(&format!("{prefix}> {}", message.content));
    }

    fn pending_text<'t>(&self, transcript: &'t Transcript) -> &'t str {
        transcript
            .pending()
            .map(|pending| pending.text())
            .unwrap_or_default()
    }
}

impl<W: Write> ChatObserver for TerminalRenderer<W> {
    fn transcript_changed(&mut self, transcript: &Transcript, _scroll: ScrollAction) {
        if transcript.len() < self.rendered {
            self.rendered = 0;
        }

        let full_redraw = self.rendered == 0;
        for message in &transcript.messages()[self.rendered..] {
            if message.role == Role::User && !full_redraw && !self.echo_user_input {
                continue;
            }
            self.write_message(message);
        }
        self.rendered = transcript.len();
    }

    fn stream_signal(
        &mut self,
        signal: &StreamSignal,
        transcript: &Transcript,
        _scroll: ScrollAction,
    ) {
        match signal {
            StreamSignal::ThinkingShown => {
                self.streamed = 0;
                let _ = write!(self.out, "{}> {THINKING}", role_prefix(Role::Assistant));
                let _ = self.out.flush();
            }
            StreamSignal::LiveTextShown => {
                let text = self.pending_text(transcript);
                let _ = write!(
                    self.out,
                    "{CLEAR_LINE}{}> {text}",
                    role_prefix(Role::Assistant)
                );
                let _ = self.out.flush();
                self.streamed = text.len();
            }
            StreamSignal::TextAppended => {
                let text = self.pending_text(transcript);
                let delta = text.get(self.streamed..).unwrap_or_default();
                let _ = write!(self.out, "{delta}");
                let _ = self.out.flush();
                self.streamed = text.len();
            }
            StreamSignal::Committed => {
                self.line("");
                self.streamed = 0;
                self.rendered = transcript.len();
            }
            StreamSignal::CompletedEmpty => {
                let _ = write!(self.out, "{CLEAR_LINE}");
                let _ = self.out.flush();
                self.streamed = 0;
            }
            StreamSignal::Failed { description } => {
                let _ = write!(self.out, "{CLEAR_LINE}");
                self.line(&format!("{}> {description}", role_prefix(Role::Error)));
                self.streamed = 0;
                self.rendered = transcript.len();
            }
            StreamSignal::Acknowledged | StreamSignal::Ignored => {}
        }
    }

    fn ui_state_changed(&mut self, state: UiState) {
        if state == UiState::AuthenticationRequired {
            self.notice(AUTH_REQUIRED_NOTICE);
        }
    }
}

fn role_prefix(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "healthmate",
        Role::Error => "error",
    }
}
