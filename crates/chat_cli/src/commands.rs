#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    New,
    Clear,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "Commands: /help, /new (start a new session), /clear (clear this session), /quit";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let command = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/new" => SlashCommand::New,
        "/clear" => SlashCommand::Clear,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliFlags {
    pub new_session: bool,
    pub help: bool,
}

impl CliFlags {
    pub fn parse<I, S>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = Self::default();
        for arg in args {
            match arg.as_ref() {
                "--new-session" => flags.new_session = true,
                "-h" | "--help" => flags.help = true,
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(flags)
    }
}

pub const USAGE: &str = "usage: healthmate-chat [--new-session]";
