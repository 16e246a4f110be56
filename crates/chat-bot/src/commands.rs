//! Chat command parsing.

use crate::error::BotError;

pub const HELP_TEXT: &str = "**Commands:**\n\
--game [variant] [@opponent] [fen] (start a game, you play as white)\n\
--selfplay [variant] (watch the bot play itself)\n\
--move [move]\n\
--premove [move|clear]\n\
--display (displays position information)\n\
--moves\n\
--resign\n\
--offerdraw\n\
--acceptdraw\n\
--takeback\n\
--accepttakeback\n\
--skill [-20..20]\n\
--botmove (retry the bot's move)\n\
--rematch";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Game {
        variant: String,
        opponent: String,
        start_position: Option<String>,
    },
    SelfPlay {
        variant: String,
    },
    Move(String),
    /// `None` clears the queued premove.
    Premove(Option<String>),
    Display,
    Moves,
    Resign,
    OfferDraw,
    AcceptDraw,
    Takeback,
    AcceptTakeback,
    Skill(i32),
    BotMove,
    Rematch,
}

/// Strip chat mention syntax (`<@name>`, `<@!name>`, `@name`).
fn strip_mention(s: &str) -> &str {
    let s = s
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|rest| rest.trim_start_matches('!'))
        .unwrap_or(s);
    s.strip_prefix('@').unwrap_or(s)
}

/// Parse a chat message. Messages that don't start with `--` are ignored
/// and yield `Ok(None)`.
pub fn parse(text: &str) -> Result<Option<Command>, BotError> {
    let text = text.trim();
    if !text.starts_with("--") {
        return Ok(None);
    }
    let mut parts = text.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();
    let rest = || args.join(" ");

    let command = match name {
        "--help" => Command::Help,
        "--game" => {
            let (variant, opponent) = match args.as_slice() {
                [variant, opponent, ..] => (*variant, strip_mention(opponent)),
                _ => return Err(BotError::Usage("--game [variant] [@opponent] [fen]")),
            };
            let start_position = (args.len() > 2).then(|| args[2..].join(" "));
            Command::Game {
                variant: variant.to_string(),
                opponent: opponent.to_string(),
                start_position,
            }
        }
        "--selfplay" => Command::SelfPlay {
            variant: args.first().copied().unwrap_or("chess").to_string(),
        },
        "--move" => {
            if args.is_empty() {
                return Err(BotError::Usage("--move [move]"));
            }
            Command::Move(rest())
        }
        "--premove" => match args.as_slice() {
            [] => return Err(BotError::Usage("--premove [move|clear]")),
            ["clear"] => Command::Premove(None),
            _ => Command::Premove(Some(rest())),
        },
        "--display" => Command::Display,
        "--moves" => Command::Moves,
        "--resign" => Command::Resign,
        "--offerdraw" => Command::OfferDraw,
        "--acceptdraw" => Command::AcceptDraw,
        "--takeback" => Command::Takeback,
        "--accepttakeback" => Command::AcceptTakeback,
        "--skill" => match args.first().and_then(|s| s.parse().ok()) {
            Some(level) => Command::Skill(level),
            None => return Err(BotError::Usage("--skill [-20..20]")),
        },
        "--botmove" => Command::BotMove,
        "--rematch" => Command::Rematch,
        other => return Err(BotError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

/// Split a console line `<conversation> <user> <message...>`.
pub fn parse_console_line(line: &str) -> Option<(&str, &str, &str)> {
    let line = line.trim();
    let (conversation, rest) = line.split_once(char::is_whitespace)?;
    let (user, message) = rest.trim_start().split_once(char::is_whitespace)?;
    Some((conversation, user, message.trim()))
}
