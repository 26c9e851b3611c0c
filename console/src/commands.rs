//! Parsing of interactive console commands

use thiserror::Error;

use vc_core::Channel;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Channels,
    Use(Channel),
    Send,
    Digit { slot: usize, digit: char },
    Type(char),
    Paste(String),
    Back(usize),
    Secret(String),
    Trust(bool),
    Submit,
    Status,
    Json,
    Reset,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    InvalidArgument(String),
}

pub const HELP: &str = "\
Commands:
  channels              list available channels
  use <channel>         switch channel (password, totp, sms, whatsapp, email, recovery)
  send                  send or resend a code
  digit <slot> <d>      put digit d into slot (1-based)
  type <d>              put digit d into the focused slot
  paste <text>          paste a code; non-digits are ignored
  back <slot>           backspace on slot (1-based)
  secret <text>         set password or recovery code
  trust on|off          remember this device after success
  submit                verify the entered secret
  status                show the challenge
  json                  show the challenge as JSON
  reset                 start over
  quit                  leave";

impl Command {
    /// Parse a line; `Ok(None)` for blank input
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "channels" | "ls" => Command::Channels,
            "use" | "channel" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("use <channel>"));
                }
                Command::Use(rest.parse().map_err(CommandError::InvalidArgument)?)
            }
            "send" | "resend" => Command::Send,
            "digit" => {
                let mut parts = rest.split_whitespace();
                let (Some(slot), Some(digit), None) = (parts.next(), parts.next(), parts.next())
                else {
                    return Err(CommandError::Usage("digit <slot> <d>"));
                };
                Command::Digit {
                    slot: parse_slot(slot)?,
                    digit: parse_digit(digit)?,
                }
            }
            "type" => Command::Type(parse_digit(rest)?),
            "paste" => Command::Paste(rest.to_string()),
            "back" | "backspace" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("back <slot>"));
                }
                Command::Back(parse_slot(rest)?)
            }
            "secret" | "password" => Command::Secret(rest.to_string()),
            "trust" => match rest.to_lowercase().as_str() {
                "on" | "yes" | "true" => Command::Trust(true),
                "off" | "no" | "false" => Command::Trust(false),
                _ => return Err(CommandError::Usage("trust on|off")),
            },
            "submit" | "verify" => Command::Submit,
            "status" => Command::Status,
            "json" => Command::Json,
            "reset" => Command::Reset,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Slots are shown 1-based
fn parse_slot(raw: &str) -> Result<usize, CommandError> {
    match raw.parse::<usize>() {
        Ok(slot) if slot >= 1 => Ok(slot - 1),
        _ => Err(CommandError::InvalidArgument(format!(
            "Slot must be a number from 1, got '{}'",
            raw
        ))),
    }
}

fn parse_digit(raw: &str) -> Result<char, CommandError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(digit), None) if digit.is_ascii_digit() => Ok(digit),
        _ => Err(CommandError::InvalidArgument(format!(
            "Expected a single digit, got '{}'",
            raw
        ))),
    }
}
