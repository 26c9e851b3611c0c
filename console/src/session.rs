//! Interactive loop driving one challenge from stdin

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use vc_core::{
    ChallengeEngine, ChallengePhase, ChallengeSnapshot, ChallengeTicker, CredentialVerifierTrait,
    DeliveryGatewayTrait, NotificationKind, SendOutcome, SubmitOutcome,
};
use vc_infra::RecordingNotificationSink;

use crate::commands::{Command, HELP};

pub type ConsoleEngine<D, V> = ChallengeEngine<D, V, RecordingNotificationSink>;

/// How the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Verified { trust_device: bool },
    Quit,
}

/// Run the challenge until it succeeds, the user quits, or stdin closes
pub async fn run<D, V>(
    engine: ConsoleEngine<D, V>,
    sink: Arc<RecordingNotificationSink>,
) -> Result<SessionEnd>
where
    D: DeliveryGatewayTrait + 'static,
    V: CredentialVerifierTrait + 'static,
{
    let _ticker = ChallengeTicker::start(engine.clone());

    println!("Verifying {}", engine.masked_identifier());
    println!("{}", render(&engine.snapshot()));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            info!(flow_id = %engine.flow_id(), "Input closed, leaving challenge");
            return Ok(SessionEnd::Quit);
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        debug!(?command, "Console command");

        if let Some(end) = execute(&engine, command).await? {
            print_notifications(&sink);
            return Ok(end);
        }
        print_notifications(&sink);
    }
}

/// Apply one command; returns `Some` when the session is over
pub async fn execute<D, V>(
    engine: &ConsoleEngine<D, V>,
    command: Command,
) -> Result<Option<SessionEnd>>
where
    D: DeliveryGatewayTrait,
    V: CredentialVerifierTrait,
{
    match command {
        Command::Help => println!("{}", HELP),
        Command::Channels => {
            let active = engine.active_channel();
            for channel in engine.available_channels() {
                let marker = if *channel == active { "*" } else { " " };
                println!(" {} {:<14} {}", marker, channel.as_str(), channel.label());
            }
        }
        Command::Use(channel) => {
            if engine.select_channel(channel).is_ok() {
                println!("{}", render(&engine.snapshot()));
            }
        }
        Command::Send => match engine.request_send().await {
            Ok(SendOutcome::NotRequired) => {
                println!("{} needs no code to be sent", engine.active_channel().label())
            }
            Ok(SendOutcome::Sent { .. }) | Err(_) => {}
        },
        Command::Digit { slot, digit } => {
            if !engine.input_digit(slot, digit) {
                println!("Cannot put '{}' into slot {}", digit, slot + 1);
            }
            println!("{}", render(&engine.snapshot()));
        }
        Command::Type(digit) => {
            engine.type_digit(digit);
            println!("{}", render(&engine.snapshot()));
        }
        Command::Paste(text) => {
            let written = engine.paste_code(&text);
            if written == 0 {
                println!("Nothing pasted");
            }
            println!("{}", render(&engine.snapshot()));
        }
        Command::Back(slot) => {
            engine.backspace(slot);
            println!("{}", render(&engine.snapshot()));
        }
        Command::Secret(text) => engine.set_secret(&text),
        Command::Trust(trust_device) => {
            engine.set_trust_device(trust_device);
            println!("Trust this device: {}", on_off(trust_device));
        }
        Command::Submit => match engine.submit().await {
            Ok(SubmitOutcome::Succeeded { trust_device }) => {
                return Ok(Some(SessionEnd::Verified { trust_device }));
            }
            Ok(SubmitOutcome::AlreadySucceeded) => {
                let trust_device = engine.snapshot().trust_device;
                return Ok(Some(SessionEnd::Verified { trust_device }));
            }
            Ok(SubmitOutcome::Superseded) => {
                println!("Channel changed while verifying; submit again")
            }
            Err(_) => {}
        },
        Command::Status => println!("{}", render(&engine.snapshot())),
        Command::Json => println!("{}", serde_json::to_string_pretty(&engine.snapshot())?),
        Command::Reset => match engine.reset() {
            Ok(()) => println!("{}", render(&engine.snapshot())),
            Err(e) => println!("{}", e),
        },
        Command::Quit => return Ok(Some(SessionEnd::Quit)),
    }
    Ok(None)
}

fn print_notifications(sink: &RecordingNotificationSink) {
    for notification in sink.drain() {
        let tag = match notification.kind {
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warn",
            NotificationKind::Error => "error",
            NotificationKind::Success => "ok",
        };
        println!("[{}] {}", tag, notification.message);
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Text rendering of a snapshot
pub fn render(snapshot: &ChallengeSnapshot) -> String {
    let mut lines = vec![format!(
        "Channel: {} ({})",
        snapshot.active_channel.label(),
        snapshot.active_channel
    )];

    if snapshot.code_slots.is_empty() {
        lines.push(format!("Entered: {}", "*".repeat(snapshot.secret_length)));
    } else {
        let slots: String = snapshot
            .code_slots
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                let digit = slot.unwrap_or('_');
                if snapshot.active_slot == Some(index) {
                    format!(">{}<", digit)
                } else {
                    format!("[{}]", digit)
                }
            })
            .collect();
        lines.push(format!("Code: {}", slots));
    }

    let mut status = Vec::new();
    if snapshot.active_channel.requires_delivery() {
        if snapshot.can_resend {
            let hint = if snapshot.code_sent {
                "Resend available"
            } else {
                "Send a code"
            };
            status.push(hint.to_string());
        } else if snapshot.cooldown_remaining > 0 {
            status.push(format!("Resend in {}s", snapshot.cooldown_remaining));
        }
    }
    status.push(format!("Attempts left: {}", snapshot.remaining_attempts));
    if let Some(seconds) = snapshot.lock_remaining_seconds {
        status.push(format!("Locked for {}s", seconds));
    }
    status.push(format!("Trust device: {}", on_off(snapshot.trust_device)));
    if snapshot.phase == ChallengePhase::Succeeded {
        status.push("Verified".to_string());
    }
    lines.push(status.join(" | "));

    lines.join("\n")
}
