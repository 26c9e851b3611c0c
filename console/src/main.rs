//! Interactive verification challenge console

mod commands;
mod logging;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use vc_core::{ChallengeConfig, ChallengeEngine};
use vc_infra::{
    ConsoleMessageSender, DeliveryProvider, DemoCredentialVerifier, InfrastructureConfig,
    IssuingDeliveryGateway, MessageSender, MockMessageSender, OtpStore, RecordingNotificationSink,
};
use vc_shared::{AppConfig, Environment, FlowKind};

use crate::session::SessionEnd;

#[derive(Parser, Debug)]
#[command(name = "vc-console", version, about = "Run a verification challenge interactively")]
struct Args {
    /// Flow whose channel set and policy apply (sign-in, mfa, password-reset, reauth)
    #[arg(long, env = "VC_FLOW", default_value = "sign-in")]
    flow: FlowKind,

    /// Email address, phone number or username being verified
    #[arg(long, env = "VC_IDENTIFIER")]
    identifier: String,

    /// Start with "trust this device" ticked
    #[arg(long)]
    trust_device: bool,

    /// Optional TOML file layered over the environment defaults
    #[arg(long, env = "VC_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Variables already set win, so the overlay takes precedence over `.env`
    dotenvy::from_filename(Environment::from_env().dotenv_overlay()).ok();
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let app_config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    logging::init(&app_config.logging, args.verbose)?;

    let infra_config = InfrastructureConfig::from_env().context("loading infrastructure settings")?;
    info!(
        environment = ?app_config.environment,
        flow = %args.flow,
        provider = ?infra_config.delivery_provider,
        "Starting verification console"
    );

    let end = match infra_config.delivery_provider {
        DeliveryProvider::Console => {
            run(&args, &app_config, &infra_config, Arc::new(ConsoleMessageSender::new())).await?
        }
        DeliveryProvider::Mock => {
            run(&args, &app_config, &infra_config, Arc::new(MockMessageSender::new())).await?
        }
    };

    match end {
        SessionEnd::Verified { trust_device } => {
            println!("Verified. Trust this device: {}", if trust_device { "yes" } else { "no" });
        }
        SessionEnd::Quit => println!("Challenge abandoned."),
    }
    Ok(())
}

async fn run<S>(
    args: &Args,
    app_config: &AppConfig,
    infra_config: &InfrastructureConfig,
    sender: Arc<S>,
) -> Result<SessionEnd>
where
    S: MessageSender + 'static,
{
    let config = ChallengeConfig::for_flow(args.flow, &app_config.challenge);
    let store = Arc::new(OtpStore::new(infra_config.code_expiry_seconds));
    let gateway = Arc::new(IssuingDeliveryGateway::new(
        sender,
        store.clone(),
        config.code_length,
        infra_config.code_expiry_seconds,
    ));
    let verifier = Arc::new(DemoCredentialVerifier::from_secrets(
        &infra_config.demo,
        infra_config.bcrypt_cost,
        store,
    )?);
    let sink = Arc::new(RecordingNotificationSink::new());

    let engine = ChallengeEngine::new(config, &args.identifier, gateway, verifier, sink.clone())?;
    if args.trust_device {
        engine.set_trust_device(true);
    }

    session::run(engine, sink).await
}
