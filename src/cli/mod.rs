//! Command-line interface parsing and dispatch.

pub mod model_list;

use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::api::RelayMode;
use crate::cli::model_list::list_models;
use crate::core::catalog::{find_model, DEFAULT_MODEL};
use crate::core::config::{Config, DEFAULT_LISTEN_ADDR, DEFAULT_RELAY_URL};
use crate::provider::OpenAiClient;
use crate::server;
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "causerie")]
#[command(about = "A terminal chat client with a built-in relay for OpenAI-compatible APIs")]
#[command(
    long_about = "Causerie is a full-screen terminal chat interface backed by a small relay \
server. The relay exposes POST /api/chat and translates each request into a chat \
completion or an image generation against an OpenAI-compatible provider; the client \
keeps the conversation in memory and issues one relay call per submission.\n\n\
Run the relay with 'causerie serve' (requires OPENAI_API_KEY), then start the chat \
interface with plain 'causerie'.\n\n\
Environment Variables (relay side):\n\
  OPENAI_API_KEY    Provider API key (required by serve)\n\
  OPENAI_BASE_URL   Custom provider base URL (optional)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Shift+Enter       Insert a newline (Alt+Enter also works)\n\
  Tab               Switch between chat and image mode\n\
  Ctrl+P            Open the model picker\n\
  Ctrl+L            Clear the conversation\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to chat with (defaults to the configured default, then gpt-4o)
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Starting mode: chat or image
    #[arg(long, global = true, value_name = "MODE")]
    pub mode: Option<String>,

    /// Relay endpoint the chat client talks to
    #[arg(long, global = true, value_name = "URL")]
    pub relay_url: Option<String>,

    /// Append a plain-text transcript of the session to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Run the relay server
    Serve {
        /// Address to bind, e.g. 127.0.0.1:8087
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },
    /// List the model catalog
    Models,
    /// Persist configuration defaults
    Set {
        /// Configuration key: default-model, default-mode, relay-url
        key: String,
        /// Value to set for the key
        value: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = Config::load()?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let model = args
                .model
                .or_else(|| config.default_model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string());
            let mode = resolve_mode(args.mode.as_deref().or(config.default_mode.as_deref()))?;
            let relay_url = args
                .relay_url
                .or_else(|| config.relay_url.clone())
                .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string());
            run_chat(model, mode, relay_url, args.log).await
        }
        Commands::Serve { listen } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("causerie=info")),
                )
                .init();

            let provider = match OpenAiClient::from_env() {
                Ok(provider) => provider,
                Err(e) => {
                    eprintln!("❌ {e}");
                    std::process::exit(1);
                }
            };
            let listen = listen
                .or_else(|| config.listen_addr.clone())
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
            server::run(&listen, Arc::new(provider)).await
        }
        Commands::Models => {
            list_models(&config);
            Ok(())
        }
        Commands::Set { key, value } => set_config_value(config, &key, &value),
    }
}

fn resolve_mode(mode: Option<&str>) -> Result<RelayMode, Box<dyn Error>> {
    match mode {
        None => Ok(RelayMode::Chat),
        Some(value) => RelayMode::parse(value)
            .ok_or_else(|| format!("invalid mode '{value}' (expected 'chat' or 'image')").into()),
    }
}

fn set_config_value(mut config: Config, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    match key {
        "default-model" => {
            if find_model(value).is_none() {
                println!("⚠️  '{value}' is not in the catalog; it will be passed to the provider as-is.");
            }
            config.default_model = Some(value.to_string());
            config.save()?;
            println!("✅ Set default-model to: {value}");
        }
        "default-mode" => {
            let mode = RelayMode::parse(value).ok_or_else(|| {
                format!("invalid mode '{value}' (expected 'chat' or 'image')")
            })?;
            config.default_mode = Some(mode.as_str().to_string());
            config.save()?;
            println!("✅ Set default-mode to: {value}");
        }
        "relay-url" => {
            config.relay_url = Some(value.to_string());
            config.save()?;
            println!("✅ Set relay-url to: {value}");
        }
        _ => {
            eprintln!("❌ Unknown config key: {key}");
            eprintln!("Valid keys: default-model, default-mode, relay-url");
            std::process::exit(1);
        }
    }
    Ok(())
}
