use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use chat_stream::client::stream_completion;
use chat_stream::models::{ChatMessage, ChatRequest};
use chat_stream::{ChatClient, ChatConfig, ChatError, StreamDecoder};

/// Stream a chat completion to stdout, token by token
#[derive(Parser, Debug)]
#[command(name = "chat-stream", version, about)]
struct Args {
    /// Prompt text; read from stdin when omitted
    prompt: Vec<String>,

    /// Path to a TOML config file (environment variables used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured model
    #[arg(short, long)]
    model: Option<String>,

    /// Override the configured temperature
    #[arg(short, long)]
    temperature: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ChatConfig::from_file(path)?,
        None => ChatConfig::from_env()?,
    };
    if let Some(model) = args.model {
        config.api.model = model;
    }
    if let Some(temperature) = args.temperature {
        config.api.temperature = temperature;
    }
    config.validate()?;

    let prompt = if args.prompt.is_empty() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim().to_string()
    } else {
        args.prompt.join(" ")
    };
    if prompt.is_empty() {
        return Err(ChatError::Config("Empty prompt".to_string()).into());
    }

    let request = ChatRequest {
        model: config.api.model.clone(),
        messages: vec![ChatMessage::user(prompt)],
        temperature: Some(config.api.temperature),
        max_tokens: None,
        stream: true,
    };

    let client = ChatClient::new(config.api)?;

    // Ctrl-C aborts the in-flight stream, keeping whatever printed so far
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let decoder = StreamDecoder::new()
        .cancellation(cancel)
        .on_token(|delta, _full| {
            print!("{delta}");
            let _ = io::stdout().flush();
        });

    match stream_completion(&client, &request, decoder).await {
        Ok(_full_text) => {
            println!();
            Ok(())
        }
        Err(ChatError::Cancelled) => {
            println!();
            warn!("Stream cancelled");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
