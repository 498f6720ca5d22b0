//! Roastmaster binary
//!
//! Serves the HTTP API by default; `roast` and `chat` run the same client from
//! a terminal.

use clap::Parser;
use roastmaster::{
    cli::{self, Cli, Command},
    config::Config,
    handlers::{self, AppState},
    roast::{CompletionSettings, RoastClient},
    telemetry::{self, LogTarget},
    transport::{HttpTransport, Transport},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = &cli.command {
        let template = cli::generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                eprintln!("Configuration template written to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let config = Arc::new(Config::from_file(&cli.config)?);
    let log_target = match &cli.command {
        None | Some(Command::Serve) => LogTarget::Server,
        _ => LogTarget::Terminal,
    };
    telemetry::init(&config.observability, log_target);

    let api_key = config.provider.resolve_api_key()?;
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.provider, api_key)?);

    match cli.command {
        None | Some(Command::Serve) => serve(config, transport).await?,
        Some(Command::Roast { level, file }) => {
            let client = client_for(&config, transport);
            let level = level.unwrap_or_else(|| config.completion.default_level().to_string());
            let submission = match file {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => {
                    let mut buffer = String::new();
                    tokio::io::stdin().read_to_string(&mut buffer).await?;
                    buffer
                }
            };

            match cli::run_roast(&client, &submission, &level).await {
                Ok(roast) => println!("{}", roast),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Command::Chat { level }) => {
            let client = client_for(&config, transport);
            let level = level.unwrap_or_else(|| config.completion.default_level().to_string());
            let input = BufReader::new(tokio::io::stdin());
            cli::run_chat(&client, &level, input, tokio::io::stdout()).await?;
        }
        Some(Command::Config { .. }) => {}
    }

    Ok(())
}

fn client_for(config: &Config, transport: Arc<dyn Transport>) -> RoastClient {
    let settings = CompletionSettings::from_config(config.provider.model(), &config.completion);
    RoastClient::new(transport, settings)
}

async fn serve(
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| std::net::IpAddr::from([127, 0, 0, 1])),
        config.server.port,
    ));

    tracing::info!(
        model = %config.provider.model(),
        base_url = %config.provider.base_url(),
        "Starting Roastmaster server on {}",
        addr
    );

    let state = AppState::new(config, transport)?;
    let app = handlers::app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
