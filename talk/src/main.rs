use anyhow::{Context, bail};
use clap::Parser;
use persona::{Event, Exchange, HttpGateway, Phase, Session};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about = "Talk with anyone from the terminal")]
struct Cli {
    /// Completion gateway endpoint
    #[arg(
        long,
        env = "TALK_GATEWAY_URL",
        default_value = "http://127.0.0.1:3000/api/generate"
    )]
    gateway: String,

    /// Who to talk with, e.g. "John Dorian"
    #[arg(long)]
    name: Option<String>,

    /// Who this is, e.g. "the main character from Scrubs"
    #[arg(long)]
    details: Option<String>,

    /// Print every prompt sent and what came back
    #[arg(long)]
    show_prompts: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    println!(
        "Enter the name of anyone, a movie character, a famous musician, a politician, etc. \
         and give some details about who this is."
    );
    let name = match cli.name {
        Some(name) => name,
        None => ask(&mut input, "Name: ").await?,
    };
    let details = match cli.details {
        Some(details) => details,
        None => ask(&mut input, "Details: ").await?,
    };

    tracing::debug!(gateway = %cli.gateway, "starting session");
    let session = Session::new(Arc::new(HttpGateway::new(&cli.gateway)));
    let mut events = session.subscribe();

    session.submit_persona(&name, &details).await?.await?;
    let snap = session.snapshot().await;
    let persona = snap.persona.context("persona was not set")?;
    if snap.phase == Phase::AwaitingDescription {
        eprintln!(
            "could not describe {}: {}",
            persona.name,
            failure(&mut events).unwrap_or_default()
        );
    }
    if cli.show_prompts {
        if let Some(exchange) = session.description_exchange().await {
            show(&exchange);
        }
    }
    println!("Talk with {}!", persona.name);

    loop {
        let Some(line) = prompt_line(&mut input, "You: ").await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        session.say(&line).await?.await?;

        let snap = session.snapshot().await;
        if snap.input_disabled {
            bail!(
                "{} did not answer ({}); the conversation cannot continue",
                persona.name,
                failure(&mut events).unwrap_or_else(|| "unknown error".into())
            );
        }
        if cli.show_prompts {
            if let Some(exchange) = session.last_exchange().await {
                show(&exchange);
            }
        }
        if let Some(reply) = snap.history.last() {
            println!("{}: {reply}", persona.name);
        }
    }

    session.dispose();
    Ok(())
}

async fn prompt_line(
    input: &mut Lines<BufReader<Stdin>>,
    label: &str,
) -> anyhow::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

async fn ask(input: &mut Lines<BufReader<Stdin>>, label: &str) -> anyhow::Result<String> {
    loop {
        match prompt_line(input, label).await? {
            Some(line) if !line.trim().is_empty() => return Ok(line.trim().to_string()),
            Some(_) => continue,
            None => bail!(
                "input closed before {} was given",
                label.trim_end_matches([':', ' '])
            ),
        }
    }
}

/// Most recent failure message among the queued events.
fn failure(events: &mut broadcast::Receiver<Event>) -> Option<String> {
    let mut last = None;
    loop {
        match events.try_recv() {
            Ok(Event::GenerationFailed { error, .. }) => last = Some(error),
            Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => return last,
        }
    }
}

fn show(exchange: &Exchange) {
    println!(
        "--- prompt ---\n{}\n--- outcome ---\n{}\n--------------",
        exchange.prompt, exchange.outcome
    );
}
