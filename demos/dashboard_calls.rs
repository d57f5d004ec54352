//! Walks through the calls the dashboard makes on a typical page load.
//!
//! This example shows how to:
//! - Build a client from environment variables
//! - Register a bearer-token provider
//! - Create an agent, give it a wallet and a daily spend limit
//! - Look up a market price
//! - Stream a chat reply
//! - Present failures as one-line messages
//!
//! Run against a local backend with:
//! `AVAAGENT_API_URL=http://localhost:8000/api/v1 AVAAGENT_TOKEN=... cargo run --example dashboard_calls`

use avaagent_client::endpoints::agents::{AgentType, NewAgent};
use avaagent_client::endpoints::ai::ChatRequest;
use avaagent_client::endpoints::data::PriceQuery;
use avaagent_client::endpoints::wallets::{NewWallet, SpendLimitPeriod, SpendLimitUpdate};
use avaagent_client::{Client, Error};
use std::io::Write;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("avaagent_client=debug,dashboard_calls=info")
        .init();

    if let Err(e) = run().await {
        // What a toast notification would show
        eprintln!("Error: {}", e.message());
        if let Some(code) = e.code() {
            eprintln!("Code: {code}");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let client = Client::from_env()?;
    client.set_token_provider(|| async { std::env::var("AVAAGENT_TOKEN").ok() });

    println!("=== Health ===");
    let readiness = client.health().ready().await?;
    println!("Backend status: {}", readiness.status);
    for failing in readiness.failing() {
        println!("  failing check: {failing}");
    }

    println!("=== Create agent ===");
    let agent = client
        .agents()
        .create(
            &NewAgent::new("Treasury bot")
                .agent_type(AgentType::Treasury)
                .description("Keeps USDC reserves topped up"),
        )
        .await?;
    println!("Agent {} is {:?}", agent.id, agent.status);

    println!("=== Wallet and guardrails ===");
    let wallet = client
        .wallets()
        .create(&NewWallet::new(&agent.id).primary())
        .await?;
    println!("Wallet {} on {:?}", wallet.address, wallet.chain_network);

    let limit = client
        .wallets()
        .set_spend_limit(
            &wallet.id,
            &SpendLimitUpdate {
                period: SpendLimitPeriod::Daily,
                max_amount_usd: 500.0,
            },
        )
        .await?;
    println!(
        "Daily limit ${:.2}, ${:.2} remaining",
        limit.max_amount_usd, limit.remaining_usd
    );

    println!("=== Market data ===");
    let price = client.data().price("AVAX", &PriceQuery::default()).await?;
    match (price.price, price.error) {
        (Some(value), _) => println!("AVAX/{}: {value}", price.quote),
        (None, Some(error)) => println!("Price unavailable: {error}"),
        (None, None) => println!("Price unavailable"),
    }

    println!("=== Chat ===");
    let reply = client
        .ai()
        .chat_stream(
            &ChatRequest::new("Summarise what this agent is allowed to do."),
            |text| {
                print!("{text}");
                let _ = std::io::stdout().flush();
            },
        )
        .await?;
    println!("\n({} characters)", reply.chars().count());

    Ok(())
}
