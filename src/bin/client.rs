use std::env;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

/// Kiosk terminal
#[derive(Parser, Debug)]
#[command(name = "kiosk")]
#[command(about = "client cli used at the restaurant kiosk to build and place orders", version, long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// show the menu grouped by course
    Menu,
    /// order session related ops
    #[command(arg_required_else_help = true)]
    Session(SessionArgs),
    /// items of an order
    #[command(arg_required_else_help = true)]
    Item(ItemArgs),
    /// show the order details and total without placing the order
    #[command(arg_required_else_help = true)]
    Receipt(SessionRef),
    /// place the order and save it for the customer
    #[command(arg_required_else_help = true)]
    Submit {
        #[command(flatten)]
        session: SessionRef,
        #[arg(long, help = "Customer name and ID", value_name = "NAME_AND_ID")]
        customer: String,
    },
    /// clear every selected item
    #[command(arg_required_else_help = true)]
    Cancel(SessionRef),
}

#[derive(Debug, Args)]
struct SessionRef {
    #[arg(short = 's', help = "Session id to operate", value_parser = clap::value_parser!(u64).range(1..))]
    sid: u64,
}

#[derive(Debug, Args)]
struct SessionArgs {
    #[command(subcommand)]
    command: SessionCmds,
}

#[derive(Debug, Subcommand)]
enum SessionCmds {
    New,
    #[command(arg_required_else_help = true)]
    Show(SessionRef),
    #[command(arg_required_else_help = true)]
    Close(SessionRef),
}

#[derive(Debug, Args)]
struct ItemArgs {
    #[command(flatten)]
    session: SessionRef,
    #[command(subcommand)]
    command: ItemCmds,
}

#[derive(Debug, Subcommand)]
enum ItemCmds {
    #[command(arg_required_else_help = true)]
    Add {
        #[arg(long, help = "Menu entry to add.", value_name = "ENTRY_ID")]
        id: usize,
        #[arg(short = 'q', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10))]
        quantity: u32,
    },
    #[command(arg_required_else_help = true)]
    Qty {
        #[arg(long, help = "Menu entry to change.", value_name = "ENTRY_ID")]
        id: usize,
        #[arg(short = 'q', long, value_parser = clap::value_parser!(u32).range(1..=10))]
        quantity: u32,
    },
    #[command(arg_required_else_help = true)]
    Remove {
        #[arg(long, help = "Menu entry to remove.", value_name = "ENTRY_ID")]
        id: usize,
    },
}

const DEFAULT_HOST: &str = "http://localhost:8080";

#[derive(Debug, Deserialize)]
struct MenuResponse {
    groups: Vec<MenuGroup>,
}

#[derive(Debug, Deserialize)]
struct MenuGroup {
    label: String,
    entries: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
struct MenuItem {
    entry_id: usize,
    description: String,
    unit_price: String,
}

#[derive(Debug, Deserialize)]
struct SessionCreated {
    session_id: u64,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session_id: u64,
    created_at: String,
    selections: Vec<Selection>,
}

#[derive(Debug, Deserialize)]
struct Selection {
    entry_id: usize,
    description: String,
    quantity: u8,
}

#[derive(Debug, Deserialize)]
struct QuantityUpdated {
    updated: bool,
}

#[derive(Debug, Deserialize)]
struct ReceiptResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    text: String,
    saved_to: String,
}

/// Prints non-OK responses, returns the response back only on success.
async fn expect_ok(res: Response) -> anyhow::Result<Option<Response>> {
    match res.status() {
        StatusCode::OK => Ok(Some(res)),
        StatusCode::BAD_REQUEST => {
            println!("Bad request, {}", res.text().await?);
            Ok(None)
        }
        StatusCode::NOT_FOUND => {
            println!("Resource not found");
            Ok(None)
        }
        StatusCode::INTERNAL_SERVER_ERROR => {
            println!("Server error, {}", res.text().await?);
            Ok(None)
        }
        unexpected => {
            println!("got unexpected status code, {}", unexpected);
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    let host = env::var("KIOSK_HOST").unwrap_or(DEFAULT_HOST.to_string());
    let client = Client::new();

    match args.command {
        Commands::Menu => {
            let res = client.get(format!("{}/v1/menu", host)).send().await?;
            if let Some(res) = expect_ok(res).await? {
                let menu = res.json::<MenuResponse>().await.context("failed to read menu")?;
                if menu.groups.is_empty() {
                    println!("the menu is empty");
                }
                for group in menu.groups {
                    println!("{}:", group.label);
                    for item in group.entries {
                        println!("  [{}] {} (${})", item.entry_id, item.description, item.unit_price);
                    }
                }
            }
        }
        Commands::Session(args) => match args.command {
            SessionCmds::New => {
                let res = client.post(format!("{}/v1/sessions", host)).send().await?;
                if let Some(res) = expect_ok(res).await? {
                    let created = res.json::<SessionCreated>().await.context("failed to read session")?;
                    println!("session {} opened", created.session_id);
                }
            }
            SessionCmds::Show(SessionRef { sid }) => {
                let res = client.get(format!("{}/v1/session/{}", host, sid)).send().await?;
                if let Some(res) = expect_ok(res).await? {
                    let session = res.json::<SessionResponse>().await.context("failed to read session")?;
                    println!("session {} opened at {}", session.session_id, session.created_at);
                    if session.selections.is_empty() {
                        println!("  nothing selected yet");
                    }
                    for s in session.selections {
                        println!("  [{}] {} x{}", s.entry_id, s.description, s.quantity);
                    }
                }
            }
            SessionCmds::Close(SessionRef { sid }) => {
                let res = client.delete(format!("{}/v1/session/{}", host, sid)).send().await?;
                if expect_ok(res).await?.is_some() {
                    println!("session {} closed", sid);
                }
            }
        },
        Commands::Item(args) => {
            let sid = args.session.sid;
            match args.command {
                ItemCmds::Add { id, quantity } => {
                    let res = client
                        .put(format!("{}/v1/session/{}/item/{}", host, sid, id))
                        .json(&serde_json::json!({ "quantity": quantity }))
                        .send()
                        .await?;
                    if expect_ok(res).await?.is_some() {
                        println!("added entry {} x{} to session {}", id, quantity, sid);
                    }
                }
                ItemCmds::Qty { id, quantity } => {
                    let res = client
                        .patch(format!("{}/v1/session/{}/item/{}", host, sid, id))
                        .json(&serde_json::json!({ "quantity": quantity }))
                        .send()
                        .await?;
                    if let Some(res) = expect_ok(res).await? {
                        match res.json::<QuantityUpdated>().await?.updated {
                            true => println!("entry {} is now x{}", id, quantity),
                            false => println!("entry {} is not selected, add it first", id),
                        }
                    }
                }
                ItemCmds::Remove { id } => {
                    let res = client
                        .delete(format!("{}/v1/session/{}/item/{}", host, sid, id))
                        .send()
                        .await?;
                    if expect_ok(res).await?.is_some() {
                        println!("removed entry {} from session {}", id, sid);
                    }
                }
            }
        }
        Commands::Receipt(SessionRef { sid }) => {
            let res = client.get(format!("{}/v1/session/{}/receipt", host, sid)).send().await?;
            if let Some(res) = expect_ok(res).await? {
                print!("{}", res.json::<ReceiptResponse>().await?.text);
            }
        }
        Commands::Submit { session: SessionRef { sid }, customer } => {
            let res = client
                .post(format!("{}/v1/session/{}/submit", host, sid))
                .json(&serde_json::json!({ "customer_id": customer }))
                .send()
                .await?;
            if let Some(res) = expect_ok(res).await? {
                let submitted = res.json::<SubmitResponse>().await?;
                print!("{}", submitted.text);
                println!("Thank you for your order, {}. Order details saved to {}", customer, submitted.saved_to);
            }
        }
        Commands::Cancel(SessionRef { sid }) => {
            let res = client.post(format!("{}/v1/session/{}/cancel", host, sid)).send().await?;
            if expect_ok(res).await?.is_some() {
                println!("order of session {} cleared", sid);
            }
        }
    };
    Ok(())
}
