use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{EventManager, NotificationClient, NotificationEditor, NotificationResource};
use shared::domain::{Channel, Notification, NotificationId};

#[derive(Parser, Debug)]
#[command(about = "Admin console for the notification service")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every notification on the server.
    List,
    /// Fetch a single notification by id.
    Get { id: i64 },
    /// Create a notification.
    Create {
        /// EMAIL, SMS or MOBILE.
        #[arg(long)]
        channel: Channel,
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "")]
        from: String,
        #[arg(long)]
        msg_uri: String,
    },
    /// Replace an existing notification.
    Update {
        id: i64,
        /// EMAIL, SMS or MOBILE.
        #[arg(long)]
        channel: Channel,
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "")]
        from: String,
        #[arg(long)]
        msg_uri: String,
    },
    /// Delete a notification by id.
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let client = Arc::new(NotificationClient::new(&args.server_url)?);
    let events = Arc::new(EventManager::new());
    let editor = NotificationEditor::new(
        Arc::clone(&client) as Arc<dyn NotificationResource>,
        events,
    );

    match args.command {
        Command::List => print_json(&client.query().await?)?,
        Command::Get { id } => print_json(&client.get(NotificationId(id)).await?)?,
        Command::Create {
            channel,
            to,
            from,
            msg_uri,
        } => {
            let saved = editor
                .save(Notification::new(channel, to, from, msg_uri))
                .await?;
            print_json(&saved)?;
        }
        Command::Update {
            id,
            channel,
            to,
            from,
            msg_uri,
        } => {
            let mut entity = Notification::new(channel, to, from, msg_uri);
            entity.id = Some(NotificationId(id));
            print_json(&editor.save(entity).await?)?;
        }
        Command::Delete { id } => {
            editor.delete(NotificationId(id)).await?;
            println!("deleted notification {id}");
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
