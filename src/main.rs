use clap::{Parser, Subcommand};
use std::process;
use workq::output::{JsonOutputWriter, OutputWriter, TableOutputWriter};
use workq::{Config, Message, WorkQueue, WorkqAdmin};

#[derive(Parser)]
#[command(name = "workq")]
#[command(about = "A PostgreSQL-backed work queue CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database URL (overrides config file)
    #[arg(long)]
    database_url: Option<String>,

    /// Config file path
    #[arg(long, short = 'c', default_value = "workq.yaml")]
    config: String,

    /// Emit JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the workq schema
    Install,
    /// Uninstall the workq schema
    Uninstall,
    /// Verify the workq installation
    Verify,
    /// Queue management commands
    Queue {
        #[command(subcommand)]
        action: QueueCommands,
    },
    /// Message management commands
    Message {
        #[command(subcommand)]
        action: MessageCommands,
    },
}

#[derive(Subcommand)]
enum QueueCommands {
    /// Show the total row count of a queue
    Size {
        /// Name of the queue
        name: String,
    },
    /// Show per-queue visible depths
    Detail {
        /// Include leased (unacked) counts per shard
        #[arg(long)]
        verbose: bool,
    },
    /// Delete all messages from a queue
    Flush {
        /// Name of the queue to flush
        name: String,
    },
    /// Return abandoned leases to the queue
    Reclaim {
        /// Name of the queue (all queues when omitted)
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum MessageCommands {
    /// Push a message onto a queue
    Push {
        /// Name of the queue
        queue: String,
        /// Message id, unique within the queue
        id: String,
        /// Delivery priority; higher pops earlier
        #[arg(long, short = 'p', default_value = "0")]
        priority: i32,
        /// Delay in seconds before the message becomes visible
        #[arg(long, short = 'd', default_value = "0")]
        offset: i64,
        /// Opaque payload string
        #[arg(long)]
        payload: Option<String>,
    },
    /// Poll (lease) messages from a queue
    Poll {
        /// Name of the queue
        queue: String,
        /// Number of messages to poll
        #[arg(long, short = 'n', default_value = "1")]
        count: usize,
        /// Milliseconds to keep polling for a full batch
        #[arg(long, default_value = "0")]
        timeout_ms: u64,
    },
    /// Acknowledge (delete) a leased message
    Ack {
        /// Name of the queue
        queue: String,
        /// Message id to ack
        id: String,
    },
    /// Remove a message regardless of lease state
    Remove {
        /// Name of the queue
        queue: String,
        /// Message id to remove
        id: String,
    },
    /// Check whether a message exists
    Exists {
        /// Name of the queue
        queue: String,
        /// Message id to probe
        id: String,
    },
    /// Show the stored row for a message, including its delivery schedule
    Show {
        /// Name of the queue
        queue: String,
        /// Message id to show
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run_cli(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run_cli(cli: Cli) -> anyhow::Result<()> {
    // Load configuration
    let config = if let Some(db_url) = cli.database_url {
        Config::from_dsn(db_url)
    } else {
        Config::from_file(&cli.config).unwrap_or_else(|_| {
            tracing::warn!("Could not load config file, using defaults");
            Config::default()
        })
    };

    let writer = if cli.json {
        OutputWriter::Json(JsonOutputWriter)
    } else {
        OutputWriter::Table(TableOutputWriter)
    };

    match cli.command {
        Commands::Install => {
            println!("Installing workq schema...");
            let admin = WorkqAdmin::new(&config).await?;
            admin.install().await?;
            println!("Installation completed successfully");
        }

        Commands::Uninstall => {
            println!("Uninstalling workq schema...");
            let admin = WorkqAdmin::new(&config).await?;
            admin.uninstall().await?;
            println!("Uninstall completed successfully");
        }

        Commands::Verify => {
            println!("Verifying workq installation...");
            let admin = WorkqAdmin::new(&config).await?;
            admin.verify().await?;
            println!("Verification completed successfully");
        }

        Commands::Queue { action } => {
            let engine = WorkQueue::connect(&config).await?;
            handle_queue_commands(&engine, &writer, action).await?;
        }

        Commands::Message { action } => {
            let engine = WorkQueue::connect(&config).await?;
            handle_message_commands(&engine, &writer, action).await?;
        }
    }

    Ok(())
}

async fn handle_queue_commands(
    engine: &WorkQueue,
    writer: &OutputWriter,
    action: QueueCommands,
) -> anyhow::Result<()> {
    match action {
        QueueCommands::Size { name } => {
            let size = engine.get_size(&name).await?;
            println!("{}", size);
        }

        QueueCommands::Detail { verbose } => {
            if verbose {
                let detail = engine.queues_detail_verbose().await?;
                if detail.is_empty() {
                    println!("No queues found");
                } else {
                    writer.write_detail(&detail, &mut std::io::stdout())?;
                }
            } else {
                let detail = engine.queues_detail().await?;
                if detail.is_empty() {
                    println!("No queues found");
                } else {
                    writer.write_detail(&detail, &mut std::io::stdout())?;
                }
            }
        }

        QueueCommands::Flush { name } => {
            println!("Flushing queue '{}'...", name);
            let removed = engine.flush(&name).await?;
            println!("Removed {} messages", removed);
        }

        QueueCommands::Reclaim { name } => {
            let reclaimed = match name {
                Some(name) => {
                    println!("Reclaiming abandoned leases in '{}'...", name);
                    engine.process_unacks(&name).await?
                }
                None => {
                    println!("Reclaiming abandoned leases in all queues...");
                    engine.process_all_unacks().await?
                }
            };
            println!("Recycled {} messages", reclaimed);
        }
    }
    Ok(())
}

async fn handle_message_commands(
    engine: &WorkQueue,
    writer: &OutputWriter,
    action: MessageCommands,
) -> anyhow::Result<()> {
    match action {
        MessageCommands::Push {
            queue,
            id,
            priority,
            offset,
            payload,
        } => {
            println!("Pushing message '{}' to queue '{}'...", id, queue);
            match payload {
                Some(payload) => {
                    let message = Message::with_priority(id, priority, payload);
                    engine.push_messages(&queue, &[message]).await?;
                }
                None => {
                    engine.push(&queue, &id, priority, offset).await?;
                }
            }
            println!("Message pushed successfully");
        }

        MessageCommands::Poll {
            queue,
            count,
            timeout_ms,
        } => {
            let messages = engine.poll_messages(&queue, count, timeout_ms).await?;
            if messages.is_empty() {
                println!("No messages available");
            } else {
                writer.write_list(&messages, &mut std::io::stdout())?;
            }
        }

        MessageCommands::Ack { queue, id } => {
            let acked = engine.ack(&queue, &id).await?;
            if acked {
                println!("Message acked successfully");
            } else {
                println!("Message not found");
            }
        }

        MessageCommands::Remove { queue, id } => {
            engine.remove(&queue, &id).await?;
            println!("Message removed");
        }

        MessageCommands::Exists { queue, id } => {
            let exists = engine.exists(&queue, &id).await?;
            println!("{}", exists);
        }

        MessageCommands::Show { queue, id } => match engine.get_message(&queue, &id).await? {
            Some(row) => writer.write_list(&[row], &mut std::io::stdout())?,
            None => println!("Message not found"),
        },
    }
    Ok(())
}
