//! consumer-registry CLI
//!
//! Validates consumer configuration and runs a named consumer end to end
//! against the in-process broker.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use consumer_registry::config::loader::load_config;
use consumer_registry::config::{ConfigWatcher, FileConfigSource};
use consumer_registry::consumer::{HandlerError, Message};
use consumer_registry::observability::logging::init_logging;
use consumer_registry::registry::ConfigGate;
use consumer_registry::{ConsumerRegistry, MemoryBroker, DEFAULT_CONSUMER};

#[derive(Parser)]
#[command(name = "consumer-registry")]
#[command(about = "Inspect and exercise message-queue consumer configuration", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config/consumers.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration file
    Validate,
    /// Print one consumer section as JSON
    Show { name: String },
    /// Publish messages through an in-process broker and consume them
    Demo {
        #[arg(default_value = DEFAULT_CONSUMER)]
        name: String,

        #[arg(short, long, default_value_t = 10)]
        messages: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging("consumer_registry=info")?;

    match cli.command {
        Commands::Validate => {
            let config = load_config(&cli.config)?;
            for (name, section) in config.consumers() {
                println!(
                    "{name}: group={} topics={} workers={}",
                    section.group_id,
                    section.topics.join(","),
                    section.receive_worker_num
                );
            }
            if config.is_empty() {
                println!("no consumer sections configured");
            }
        }
        Commands::Show { name } => {
            let gate = ConfigGate::new(FileConfigSource::new(&cli.config));
            let section = gate.consumer_config(&name).await?;
            println!("{}", serde_json::to_string_pretty(&section)?);
        }
        Commands::Demo { name, messages } => run_demo(cli.config, name, messages).await?,
    }

    Ok(())
}

async fn run_demo(
    path: PathBuf,
    name: String,
    messages: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = Arc::new(FileConfigSource::new(&path));
    let _watcher = ConfigWatcher::new(Arc::clone(&source)).run()?;

    let broker = MemoryBroker::new();
    let registry = Arc::new(ConsumerRegistry::new(source, broker.clone()));

    let config = registry.load_config(&name).await?;
    for addr in &config.addrs {
        broker.listen(addr.clone());
    }

    // Construct before the loop starts so both paths share one handle
    registry.get_or_create(&name).await?;

    let handled = Arc::new(AtomicUsize::new(0));
    let handler = logging_handler(Arc::clone(&handled));
    let loop_registry = Arc::clone(&registry);
    let loop_name = name.clone();
    let receiver = tokio::spawn(async move { loop_registry.receive(&loop_name, handler).await });

    let mut expected = 0;
    for i in 0..messages {
        for topic in &config.topics {
            expected += broker.publish(topic, format!("key-{i}"), format!("message {i}"));
        }
    }

    tokio::time::timeout(Duration::from_secs(30), async {
        while handled.load(Ordering::SeqCst) < expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    registry.close(&name).await;
    receiver.await??;

    println!("{name}: handled {expected} messages");
    Ok(())
}

/// Handler that logs each message and bumps `counter`.
fn logging_handler(
    counter: Arc<AtomicUsize>,
) -> impl Fn(&str, &[u8], &Message) -> Result<(), HandlerError> + Send + Sync + 'static {
    move |topic: &str, key: &[u8], msg: &Message| -> Result<(), HandlerError> {
        tracing::info!(
            topic,
            key = %String::from_utf8_lossy(key),
            offset = msg.offset,
            payload = %String::from_utf8_lossy(&msg.payload),
            "Message received"
        );
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
