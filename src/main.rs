use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wallet_engine::application::service::WalletService;
use wallet_engine::domain::ports::WalletStoreBox;
use wallet_engine::infrastructure::in_memory::InMemoryWalletStore;
use wallet_engine::interfaces::csv::balance_writer::BalanceWriter;
use wallet_engine::interfaces::csv::operation_reader::{OperationReader, WalletCommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable CSV.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let store: WalletStoreBox = match cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => Box::new(
            wallet_engine::infrastructure::rocksdb::RocksDbWalletStore::open(db_path)
                .into_diagnostic()?,
        ),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            return Err(miette::miette!(
                "persistent storage requires building with the storage-rocksdb feature"
            ));
        }
        None => Box::new(InMemoryWalletStore::new()),
    };
    let service = WalletService::new(store);

    // Process operations
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);

    let mut seen = BTreeSet::new();
    for record in reader.records() {
        match record.and_then(|record| record.into_command()) {
            Ok(WalletCommand::Create(id)) => {
                seen.insert(id);
                if let Err(e) = service.create_wallet(id).await {
                    eprintln!("Error processing operation: {e}");
                }
            }
            Ok(WalletCommand::Apply(operation)) => {
                seen.insert(operation.wallet);
                if let Err(e) = service.process_operation(operation).await {
                    eprintln!("Error processing operation: {e}");
                }
            }
            Err(e) => eprintln!("Error reading operation: {e}"),
        }
    }

    // Report the final balance of every wallet the batch touched
    let mut views = Vec::new();
    for id in seen {
        if let Ok(view) = service.get_balance(id).await {
            views.push(view);
        }
    }

    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_views(views).into_diagnostic()?;

    Ok(())
}
