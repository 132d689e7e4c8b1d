use clap::Parser;
use log::info;

use investrends::collector::Collector;
use investrends::config::{CollectorConfig, DEFAULT_API_URL};
use investrends::error::Result;
use investrends::exporter::export_to_json;
use investrends::store::Store;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Commands::Collect {
            db_path,
            api_key_file,
            currency_list,
            index_path,
            prod,
            clear_blacklist,
            concurrent,
            batch_size,
        } => {
            let config = CollectorConfig::new(
                db_path,
                api_key_file,
                DEFAULT_API_URL,
                currency_list,
                index_path,
                prod,
            )?;
            let collector = Collector::new(config);

            let summary = if concurrent {
                collector.run_concurrent(batch_size, clear_blacklist).await?
            } else {
                collector.run(batch_size, clear_blacklist).await?
            };

            info!("Processed {} symbols", summary.processed);
            println!("Program ran successfully.");
        }
        Commands::Export { db_path, output } => {
            let store = Store::open(db_path)?;
            export_to_json(&store, &output)?;
            println!("Data exported successfully to {output}");
        }
    }

    Ok(())
}
