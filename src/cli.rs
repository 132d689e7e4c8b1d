use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "investrends")]
#[command(about = "Collects weekly crypto prices from a rate-limited API and exports them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch weekly values for every listed symbol and store them
    Collect {
        /// Path to the SQLite database file
        #[arg(long, default_value = "./crypto.sqlite")]
        db_path: String,

        /// Path to the text file that contains the API key
        #[arg(long, default_value = "apikey.txt")]
        api_key_file: String,

        /// Path to the CSV file with the list of currencies
        #[arg(long, default_value = "digital_currency_list.csv")]
        currency_list: String,

        /// Path to the text file where the resume index is stored
        #[arg(long, default_value = "index.txt")]
        index_path: String,

        /// Keep running across daily rate-limit windows instead of stopping
        #[arg(long)]
        prod: bool,

        /// Clear the blacklist before starting the collection
        #[arg(long)]
        clear_blacklist: bool,

        /// Process symbols in concurrent batches
        #[arg(long)]
        concurrent: bool,

        /// Requests issued between rate-limit pauses
        #[arg(long, default_value_t = 5)]
        batch_size: usize,
    },

    /// Export stored prices to a JSON document grouped by symbol
    Export {
        /// Path to the SQLite database file
        #[arg(long, default_value = "./crypto.sqlite")]
        db_path: String,

        /// Where to write the JSON document
        #[arg(long, default_value = "export.json")]
        output: String,
    },
}
