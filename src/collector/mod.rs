use std::sync::Arc;

use log::{info, warn};
use tokio::time::sleep;

use crate::config::{CollectorConfig, WEEKS_PER_SYMBOL};
use crate::error::{AppError, Result};
use crate::store::Store;

pub mod checkpoint;
pub mod classify;
pub mod extract;
pub mod fetch;
pub mod symbols;

use checkpoint::{read_checkpoint, write_checkpoint};
use classify::{classify, Classification};
use extract::{extract_weekly, PricePoint};
use fetch::{Fetch, HttpFetcher};

/// What a run accomplished. `pauses` counts the rate-limit sleeps taken,
/// which callers mostly ignore but tests rely on.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub processed: usize,
    pub pauses: usize,
}

/// Per-symbol result collected at the fan-in point of a concurrent batch.
enum SymbolOutcome {
    Extracted {
        symbol: String,
        points: Vec<PricePoint>,
        found: usize,
    },
    MissingSymbol(String),
    LimitReached,
    JsonBroken(String),
    Unusable { symbol: String, error: AppError },
}

/// Drives the collection pipeline: fetch, classify, extract, store.
pub struct Collector {
    config: CollectorConfig,
    fetcher: Arc<dyn Fetch>,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        Self::with_fetcher(config, Arc::new(HttpFetcher::new()))
    }

    pub fn with_fetcher(config: CollectorConfig, fetcher: Arc<dyn Fetch>) -> Self {
        Self { config, fetcher }
    }

    /// Process the currency list one symbol at a time.
    ///
    /// The checkpoint is written before each symbol is touched, so a crash
    /// resumes at the same index and at worst reprocesses one symbol. Every
    /// `n`th processed (non-skipped) symbol the loop pauses to stay inside
    /// the per-minute request quota.
    pub async fn run(&self, n: usize, clear_blacklist: bool) -> Result<RunSummary> {
        let n = n.max(1);
        let records = symbols::read_currency_list(&self.config.currency_list_path)?;
        let mut store = Store::open(&self.config.db_path)?;

        if clear_blacklist {
            info!("Clearing the blacklist table");
            store.clear_blacklist()?;
        }

        let start = read_checkpoint(&self.config.index_path)?;
        if start == 0 {
            info!("No checkpoint found, starting from the beginning");
        } else {
            info!("Resuming from index {start}");
        }

        let mut summary = RunSummary::default();
        for i in start..records.len() {
            write_checkpoint(&self.config.index_path, i)?;

            if i == 0 {
                // First row is the CSV header.
                continue;
            }

            let symbol = &records[i].code;
            if store.is_blacklisted(symbol)? {
                info!("The symbol {symbol} is blacklisted, skipping");
                continue;
            }

            if summary.processed > 0 && summary.processed % n == 0 {
                info!("Sleeping to respect the request rate limit...");
                sleep(self.config.pace).await;
                summary.pauses += 1;
            }

            info!("Processing {symbol}...");
            summary.processed += 1;

            let url = self.config.url_for(symbol);
            let classification = loop {
                let response = self.fetcher.fetch(&url).await?;
                match classify(&response) {
                    Classification::LimitReached if self.config.production => {
                        // One global daily quota; wait it out and retry the
                        // same symbol rather than guessing at a finer policy.
                        info!("Reached the daily limit, continuing in 24 hours");
                        sleep(self.config.limit_backoff).await;
                    }
                    other => break other,
                }
            };

            match classification {
                Classification::MissingSymbol => {
                    warn!("Data for symbol {symbol} was not valid, blacklisting it");
                    store.add_to_blacklist(symbol)?;
                }
                Classification::LimitReached => {
                    info!("Reached the daily limit, finishing");
                    return Ok(summary);
                }
                Classification::JsonBroken => {
                    warn!("Could not decode the response for {symbol}");
                }
                Classification::AllGood(raw) => {
                    match extract_weekly(&raw, WEEKS_PER_SYMBOL, symbol) {
                        Ok((points, found)) => {
                            if found != WEEKS_PER_SYMBOL {
                                warn!(
                                    "For symbol {symbol}, only {found} values were extracted as the series was incomplete"
                                );
                            }
                            store.insert_prices(&points)?;
                        }
                        Err(err) => {
                            warn!("Unable to extract data for {symbol}: {err}");
                        }
                    }
                }
            }
        }

        // Full pass completed; next run starts over.
        write_checkpoint(&self.config.index_path, 0)?;
        Ok(summary)
    }

    /// Process the currency list in concurrent batches of `n`.
    ///
    /// Blacklisted symbols are filtered out up front. Each batch fans out one
    /// task per symbol for the fetch/classify/extract leg and fans every
    /// result back in before anything is persisted, so the store is only ever
    /// written from this single control flow. The checkpoint advances to the
    /// first index of each batch, trading resumption granularity for
    /// parallelism.
    pub async fn run_concurrent(&self, n: usize, clear_blacklist: bool) -> Result<RunSummary> {
        let records = symbols::read_currency_list(&self.config.currency_list_path)?;
        let mut store = Store::open(&self.config.db_path)?;

        if clear_blacklist {
            info!("Clearing the blacklist table");
            store.clear_blacklist()?;
        }

        let start = read_checkpoint(&self.config.index_path)?;

        let mut pending: Vec<(usize, String)> = Vec::new();
        for (i, row) in records.iter().enumerate().skip(start) {
            if i == 0 {
                continue;
            }
            if store.is_blacklisted(&row.code)? {
                info!("The symbol {} is blacklisted, skipping", row.code);
                continue;
            }
            pending.push((i, row.code.clone()));
        }

        let mut summary = RunSummary::default();
        for batch in pending.chunks(n.max(1)) {
            write_checkpoint(&self.config.index_path, batch[0].0)?;

            if summary.processed > 0 {
                info!("Sleeping to respect the request rate limit...");
                sleep(self.config.pace).await;
                summary.pauses += 1;
            }

            // A batch that hits the daily quota is re-run in full after the
            // back-off; the idempotent store absorbs the members that had
            // already landed. Symbols only count as processed once.
            let mut first_attempt = true;
            loop {
                let mut handles = Vec::with_capacity(batch.len());
                for (_, symbol) in batch {
                    let fetcher = Arc::clone(&self.fetcher);
                    let url = self.config.url_for(symbol);
                    let symbol = symbol.clone();
                    handles.push(tokio::spawn(async move {
                        info!("Processing {symbol}...");
                        let response = fetcher.fetch(&url).await?;
                        let outcome = match classify(&response) {
                            Classification::AllGood(raw) => {
                                match extract_weekly(&raw, WEEKS_PER_SYMBOL, &symbol) {
                                    Ok((points, found)) => SymbolOutcome::Extracted {
                                        symbol,
                                        points,
                                        found,
                                    },
                                    Err(error) => SymbolOutcome::Unusable { symbol, error },
                                }
                            }
                            Classification::MissingSymbol => SymbolOutcome::MissingSymbol(symbol),
                            Classification::LimitReached => SymbolOutcome::LimitReached,
                            Classification::JsonBroken => SymbolOutcome::JsonBroken(symbol),
                        };
                        Ok::<SymbolOutcome, AppError>(outcome)
                    }));
                }

                // Fan-in barrier: every task finishes before any write happens.
                let results = futures::future::join_all(handles).await;

                let mut transport_error = None;
                let mut limit_hit = false;
                for result in results {
                    if first_attempt {
                        summary.processed += 1;
                    }
                    match result? {
                        Ok(SymbolOutcome::Extracted {
                            symbol,
                            points,
                            found,
                        }) => {
                            if found != WEEKS_PER_SYMBOL {
                                warn!(
                                    "For symbol {symbol}, only {found} values were extracted as the series was incomplete"
                                );
                            }
                            store.insert_prices(&points)?;
                        }
                        Ok(SymbolOutcome::MissingSymbol(symbol)) => {
                            warn!("Data for symbol {symbol} was not valid, blacklisting it");
                            store.add_to_blacklist(&symbol)?;
                        }
                        Ok(SymbolOutcome::LimitReached) => {
                            limit_hit = true;
                        }
                        Ok(SymbolOutcome::JsonBroken(symbol)) => {
                            warn!("Could not decode the response for {symbol}");
                        }
                        Ok(SymbolOutcome::Unusable { symbol, error }) => {
                            warn!("Unable to extract data for {symbol}: {error}");
                        }
                        Err(err) => {
                            // Keep draining so the batch's good results land first.
                            transport_error = Some(err);
                        }
                    }
                }

                if let Some(err) = transport_error {
                    return Err(err);
                }

                if !limit_hit {
                    break;
                }
                if !self.config.production {
                    info!("Reached the daily limit, finishing");
                    return Ok(summary);
                }
                info!("Reached the daily limit, continuing in 24 hours");
                sleep(self.config.limit_backoff).await;
                first_attempt = false;
            }
        }

        write_checkpoint(&self.config.index_path, 0)?;
        Ok(summary)
    }
}
