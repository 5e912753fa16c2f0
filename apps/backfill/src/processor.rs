//! Row Batch Processor — drives prompt building and inference across a table.
//!
//! Flow per row: record → prompt (→ enrichment) → agent → `response` cell.
//!
//! Rows are handled strictly one at a time, in table order. A failed agent
//! call is stored as the row's response and never stops the batch. Index and
//! column checks happen before the table is touched, so a rejected request
//! leaves it exactly as it was.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::{is_error_response, Agent};
use crate::errors::AppError;
use crate::models::Record;
use crate::prompting::{enrich_prompt, PromptRequest, PromptSource};
use crate::retrieval::Retriever;
use crate::table::{read_table, write_table, Table};

pub const RESPONSE_COLUMN: &str = "response";

const PREVIEW_CHARS: usize = 50;

/// When the destination gets written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Once, after every requested row is processed. A crash loses the run.
    #[default]
    AtEnd,
    /// After every processed row, so completed rows survive a crash.
    EachRow,
}

impl WriteMode {
    /// Whether `run` still has to write once processing has finished.
    /// `EachRow` has already written after the last row unless no row ran.
    fn needs_final_write(self, processed: usize) -> bool {
        match self {
            WriteMode::AtEnd => true,
            WriteMode::EachRow => processed == 0,
        }
    }
}

pub struct Enrichment {
    pub retriever: Arc<dyn Retriever>,
    pub top_k: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub processed: usize,
    pub failed: usize,
}

pub struct BatchProcessor {
    agent: Arc<dyn Agent>,
    source: PromptSource,
    system: Option<String>,
    enrichment: Option<Enrichment>,
}

impl BatchProcessor {
    pub fn new(agent: Arc<dyn Agent>, source: PromptSource) -> Self {
        Self {
            agent,
            source,
            system: None,
            enrichment: None,
        }
    }

    /// System instruction for every request. Overrides a template's own.
    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_enrichment(mut self, enrichment: Enrichment) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    /// Prompt for one record, enriched with references when configured.
    pub fn build_request(&self, record: &Record) -> PromptRequest {
        let mut request = self.source.build(record, self.system.as_deref());
        if let Some(enrichment) = &self.enrichment {
            request.prompt = enrich_prompt(
                &request.prompt,
                record,
                enrichment.retriever.as_ref(),
                enrichment.top_k,
            );
        }
        request
    }

    /// Processes every row, or only `target` when given.
    pub async fn process(
        &self,
        table: &mut Table,
        target: Option<usize>,
    ) -> Result<ProcessSummary, AppError> {
        self.process_with(table, target, &mut |_: &Table| Ok(()))
            .await
    }

    /// Like `process`, calling `after_row` with the table after each row.
    pub async fn process_with(
        &self,
        table: &mut Table,
        target: Option<usize>,
        after_row: &mut (dyn FnMut(&Table) -> Result<(), AppError> + Send),
    ) -> Result<ProcessSummary, AppError> {
        let row_count = table.row_count();
        if let Some(index) = target {
            if index >= row_count {
                return Err(AppError::Range { index, row_count });
            }
        }
        if let PromptSource::Raw { column } = &self.source {
            if column.resolve(&table.header).is_none() {
                return Err(AppError::Config(format!(
                    "prompt column {column} not found in header {:?}",
                    table.header
                )));
            }
        }

        // Records see the columns the input had, not the appended response column
        let input_header: Vec<String> = table.header.clone();
        let response_col = table.ensure_column(RESPONSE_COLUMN);

        let indices: Vec<usize> = match target {
            Some(index) => vec![index],
            None => (0..row_count).collect(),
        };

        info!(
            "Processing {} of {} rows ({} mode, agent: {})",
            indices.len(),
            row_count,
            self.source.mode_name(),
            self.agent.name()
        );

        let mut summary = ProcessSummary::default();
        for index in indices {
            let record = Record::from_row(&input_header, &table.rows[index]);
            let request = self.build_request(&record);

            info!(
                "Processing row {}/{}: {}...",
                index + 1,
                row_count,
                self.preview(&record, &request)
            );

            let response = self
                .agent
                .respond(&request.prompt, request.system.as_deref())
                .await;

            if is_error_response(&response) {
                warn!("Row {} failed: {}", index + 1, response);
                summary.failed += 1;
            }

            table.set_cell(index, response_col, response);
            summary.processed += 1;
            after_row(table)?;
        }

        Ok(summary)
    }

    fn preview(&self, record: &Record, request: &PromptRequest) -> String {
        let text = match self.source {
            PromptSource::Raw { .. } => request.prompt.as_str(),
            _ => record.get_or("name", ""),
        };
        text.chars().take(PREVIEW_CHARS).collect()
    }
}

/// Where a file-level run reads from and writes to.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    /// Defaults to overwriting `input`.
    pub output: Option<PathBuf>,
    pub target_row: Option<usize>,
    pub write_mode: WriteMode,
}

impl RunOptions {
    pub fn destination(&self) -> &PathBuf {
        self.output.as_ref().unwrap_or(&self.input)
    }
}

/// Reads the whole input table, processes it, and writes the whole table to
/// the destination. Nothing is written when processing is rejected.
pub async fn run(
    processor: &BatchProcessor,
    options: &RunOptions,
) -> Result<ProcessSummary, AppError> {
    let mut table = read_table(&options.input)?;
    let destination = options.destination().clone();

    let summary = match options.write_mode {
        WriteMode::AtEnd => processor.process(&mut table, options.target_row).await?,
        WriteMode::EachRow => {
            processor
                .process_with(&mut table, options.target_row, &mut |t: &Table| {
                    write_table(&destination, t)
                })
                .await?
        }
    };

    if options.write_mode.needs_final_write(summary.processed) {
        write_table(&destination, &table)?;
    }
    info!(
        "Processing complete: {} rows processed, {} failed. Results saved to {}",
        summary.processed,
        summary.failed,
        destination.display()
    );
    Ok(summary)
}
