use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use collector_cli::config::JobConfig;
use collector_model::{Period, TimeWindow};
use collector_transform::{JsonLinesWriter, PluginChain, PushSummary, bucket, query_for_range};
use tracing::{info, info_span};

use crate::cli::{PluginsArgs, RunArgs, WindowsArgs};

/// What `run` did, for the summary table.
pub struct RunResult {
    pub data_group: Option<String>,
    pub data_type: Option<String>,
    pub period: Period,
    pub windows: Vec<TimeWindow>,
    pub records: usize,
    pub push: PushSummary,
    pub chunk_size: usize,
    pub output: Option<PathBuf>,
}

pub fn run_job(args: &RunArgs) -> Result<RunResult> {
    let job = JobConfig::load(&args.job)?;
    let span = info_span!(
        "job",
        data_type = job.data_type().unwrap_or_default(),
        frequency = %job.frequency()
    );
    let _guard = span.enter();

    let parser = job.parser().context("invalid job options")?;
    let mut batch = job.load_records(&args.records)?;

    let mut windows = Vec::new();
    if args.start.is_some() || args.end.is_some() {
        windows = bucket(job.frequency().as_str(), args.start, args.end)
            .context("bucket collection range")?;
        let source = batch.into_source();
        batch = match query_for_range(&source, &windows) {
            Ok(selected) => selected.into_iter().collect(),
            Err(never) => match never {},
        };
    }
    info!(records = batch.len(), "loaded records");

    let documents = parser
        .get_data(&batch.records, &batch.special_fields)
        .context("assemble documents")?;

    let pusher = job.pusher();
    let push = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output file {}", path.display()))?;
            let mut writer = JsonLinesWriter::new(BufWriter::new(file));
            let summary = pusher.push(&mut writer, &documents)?;
            writer.into_inner().flush()?;
            summary
        }
        None => {
            let stdout = io::stdout();
            let mut writer = JsonLinesWriter::new(stdout.lock());
            pusher.push(&mut writer, &documents)?
        }
    };

    Ok(RunResult {
        data_group: job.data_set.data_group.clone(),
        data_type: job.data_type().map(str::to_string),
        period: job.frequency().period(),
        windows,
        records: batch.len(),
        push,
        chunk_size: pusher.chunk_size(),
        output: args.output.clone(),
    })
}

pub fn run_windows(args: &WindowsArgs) -> Result<Vec<TimeWindow>> {
    bucket(&args.frequency, args.start, args.end).context("bucket collection range")
}

pub fn run_plugins(args: &PluginsArgs) -> Result<PluginChain> {
    PluginChain::parse(args.specs.as_slice()).context("invalid plugin chain")
}
