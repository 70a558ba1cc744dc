//! `generate` command handler.

use crate::config::{parse_duration, GenerateArgs};
use anyhow::Context;
use datagen_generator::{resolve_seed, BatchScheduler, BoundModel, CancellationFlag};
use datagen_sink::{create_sink, SinkMetrics};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a `generate` run.
#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    /// Seed the run used
    pub seed: u64,
    /// Batches fully or partially written
    pub batches_written: u64,
    /// Generation stopped early on Ctrl-C or timeout
    pub cancelled: bool,
    pub metrics: SinkMetrics,
}

/// Run the generate command.
///
/// Generation runs on a blocking task. Ctrl-C and `--timeout` trip the
/// cancellation flag; the rows produced so far are still written.
pub async fn run_generate(args: GenerateArgs) -> anyhow::Result<GenerateSummary> {
    let cancellation = CancellationFlag::new();

    let flag = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt signal (Ctrl+C), stopping");
            flag.cancel();
        }
    });

    if let Some(timeout) = &args.timeout {
        let timeout = parse_duration(timeout).context("Invalid --timeout")?;
        let flag = cancellation.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            warn!("Timeout of {timeout:?} reached, stopping");
            flag.cancel();
        });
    }

    tokio::task::spawn_blocking(move || generate(&args, &cancellation))
        .await
        .context("Generation task failed")?
}

/// Generate all batches and write them to the configured sink.
pub fn generate(
    args: &GenerateArgs,
    cancellation: &CancellationFlag,
) -> anyhow::Result<GenerateSummary> {
    let model = BoundModel::from_file(&args.model)
        .with_context(|| format!("Failed to load model from {:?}", args.model))?;
    let seed = resolve_seed(args.seed, &model);
    let columns: Vec<String> = model
        .output_field_names()
        .into_iter()
        .map(String::from)
        .collect();

    info!(
        "Model '{}': {} batch(es) of {} row(s), {} thread(s), seed {seed}",
        model.name(),
        args.batches,
        args.rows,
        args.threads
    );

    if args.dry_run {
        info!("[DRY-RUN] Model is valid, no rows generated");
        return Ok(GenerateSummary {
            seed,
            ..Default::default()
        });
    }

    let scheduler =
        BatchScheduler::new(Arc::new(model), seed).with_cancellation(cancellation.clone());
    let mut sink = create_sink(args.format, args.output.as_deref(), columns)?;

    let mut summary = GenerateSummary {
        seed,
        ..Default::default()
    };
    for batch in 0..args.batches {
        let start_index = batch.saturating_mul(args.rows);
        let result = scheduler.generate_from(start_index, args.rows, args.threads)?;
        sink.write_rows(&result.rows)
            .context("Failed to write rows")?;
        summary.batches_written += 1;
        info!(
            "Batch {}/{} written ({} rows)",
            batch + 1,
            args.batches,
            result.rows.len()
        );
        if result.cancelled {
            summary.cancelled = true;
            break;
        }
    }

    summary.metrics = sink.finish().context("Failed to finish output")?;
    if summary.cancelled {
        warn!(
            "Generation cancelled: {} row(s) written",
            summary.metrics.rows_written
        );
    }
    Ok(summary)
}
