// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::CliContext;
use crate::analysis::{AnalysisError, AnalysisService, Analyzer};
use crate::models::{HealthStatus, ScanRecord};
use crate::storage::ScanStore;
use crate::utils::{format_date_time, relative_time_span};
use crate::vision::{capture_file_path, load_image, save_jpeg};

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image file to analyze
    pub image: PathBuf,

    /// Save a JPEG copy into the captures directory and record that path
    #[arg(long)]
    pub import: bool,

    /// How many class probabilities to print
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only the N most recent scans
    #[arg(long)]
    pub limit: Option<usize>,
}

pub async fn analyze(ctx: &CliContext, args: AnalyzeArgs) -> Result<()> {
    let config = &ctx.config;
    let store = ctx.scan_store().await?;
    let analyzer = Arc::new(Analyzer::from_config(config, store));

    let source = args.image.clone();
    let max_width = config.image.max_load_width;
    let (image, image_info) = tokio::task::spawn_blocking(move || load_image(&source, max_width))
        .await?
        .map_err(|e| analysis_failure(e.into()))?;
    info!(
        "Loaded {} ({}x{}, {:?})",
        args.image.display(),
        image_info.width,
        image_info.height,
        image_info.format
    );

    let image_path = if args.import {
        let target = capture_file_path(&config.storage.captures_path(), chrono::Local::now());
        let quality = config.image.jpeg_quality;
        let copy = image.clone();
        let dest = target.clone();
        tokio::task::spawn_blocking(move || save_jpeg(&copy, &dest, quality))
            .await?
            .map_err(|e| analysis_failure(e.into()))?;
        println!("📥 Imported image to {}", target.display());
        target
    } else {
        args.image.clone()
    };

    println!("🔍 Analyzing {}...", image_path.display());
    let service = AnalysisService::new(analyzer);
    let completion = service.submit(image_path.display().to_string(), image);
    let result = completion
        .await
        .map_err(|_| anyhow!("Analysis task ended without a result"))?;

    let report = result.map_err(analysis_failure)?;

    print_record(&report.record);
    if report.outcome.calibrated {
        println!("   (healthy reading preferred over a close concern score)");
    }
    if args.top > 0 {
        println!("\n📊 Top predictions:");
        for line in report.outcome.format_top_k(args.top).lines() {
            println!("  {}", line);
        }
    }
    Ok(())
}

pub async fn history(ctx: &CliContext, args: HistoryArgs) -> Result<()> {
    let store = ctx.scan_store().await?;
    let records = match args.limit {
        Some(limit) => store.get_recent(limit).await?,
        None => store.get_all().await?,
    };

    if records.is_empty() {
        println!("No scans yet");
        return Ok(());
    }

    for record in &records {
        println!("{}", history_line(record));
    }
    Ok(())
}

pub async fn show(ctx: &CliContext, id: &str) -> Result<()> {
    let store = ctx.scan_store().await?;
    let record = store
        .get_by_id(id)
        .await?
        .ok_or_else(|| anyhow!("No scan with id {}", id))?;
    print_record(&record);
    Ok(())
}

pub async fn notes(ctx: &CliContext, id: &str, text: String) -> Result<()> {
    let store = ctx.scan_store().await?;
    let notes = if text.trim().is_empty() { None } else { Some(text) };
    let record = store.update_notes(id, notes).await?;
    println!("✅ Notes updated for scan {}", record.id);
    Ok(())
}

pub async fn delete(ctx: &CliContext, id: &str) -> Result<()> {
    let store = ctx.scan_store().await?;
    let record = store
        .get_by_id(id)
        .await?
        .ok_or_else(|| anyhow!("No scan with id {}", id))?;
    store.delete(&record).await?;
    println!("🗑️ Deleted scan {}", id);
    Ok(())
}

pub async fn clear(ctx: &CliContext) -> Result<()> {
    let store = ctx.scan_store().await?;
    let count = store.count().await?;
    store.delete_all().await?;
    println!("🧹 Deleted {} scans", count);
    Ok(())
}

pub async fn stats(ctx: &CliContext) -> Result<()> {
    let store = ctx.scan_store().await?;
    let records = store.get_all().await?;
    println!("Total scans: {}", records.len());
    for (status, count) in status_breakdown(&records) {
        println!("  {:<18} {}", status.display_name(), count);
    }
    Ok(())
}

/// `Analysis failed: <reason> [<CODE>]` on top, the underlying error in the chain
pub fn analysis_failure(err: AnalysisError) -> anyhow::Error {
    let message = format!("{} [{}]", err.user_message(), err.error_code());
    anyhow::Error::new(err).context(message)
}

/// Count of records per status, every status listed
pub fn status_breakdown(records: &[ScanRecord]) -> BTreeMap<HealthStatus, usize> {
    let mut counts: BTreeMap<HealthStatus, usize> =
        HealthStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for record in records {
        *counts.entry(record.overall_health).or_default() += 1;
    }
    counts
}

pub fn history_line(record: &ScanRecord) -> String {
    let (name, probability) = record
        .primary_detection()
        .map(|d| (d.condition.name.as_str(), d.probability))
        .unwrap_or(("No detection", record.confidence_score));
    format!(
        "{}  {:<20} {:<18} {:>5.1}%  {}",
        record.id,
        name,
        record.overall_health.display_name(),
        probability * 100.0,
        relative_time_span(record.timestamp)
    )
}

fn print_record(record: &ScanRecord) {
    println!("\n📋 Scan {}", record.id);
    println!("  Taken:      {}", format_date_time(record.timestamp));
    println!("  Image:      {}", record.image_path);
    println!("  Status:     {}", record.overall_health.display_name());
    println!("  Confidence: {:.1}%", record.confidence_score * 100.0);

    for detection in &record.detected_conditions {
        let condition = &detection.condition;
        println!("\n  {} ({:.1}%)", condition.name, detection.probability * 100.0);
        println!("  {}", condition.description);
        if !detection.affected_areas.is_empty() {
            println!("  Areas: {}", detection.affected_areas.join(", "));
        }
        println!("  Symptoms:");
        for symptom in &condition.symptoms {
            println!("    • {}", symptom);
        }
        println!("  Recommendations:");
        for recommendation in &condition.recommendations {
            println!("    • {}", recommendation);
        }
    }

    if let Some(notes) = &record.notes {
        println!("\n  Notes: {}", notes);
    }
}
