// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand handlers. Each returns the process exit status on success so a
// batch with failed images can report them without aborting.

use std::process::ExitCode;

use bandwerk_codec::{
    BatchOptions, BatchSummary, Descrambler, plan_directory, resolve_with, restore_batch,
    segment_plan,
};
use bandwerk_core::keys::photo_id_from_path;
use bandwerk_core::{AppConfig, Result, ScrambleKey};
use tracing::info;

use crate::args::{BatchArgs, PlanArgs, RestoreArgs};

pub fn plan(args: &PlanArgs, config: &AppConfig) -> Result<ExitCode> {
    let album_id = args.album.resolve()?;
    let band_count = resolve_with(&config.scheme, album_id, &args.photo_id);
    println!("{band_count}");
    Ok(ExitCode::SUCCESS)
}

pub fn restore(args: &RestoreArgs, config: &AppConfig) -> Result<ExitCode> {
    let album_id = args.album.resolve()?;
    let photo_id = match &args.photo_id {
        Some(id) => id.clone(),
        None => photo_id_from_path(&args.input)?,
    };
    let key = ScrambleKey::new(album_id, photo_id);
    let plan = segment_plan(&key, &config.scheme);

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Descrambler::open(&args.input)?
        .apply_plan(plan)?
        .save(&args.output, config.jpeg_quality)?;

    if plan.is_scrambled() {
        println!(
            "restored {} ({} bands)",
            args.output.display(),
            plan.band_count()
        );
    } else {
        println!("copied {} (not scrambled)", args.output.display());
    }
    Ok(ExitCode::SUCCESS)
}

pub fn batch(args: &BatchArgs, config: &AppConfig) -> Result<ExitCode> {
    let album_id = args.album.resolve()?;
    let format = args.format.map_or(config.output_format, Into::into);

    let jobs = plan_directory(&args.input_dir, &args.output_dir, album_id, format)?;
    if jobs.is_empty() {
        eprintln!("no numbered images found in {}", args.input_dir.display());
        return Ok(ExitCode::FAILURE);
    }
    info!(album_id, images = jobs.len(), "starting batch");

    let mut options = BatchOptions::from(config);
    if args.threads.is_some() {
        options.threads = args.threads;
    }
    options.overwrite |= args.overwrite;

    let outcomes = restore_batch(jobs, &options)?;
    for outcome in &outcomes {
        if let Err(err) = &outcome.result {
            eprintln!("failed {}: {}", outcome.job.input.display(), err);
        }
    }

    let summary = BatchSummary::from_outcomes(&outcomes);
    println!(
        "restored: {}, not scrambled: {}, skipped: {}, failed: {}",
        summary.restored, summary.passthrough, summary.skipped, summary.failed
    );

    Ok(if summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
