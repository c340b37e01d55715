// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Parallel batch restore.
//
// Every image is an independent job on a rayon pool. A failing image records
// its error in its own outcome and never stops its siblings. Outcomes come
// back in job order. Each output path has exactly one writer: later jobs
// aiming at a path already claimed fail with `DuplicateOutput`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bandwerk_core::config::{AppConfig, OutputFormat};
use bandwerk_core::error::{BandwerkError, Result};
use bandwerk_core::keys::photo_id_from_path;
use bandwerk_core::scheme::ScrambleScheme;
use bandwerk_core::types::ScrambleKey;
use image::ImageFormat;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::raster::processor::Descrambler;
use crate::segment::segment_plan;

/// One image to restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub key: ScrambleKey,
}

/// Settings shared by every job in a batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Worker threads. `None` uses rayon's default (one per core).
    pub threads: Option<usize>,
    /// Overwrite outputs that already exist instead of skipping them.
    pub overwrite: bool,
    pub jpeg_quality: u8,
    pub scheme: ScrambleScheme,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for BatchOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            threads: config.threads,
            overwrite: config.overwrite,
            jpeg_quality: config.jpeg_quality,
            scheme: config.scheme.clone(),
        }
    }
}

/// What happened to a job that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Written to the output path. `band_count == 0` means copied as-is.
    Restored { band_count: u32 },
    /// Output already existed and `overwrite` was off.
    Skipped,
}

/// Result of a single job.
#[derive(Debug)]
pub struct BatchOutcome {
    pub job: BatchJob,
    pub result: Result<BatchStatus>,
}

/// Counts over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub restored: usize,
    pub passthrough: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, outcome| {
                match outcome.result {
                    Ok(BatchStatus::Restored { band_count: 0 }) => summary.passthrough += 1,
                    Ok(BatchStatus::Restored { .. }) => summary.restored += 1,
                    Ok(BatchStatus::Skipped) => summary.skipped += 1,
                    Err(_) => summary.failed += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.restored + self.passthrough + self.skipped + self.failed
    }
}

/// Restore every job, in parallel, isolating per-image failures.
///
/// Only fails as a whole when the worker pool cannot be built.
#[instrument(skip_all, fields(jobs = jobs.len(), threads = ?options.threads))]
pub fn restore_batch(jobs: Vec<BatchJob>, options: &BatchOptions) -> Result<Vec<BatchOutcome>> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = options.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|err| BandwerkError::WorkerPool(err.to_string()))?;

    let mut claimed = HashSet::with_capacity(jobs.len());
    let owns_output: Vec<bool> = jobs
        .iter()
        .map(|job| claimed.insert(job.output.clone()))
        .collect();

    let outcomes: Vec<BatchOutcome> = pool.install(|| {
        jobs.into_par_iter()
            .zip(owns_output)
            .map(|(job, owns_output)| {
                let result = if owns_output {
                    restore_one(&job, options)
                } else {
                    Err(BandwerkError::DuplicateOutput(job.output.clone()))
                };
                if let Err(err) = &result {
                    warn!(input = %job.input.display(), error = %err, "image restore failed");
                }
                BatchOutcome { job, result }
            })
            .collect()
    });

    let summary = BatchSummary::from_outcomes(&outcomes);
    info!(
        restored = summary.restored,
        passthrough = summary.passthrough,
        skipped = summary.skipped,
        failed = summary.failed,
        "batch finished"
    );
    Ok(outcomes)
}

fn restore_one(job: &BatchJob, options: &BatchOptions) -> Result<BatchStatus> {
    if !options.overwrite && job.output.exists() {
        debug!(output = %job.output.display(), "output exists, skipping");
        return Ok(BatchStatus::Skipped);
    }

    let plan = segment_plan(&job.key, &options.scheme);
    if let Some(parent) = job.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Descrambler::open(&job.input)?
        .apply_plan(plan)?
        .save(&job.output, options.jpeg_quality)?;

    debug!(key = %job.key, band_count = plan.band_count(), "image restored");
    Ok(BatchStatus::Restored {
        band_count: plan.band_count(),
    })
}

/// Build one job per image in `input_dir` whose file stem is a numeric photo
/// id. Other entries are ignored. Jobs are sorted by input file name.
///
/// Output files keep their stem; the extension follows `format`, or the input
/// extension for [`OutputFormat::Keep`]. When two inputs share a stem and
/// would land on the same output, the first in name order wins.
pub fn plan_directory(
    input_dir: &Path,
    output_dir: &Path,
    album_id: u64,
    format: OutputFormat,
) -> Result<Vec<BatchJob>> {
    let mut inputs: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && ImageFormat::from_path(path).is_ok())
        .collect();
    inputs.sort();

    let mut jobs: Vec<BatchJob> = Vec::with_capacity(inputs.len());
    let mut outputs = HashSet::with_capacity(inputs.len());
    for input in inputs {
        let photo_id = match photo_id_from_path(&input) {
            Ok(id) => id,
            Err(err) => {
                debug!(input = %input.display(), error = %err, "not a photo, ignoring");
                continue;
            }
        };
        let Some(file_name) = input.file_name() else {
            continue;
        };
        let mut output = output_dir.join(file_name);
        if let Some(ext) = format.extension() {
            output.set_extension(ext);
        }
        if !outputs.insert(output.clone()) {
            debug!(
                input = %input.display(),
                output = %output.display(),
                "output already planned for another input, ignoring"
            );
            continue;
        }
        jobs.push(BatchJob {
            input,
            output,
            key: ScrambleKey::new(album_id, photo_id),
        });
    }
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::convert::{from_raster, to_raster};
    use crate::reassemble::scramble;
    use image::{DynamicImage, Rgb, RgbImage};

    const ALBUM: u64 = 1_223_474;

    fn striped(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([y as u8, x as u8, 200]))
    }

    /// Write `original` scrambled with the band count its key resolves to.
    fn write_scrambled(path: &Path, original: &RgbImage, photo_id: &str) {
        let bands = crate::resolve(ALBUM, photo_id);
        let raster = to_raster(DynamicImage::ImageRgb8(original.clone())).unwrap();
        let scrambled = from_raster(scramble(&raster, bands).unwrap()).unwrap();
        scrambled.save(path).unwrap();
    }

    #[test]
    fn plan_directory_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir(&input).unwrap();
        for name in ["00002.png", "00001.png", "cover.png", "notes.txt"] {
            std::fs::write(input.join(name), b"x").unwrap();
        }

        let jobs = plan_directory(&input, &dir.path().join("out"), ALBUM, OutputFormat::Webp)
            .unwrap();
        let ids: Vec<&str> = jobs.iter().map(|j| j.key.photo_id.as_str()).collect();
        assert_eq!(ids, vec!["00001", "00002"]);
        assert_eq!(jobs[0].output, dir.path().join("out/00001.webp"));
        assert_eq!(jobs[0].key.album_id, ALBUM);
    }

    #[test]
    fn plan_directory_keeps_one_input_per_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir(&input).unwrap();
        for name in ["00001.png", "00001.bmp", "00002.png"] {
            std::fs::write(input.join(name), b"x").unwrap();
        }
        let out = dir.path().join("out");

        let jobs = plan_directory(&input, &out, ALBUM, OutputFormat::Png).unwrap();
        let inputs: Vec<PathBuf> = jobs.iter().map(|j| j.input.clone()).collect();
        assert_eq!(inputs, vec![input.join("00001.bmp"), input.join("00002.png")]);
        assert_eq!(jobs[0].output, out.join("00001.png"));

        // Keeping extensions, the two stems no longer collide.
        let jobs = plan_directory(&input, &out, ALBUM, OutputFormat::Keep).unwrap();
        assert_eq!(jobs.len(), 3);
    }

    #[test]
    fn shared_output_has_a_single_writer() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("00001.bmp");
        let second = dir.path().join("00001.png");
        let output = dir.path().join("out/00001.png");
        let original = striped(4, 32);
        write_scrambled(&first, &original, "00001");
        write_scrambled(&second, &striped(4, 20), "00001");

        let jobs = vec![
            BatchJob {
                input: first,
                output: output.clone(),
                key: ScrambleKey::new(ALBUM, "00001"),
            },
            BatchJob {
                input: second,
                output: output.clone(),
                key: ScrambleKey::new(ALBUM, "00001"),
            },
        ];
        let options = BatchOptions {
            overwrite: true,
            ..BatchOptions::default()
        };
        let outcomes = restore_batch(jobs, &options).unwrap();

        assert!(matches!(outcomes[0].result, Ok(BatchStatus::Restored { .. })));
        match &outcomes[1].result {
            Err(BandwerkError::DuplicateOutput(path)) => assert_eq!(path, &output),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(image::open(&output).unwrap().to_rgb8(), original);

        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.restored, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn batch_restores_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir(&input).unwrap();

        let originals: Vec<(String, RgbImage)> = (1..=3)
            .map(|i| (format!("{i:05}"), striped(5, 40 + i)))
            .collect();
        for (id, img) in &originals {
            write_scrambled(&input.join(format!("{id}.png")), img, id);
        }
        // Corrupt file with a valid name: must fail alone.
        std::fs::write(input.join("00009.png"), b"broken").unwrap();

        let jobs = plan_directory(&input, &output, ALBUM, OutputFormat::Keep).unwrap();
        let options = BatchOptions {
            threads: Some(2),
            ..BatchOptions::default()
        };
        let outcomes = restore_batch(jobs, &options).unwrap();

        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[3].job.key.photo_id, "00009");
        assert!(matches!(outcomes[3].result, Err(BandwerkError::Decode(_))));

        for (id, original) in &originals {
            let back = image::open(output.join(format!("{id}.png"))).unwrap().to_rgb8();
            assert_eq!(&back, original, "photo {id}");
        }

        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.restored, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn existing_outputs_are_skipped_unless_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("00001.png");
        let output = dir.path().join("out/00001.png");
        write_scrambled(&input, &striped(3, 30), "00001");
        std::fs::create_dir_all(output.parent().unwrap()).unwrap();
        std::fs::write(&output, b"previous run").unwrap();

        let job = BatchJob {
            input,
            output: output.clone(),
            key: ScrambleKey::new(ALBUM, "00001"),
        };

        let outcomes = restore_batch(vec![job.clone()], &BatchOptions::default()).unwrap();
        assert!(matches!(outcomes[0].result, Ok(BatchStatus::Skipped)));
        assert_eq!(std::fs::read(&output).unwrap(), b"previous run");

        let options = BatchOptions {
            overwrite: true,
            ..BatchOptions::default()
        };
        let outcomes = restore_batch(vec![job], &options).unwrap();
        assert!(matches!(
            outcomes[0].result,
            Ok(BatchStatus::Restored { band_count: 6 })
        ));
        assert_eq!(image::open(&output).unwrap().to_rgb8(), striped(3, 30));
    }

    #[test]
    fn unscrambled_album_counts_as_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("00001.png");
        striped(3, 9).save(&input).unwrap();

        let job = BatchJob {
            input,
            output: dir.path().join("out/00001.png"),
            key: ScrambleKey::new(10, "00001"),
        };
        let outcomes = restore_batch(vec![job], &BatchOptions::default()).unwrap();
        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.passthrough, 1);
        assert_eq!(summary.restored, 0);
    }
}
