//! # Archive Assembler Module
//!
//! Turns the succeeded subset of a result set into one deliverable.
//!
//! ## Packaging rules:
//! - Zero succeeded results: `BatchError::EmptyResultSet`, no side effects
//! - Exactly one succeeded result: direct passthrough - the file's own
//!   bytes and output name, no one-entry archive
//! - Two or more: a ZIP whose suggested name encodes the run parameters,
//!   so repeated downloads with different settings stay distinguishable
//!
//! ## Output naming:
//! The last dot-delimited extension of the source name is stripped and the
//! target extension appended (`photo.jpeg` + webp -> `photo.webp`). When
//! two inputs map to the same output name, later entries get a numeric
//! suffix so no result loses its entry to a silent overwrite.

use crate::config::{BatchConfig, TransformMode};
use crate::engine::TargetFormat;
use crate::error::BatchError;
use crate::job::{JobStatus, TransformationResult};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A packaged deliverable: raw bytes plus a suggested file name
#[derive(Debug, Clone)]
pub struct ArchiveOutput {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// Assembles the succeeded subset of a run into one downloadable blob
pub struct ArchiveAssembler;

impl ArchiveAssembler {
    /// Derive an output name: strip the last extension, append the target's
    pub fn output_file_name(source_name: &str, format: TargetFormat) -> String {
        let base = match source_name.rsplit_once('.') {
            Some((base, _)) if !base.is_empty() => base,
            _ => source_name,
        };
        format!("{}.{}", base, format.extension())
    }

    /// Package every succeeded result into one deliverable
    pub fn package(
        results: &[TransformationResult],
        config: &BatchConfig,
    ) -> Result<ArchiveOutput, BatchError> {
        let succeeded: Vec<&TransformationResult> = results
            .iter()
            .filter(|r| r.status == JobStatus::Succeeded)
            .collect();

        if succeeded.is_empty() {
            return Err(BatchError::EmptyResultSet);
        }

        if let [only] = succeeded.as_slice() {
            // Single item: hand the file over directly instead of a
            // one-entry archive
            debug!("Single succeeded item, skipping archive wrapper");
            return Ok(ArchiveOutput {
                bytes: only.output_bytes.clone(),
                file_name: Self::output_file_name(&only.source_name, only.output_format),
            });
        }

        let mut cursor = Cursor::new(Vec::new());
        let mut used_names: HashMap<String, usize> = HashMap::new();
        {
            let mut writer = ZipWriter::new(&mut cursor);
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

            for result in &succeeded {
                let name = Self::output_file_name(&result.source_name, result.output_format);
                let entry_name = Self::disambiguate(&mut used_names, name);
                writer.start_file(entry_name, options)?;
                writer.write_all(&result.output_bytes)?;
            }

            writer.finish()?;
        }

        Ok(ArchiveOutput {
            bytes: cursor.into_inner(),
            file_name: Self::archive_name(config),
        })
    }

    /// Suggested archive name carrying the run parameters
    fn archive_name(config: &BatchConfig) -> String {
        let ext = config.target_format.extension();
        match config.mode {
            TransformMode::Convert => format!("converted-images-{}.zip", ext),
            TransformMode::Compress { quality } => {
                format!("compressed-images-{}-q{}.zip", ext, quality)
            }
            TransformMode::Resize { scale } => {
                format!("resized-images-{}-{}pct.zip", ext, scale)
            }
        }
    }

    /// Keep colliding entry names distinct: `photo.jpg`, `photo (1).jpg`, ...
    fn disambiguate(used: &mut HashMap<String, usize>, name: String) -> String {
        let count = used.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            return name;
        }

        let suffix = *count - 1;
        match name.rsplit_once('.') {
            Some((base, ext)) => format!("{} ({}).{}", base, suffix, ext),
            None => format!("{} ({})", name, suffix),
        }
    }
}
