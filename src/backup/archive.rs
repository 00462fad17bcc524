// pgbackup/src/backup/archive.rs
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::errors::{AppError, Result};

const CHUNK_SIZE: usize = 64 * 1024;

/// `path` with `.gz` appended.
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".gz");
    PathBuf::from(name)
}

/// `path` with exactly one trailing `.gz` removed.
pub fn decompressed_path(path: &Path) -> Result<PathBuf> {
    match path.extension() {
        Some(ext) if ext == "gz" && path.file_stem().is_some_and(|s| !s.is_empty()) => {
            Ok(path.with_extension(""))
        }
        _ => Err(AppError::NotCompressed {
            path: path.to_path_buf(),
        }),
    }
}

/// Gzips `src_file` into a `.gz` sibling and returns the sibling's path.
///
/// The source is left in place. A write failure leaves the partially
/// written destination on disk.
pub fn compress_file(src_file: &Path) -> Result<PathBuf> {
    let dest_file = compressed_path(src_file);
    let input = open_artifact(src_file)?;
    let output = create_output(&dest_file)?;

    let mut encoder = GzEncoder::new(output, Compression::default());
    copy_chunks(input, &mut encoder, src_file, &dest_file)?;
    encoder
        .finish()
        .and_then(|mut file| file.flush())
        .map_err(|source| AppError::IoWrite {
            path: dest_file.clone(),
            source,
        })?;

    Ok(dest_file)
}

/// Inflates a `.gz` artifact next to itself and returns the inflated path.
///
/// Every gzip member is decoded, so concatenated archives inflate in full.
pub fn extract_file(src_file: &Path) -> Result<PathBuf> {
    let dest_file = decompressed_path(src_file)?;
    let input = open_artifact(src_file)?;
    let mut output = create_output(&dest_file)?;

    copy_chunks(MultiGzDecoder::new(input), &mut output, src_file, &dest_file)?;
    output.flush().map_err(|source| AppError::IoWrite {
        path: dest_file.clone(),
        source,
    })?;

    Ok(dest_file)
}

fn open_artifact(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => AppError::ArtifactNotFound {
            path: path.to_path_buf(),
        },
        _ => AppError::IoRead {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn create_output(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| AppError::IoWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_chunks<R: Read, W: Write>(
    mut reader: R,
    writer: &mut W,
    src: &Path,
    dest: &Path,
) -> Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(AppError::IoRead {
                    path: src.to_path_buf(),
                    source,
                });
            }
        };
        writer
            .write_all(&buf[..read])
            .map_err(|source| AppError::IoWrite {
                path: dest.to_path_buf(),
                source,
            })?;
        total += read as u64;
    }
}
