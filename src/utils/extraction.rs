use anyhow::{anyhow, bail, Context, Result};
use common_path::common_path_all;
use flate2::read::GzDecoder;
use log::{debug, info};
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

enum ExtractableKind {
    Gz(tar::Archive<GzDecoder<File>>),
    Zip(ZipArchive<File>),
}

pub struct Extractable<'a> {
    path: &'a Path,
    kind: ExtractableKind,
}

impl<'a> Extractable<'a> {
    pub fn load(path: &'a Path) -> Result<Self> {
        let ext = path
            .extension()
            .ok_or_else(|| {
                anyhow!(
                    "'{}' is not extractable because it appears to have no file extension",
                    path.display()
                )
            })?
            .to_str()
            .ok_or_else(|| {
                anyhow!(
                "'{}' is not extractable because its extension contains invalid unicode characters",
                path.display()
            )
            })?;

        info!("loading '{ext}' archive '{}'", path.display());
        let kind = match ext {
            "zip" => ExtractableKind::Zip(ZipArchive::new(open(path)?)?),
            "gz" | "tgz" => {
                let tar_gz = GzDecoder::new(open(path)?);
                ExtractableKind::Gz(tar::Archive::new(tar_gz))
            }
            _ => bail!("'{ext}' is not a supported extractable file format"),
        };

        Ok(Self { path, kind })
    }

    /// Extract current file into a specific directory.
    ///
    /// When `strip_root` is `true`, the directory that all entries of the archive share
    /// (e.g. `tracy-0.11.1/`) is dropped from the output paths.
    pub fn extract_to(self, root: &Path, strip_root: bool) -> Result<()> {
        super::ensure_dir(root)?;
        let path = self.path;
        let res = match self.kind {
            ExtractableKind::Zip(mut archive) => extract_zip(&mut archive, root, strip_root),
            ExtractableKind::Gz(archive) => {
                // `tar` entries can only be iterated once, so the prefix is computed on
                // a second reader of the same file.
                let prefix_count = if strip_root {
                    let mut probe = tar::Archive::new(GzDecoder::new(open(path)?));
                    count_prefixes_for_tar(&mut probe)?
                } else {
                    0
                };
                extract_tar(archive, root, prefix_count)
            }
        };
        res.with_context(|| format!("failed to extract '{}'", path.display()))
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("unable to open '{}'", path.display()))
}

fn count_prefixes_for_tar<R: std::io::Read>(archive: &mut tar::Archive<R>) -> Result<usize> {
    let mut all_files = vec![];
    for entry in archive.entries()? {
        let entry = entry?;
        if entry.header().entry_type().is_file() {
            all_files.push(entry.path()?.to_path_buf());
        }
    }
    Ok(common_prefix_len(&all_files))
}

fn common_prefix_len(files: &[PathBuf]) -> usize {
    let common_prefix = common_path_all(files.iter().map(|p| p.as_path()));
    let count = common_prefix
        .map(|p| p.components().count())
        .unwrap_or_default();
    // Never strip the file name itself when there is a single file.
    if files.len() < 2 {
        count.min(files.first().map_or(0, |f| f.components().count() - 1))
    } else {
        count
    }
}

fn extract_tar<R: std::io::Read>(
    mut archive: tar::Archive<R>,
    root: &Path,
    prefix_count: usize,
) -> Result<()> {
    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.to_path_buf();
        let skipped = entry_path
            .components()
            .skip(prefix_count)
            .collect::<PathBuf>();
        if skipped == PathBuf::new() {
            continue;
        }
        let out_path = root.join(&skipped);
        debug!("extracting '{}'", skipped.display());

        if entry.header().entry_type().is_dir() {
            super::ensure_dir(&out_path)?;
        } else {
            super::ensure_parent_dir(&out_path)?;
            entry.unpack(&out_path)?;
        }
    }
    Ok(())
}

fn extract_zip(archive: &mut ZipArchive<File>, root: &Path, strip_root: bool) -> Result<()> {
    let prefix_count = if strip_root {
        let files = archive
            .file_names()
            .filter(|p| !p.ends_with('/'))
            .map(PathBuf::from)
            .collect::<Vec<_>>();
        common_prefix_len(&files)
    } else {
        0
    };

    for i in 0..archive.len() {
        let mut zip_file = archive.by_index(i)?;
        let out_path = match zip_file.enclosed_name() {
            Some(path) => {
                let skipped = path.components().skip(prefix_count).collect::<PathBuf>();
                if skipped == PathBuf::new() {
                    continue;
                }
                root.join(skipped)
            }
            None => continue,
        };

        if zip_file.is_dir() {
            super::ensure_dir(&out_path)?;
        } else {
            super::ensure_parent_dir(&out_path)?;
            let mut out_file = File::create(&out_path)?;
            std::io::copy(&mut zip_file, &mut out_file)?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = zip_file.unix_mode() {
                std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}
