use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Wrapper to [`std::fs::read_to_string`] but with additional error context.
pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read '{}'", path.as_ref().display()))
}

pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    fs::write(path.as_ref(), content)
        .with_context(|| format!("failed to write '{}'", path.as_ref().display()))
}

pub fn stringify_path<P: AsRef<Path>>(path: P) -> Result<String> {
    path.as_ref()
        .to_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            anyhow!(
                "failed to stringify path '{}'",
                path.as_ref().to_string_lossy().to_string()
            )
        })
}

pub fn mkdirs<P: AsRef<Path>>(path: P) -> Result<()> {
    fs::create_dir_all(path.as_ref()).with_context(|| {
        format!(
            "unable to create specified directory '{}'",
            path.as_ref().display()
        )
    })
}

pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    if !path.as_ref().is_dir() {
        mkdirs(path)?;
    }
    Ok(())
}

pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    if let Some(p) = path.as_ref().parent() {
        ensure_dir(p)?;
    }
    Ok(())
}

pub fn to_nomalized_abspath<P: AsRef<Path> + Into<PathBuf>>(path: P) -> Result<PathBuf> {
    if path.as_ref().is_absolute() {
        return Ok(path.into());
    }
    let raw = env::current_dir()
        .context("current directory cannot be determined")
        .map(|mut cd| {
            cd.push(path);
            cd
        })?;
    // Remove any `.` and `..` from origin path
    let mut nomalized_path = PathBuf::new();
    for path_component in raw.components() {
        match path_component {
            Component::CurDir => (),
            Component::ParentDir => {
                nomalized_path.pop();
            }
            _ => nomalized_path.push(path_component),
        }
    }

    Ok(nomalized_path)
}

/// Get the parent directory of current executable.
pub fn parent_dir_of_cur_exe() -> Result<PathBuf> {
    let exe_path = env::current_exe().context("unable to locate current executable")?;
    let maybe_dir = exe_path.parent().map(|p| p.to_path_buf());
    maybe_dir.ok_or_else(|| {
        anyhow!(
            "unable to get parent directory of '{}'",
            exe_path.display()
        )
    })
}

/// Get the binary name of current executing binary, lowercased and without extension.
pub fn lowercase_program_name() -> Option<String> {
    let program_executable = env::args().next().map(PathBuf::from)?;
    let program_name = program_executable
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())?;
    Some(program_name)
}

/// An [`fs::copy`] wrapper that also makes sure the parent directory of `to` exists.
pub fn copy<P, Q>(from: P, to: Q) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    ensure_parent_dir(&to)?;
    fs::copy(&from, &to).with_context(|| {
        format!(
            "could not copy file '{}' to '{}'",
            from.as_ref().display(),
            to.as_ref().display()
        )
    })?;
    Ok(())
}

/// Copy file into an existing directory, keeping its file name.
pub fn copy_into<P, Q>(from: P, to: Q) -> Result<PathBuf>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    if !from.as_ref().is_file() {
        bail!(
            "failed to copy '{}': file does not exist",
            from.as_ref().display()
        );
    }
    let dest = to.as_ref().join(from.as_ref().file_name().ok_or_else(|| {
        anyhow!(
            "path '{}' does not have a file name",
            from.as_ref().display()
        )
    })?);

    copy(from, &dest)?;
    Ok(dest)
}

/// Copy every file under `src_root/sub_dir` whose extension equals `ext` into `dest_root`,
/// keeping the path relative to `src_root`.
///
/// Missing `sub_dir` is not an error, nothing gets copied then.
/// Returns the list of copied destination paths.
pub fn copy_by_extension(
    src_root: &Path,
    sub_dir: &str,
    ext: &str,
    dest_root: &Path,
) -> Result<Vec<PathBuf>> {
    let dir = src_root.join(sub_dir);
    if !dir.is_dir() {
        return Ok(vec![]);
    }

    let mut copied = vec![];
    for entry in walk_dir(&dir, true)? {
        if !entry.is_file() || entry.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        let relpath = entry.strip_prefix(src_root)?;
        let dest = dest_root.join(relpath);
        copy(&entry, &dest)?;
        copied.push(dest);
    }
    copied.sort();
    Ok(copied)
}

/// Replace every match of `pattern` in a text file with `rep`, writing it back in place.
///
/// `rep` follows [`Regex::replace_all`] syntax, so `$1` refers to the first capture group.
/// Returns how many matches were replaced.
pub fn replace_in_file<P: AsRef<Path>>(path: P, pattern: &Regex, rep: &str) -> Result<usize> {
    let content = read_to_string(&path)?;
    let count = pattern.find_iter(&content).count();
    if count > 0 {
        write_file(&path, &pattern.replace_all(&content, rep))?;
    }
    Ok(count)
}

/// Attempts to read a directory path, then return a list of paths
/// that are inside the given directory, may or may not including sub folders.
pub fn walk_dir(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    fn collect_paths_(dir: &Path, paths: &mut Vec<PathBuf>, recursive: bool) -> Result<()> {
        for dir_entry in dir.read_dir()?.flatten() {
            paths.push(dir_entry.path());
            if recursive && matches!(dir_entry.file_type(), Ok(ty) if ty.is_dir()) {
                collect_paths_(&dir_entry.path(), paths, true)?;
            }
        }
        Ok(())
    }
    let mut paths = vec![];
    collect_paths_(dir, &mut paths, recursive)
        .with_context(|| format!("failed to read directory '{}'", dir.display()))?;
    Ok(paths)
}
