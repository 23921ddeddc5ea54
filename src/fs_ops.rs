use std::{
    fs,
    io::{self, Write},
    path::Path,
    time::Duration,
};

pub fn retry<T, F>(mut op: F, attempts: usize) -> io::Result<T>
where
    F: FnMut() -> io::Result<T>,
{
    let mut delay = Duration::from_millis(200);
    let mut i = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                i += 1;
                if i >= attempts {
                    return Err(err);
                }
                tracing::debug!("attempt {i}/{attempts} failed: {err}, retrying");
            }
        }
        std::thread::sleep(delay);
        delay = std::cmp::min(delay * 2, Duration::from_secs(2));
    }
}

/// Replace `dest` with `bytes`. The new content is fully written to a temp file
/// beside `dest` first; the temp file is removed on every failure path.
fn write_bytes_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".iq-setup-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|err| err.error)?;
    Ok(())
}

pub fn write_bytes_with_retry(dest: &Path, bytes: &[u8], attempts: usize) -> io::Result<()> {
    retry(|| write_bytes_atomic(dest, bytes), attempts)
}

pub fn dir_has_entries(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_some())
}

/// Copy every file under `src` into `dest`, recreating the directory tree.
/// Returns the number of files copied.
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<usize> {
    fs::create_dir_all(dest).map_err(|err| annotate(err, "create", dest))?;
    let mut copied = 0;
    for entry in fs::read_dir(src).map_err(|err| annotate(err, "read_dir", src))? {
        let entry = entry?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        if path.is_dir() {
            copied += copy_dir_recursive(&path, &target)?;
        } else {
            fs::copy(&path, &target).map_err(|err| {
                let action = format!("copy {} ->", path.display());
                annotate(err, &action, &target)
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

pub fn remove_dir_recursive(dir: &Path) -> io::Result<()> {
    fs::remove_dir_all(dir).map_err(|err| annotate(err, "remove", dir))
}

/// Path context for an I/O error. Stays an `io::Error` with the original
/// `ErrorKind`: `InstallError::CopyFailed` carries it as its `#[source]`.
fn annotate(err: io::Error, action: &str, path: &Path) -> io::Error {
    io::Error::new(err.kind(), format!("{action} {}: {err}", path.display()))
}
