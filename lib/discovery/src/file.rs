use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::TargetGroup;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("create directory {path:?} failed, {err}")]
    CreateDir { path: PathBuf, err: io::Error },
    #[error("write {path:?} failed, {err}")]
    Write { path: PathBuf, err: io::Error },
    #[error("read {path:?} failed, {err}")]
    Read { path: PathBuf, err: io::Error },
    #[error("encode target groups failed, {0}")]
    Encode(serde_yaml::Error),
    #[error("decode {path:?} failed, {err}")]
    Decode {
        path: PathBuf,
        err: serde_yaml::Error,
    },
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace the content of `path` with `groups`.
///
/// Groups are written to a tmp file next to `path` and flushed fully to disk
/// first, then the tmp file is renamed to `path`. Rename is atomic on POSIX
/// systems, so a file watcher never sees a partially written file, and the
/// previous file is left untouched if anything fails.
pub fn write(path: &Path, groups: &[TargetGroup]) -> Result<(), Error> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|err| Error::CreateDir {
            path: dir.to_path_buf(),
            err,
        })?;
    }

    let content = serde_yaml::to_string(groups).map_err(Error::Encode)?;

    let tmp = tmp_path(path);
    let result = fs::File::create(&tmp).and_then(|file| {
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.into_inner().map_err(|err| err.into_error())?.sync_all()
    });
    if let Err(err) = result {
        let _ = fs::remove_file(&tmp);
        return Err(Error::Write { path: tmp, err });
    }

    fs::rename(&tmp, path).map_err(|err| Error::Write {
        path: path.to_path_buf(),
        err,
    })?;

    debug!(message = "target groups written", ?path, groups = groups.len());

    Ok(())
}

/// Read target groups from `path`, the source of each group is set to
/// `<path>:<index>`.
pub fn read(path: &Path) -> Result<Vec<TargetGroup>, Error> {
    let content = fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.to_path_buf(),
        err,
    })?;

    let mut groups: Vec<TargetGroup> =
        serde_yaml::from_str(&content).map_err(|err| Error::Decode {
            path: path.to_path_buf(),
            err,
        })?;
    for (index, group) in groups.iter_mut().enumerate() {
        group.source = format!("{}:{}", path.display(), index);
    }

    Ok(groups)
}
