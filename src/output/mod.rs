//! Module persisting aggregated totals as result files and mapping output identifiers back to them.

use std::{
    fmt,
    fs::{self, File},
    io,
    path::{Component, Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    domain::{DepartmentTotal, Money},
    error::{Error, write_failure},
};


const SUMMARY_HEADER: [&str; 2] = ["department", "totalSales"];

/// Name of a persisted result file, e.g. `results_5f0c…e1.csv`.
///
/// Only ever built from a freshly generated random UUID, never from anything the caller supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputId(String);

impl OutputId {
    fn generate() -> Self {
        Self(format!("results_{}.csv", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OutputId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<OutputId> for String {
    fn from(value: OutputId) -> Self {
        value.0
    }
}

/// Flat directory holding the result files. Existence on disk is the only record of a result.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| write_failure(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the summary under a new identifier.
    ///
    /// The file is assembled under a hidden temporary name and renamed into place once fully
    /// synced, so the returned identifier never points at a partial file. On failure nothing is
    /// left under the final name.
    pub fn write(&self, totals: &[DepartmentTotal]) -> Result<OutputId, Error> {
        let id = OutputId::generate();
        let path = self.dir.join(id.as_str());
        let tmp_path = self.dir.join(format!(".{id}.tmp"));

        let persisted =
            write_summary(&tmp_path, totals).and_then(|()| fs::rename(&tmp_path, &path));
        if let Err(e) = persisted {
            remove_leftover(&tmp_path);
            return Err(write_failure(path, e));
        }
        // the rename is only durable once the directory entry is
        if let Err(e) = sync_dir(&self.dir) {
            remove_leftover(&path);
            return Err(write_failure(path, e));
        }

        debug!(output = %id, departments = totals.len(), "result written");
        Ok(id)
    }

    /// Maps an identifier to its location inside the output directory without touching the filesystem.
    ///
    /// Anything that is not a single plain file name is rejected: path separators of either
    /// convention, `.`/`..`, any `..` sequence and NUL bytes. Hidden names are rejected as well,
    /// since in-flight temporary files live under them.
    pub fn path_for(&self, id: &str) -> Result<PathBuf, Error> {
        let mut components = Path::new(id).components();
        let single_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_name
            || id.starts_with('.')
            || id.contains("..")
            || id.contains(['/', '\\', '\0'])
        {
            return Err(Error::InvalidIdentifier(id.to_string()));
        }
        Ok(self.dir.join(id))
    }

    /// Like [`ResultStore::path_for`], but additionally requires the result to exist.
    pub fn resolve(&self, id: &str) -> Result<PathBuf, Error> {
        let path = self.path_for(id)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::NotFound(id.to_string()))
        }
    }

    /// File name offered to whoever downloads the result
    pub fn download_name(id: &OutputId) -> String {
        format!("department_totals_{id}")
    }
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    department: &'a str,
    #[serde(rename = "totalSales")]
    total_sales: Money,
}

fn write_summary(path: &Path, totals: &[DepartmentTotal]) -> io::Result<()> {
    let file = File::create_new(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    wtr.write_record(SUMMARY_HEADER)?;
    for total in totals {
        wtr.serialize(SummaryRow {
            department: &total.department,
            // `130`, not `130.00`: trailing fractional zeros only reflect the input's notation
            total_sales: total.total_sales.normalize(),
        })?;
    }

    let file = wtr.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

// directories cannot be opened for syncing on other platforms
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

fn remove_leftover(tmp_path: &Path) {
    match fs::remove_file(tmp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %tmp_path.display(), "failed to remove temporary result: {e}"),
    }
}
