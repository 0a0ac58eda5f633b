//! Tree restructuring
//!
//! CI archives nest their payload in versioned subfolders. After unpacking,
//! each platform folder is flattened so every file sits directly under it,
//! then debug-symbol archives are gathered into `<group root>/symbols`.

mod symbols;

pub use symbols::{SymbolMatcher, SYMBOLS_FOLDER, SYMBOL_PATTERNS};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::registry::BuildGroup;

/// Errors for restructuring a build group
#[derive(Debug, thiserror::Error)]
pub enum RestructureError {
    #[error("classification root does not exist: {0}")]
    MissingClassificationRoot(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> RestructureError + '_ {
    move |source| RestructureError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// What restructuring changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestructureSummary {
    /// Files moved up to their platform folder root
    pub flattened_files: usize,
    /// Subdirectories removed after flattening
    pub removed_dirs: usize,
    /// Files moved into the symbols folder
    pub symbol_files: Vec<PathBuf>,
}

/// Flatten every platform folder of `group` and collect its symbol files
///
/// The group root must exist; its absence means the unpack stage did not
/// run for this group and is returned as an error.
pub fn restructure_group(
    group: &BuildGroup,
    matcher: &SymbolMatcher,
) -> Result<RestructureSummary, RestructureError> {
    if !group.root_path.is_dir() {
        return Err(RestructureError::MissingClassificationRoot(
            group.root_path.clone(),
        ));
    }

    let mut summary = RestructureSummary::default();

    for platform_folder in &group.platform_folders {
        let dir = group.root_path.join(platform_folder);
        if !dir.is_dir() {
            log::warn!("platform folder {} is missing, nothing to flatten", dir.display());
            continue;
        }
        let (moved, removed) = flatten_dir(&dir)?;
        log::debug!(
            "flattened {}: {} file(s) moved, {} dir(s) removed",
            dir.display(),
            moved,
            removed
        );
        summary.flattened_files += moved;
        summary.removed_dirs += removed;
    }

    summary.symbol_files = relocate_symbols(&group.root_path, matcher)?;
    log::info!(
        "restructured {}: {} symbol file(s) relocated",
        group.root_path.display(),
        summary.symbol_files.len()
    );

    Ok(summary)
}

/// Move every nested file up to `dir` and delete the emptied subdirectories
///
/// Returns `(files moved, directories removed)`. Entries are visited
/// children-first, so a directory is removed only after its contents moved.
/// A later file overwrites an earlier one with the same name. A file whose
/// target is still occupied by a subdirectory is retried once the walk has
/// removed that subdirectory. Entries that cannot be moved or removed are
/// logged and left in place.
pub fn flatten_dir(dir: &Path) -> Result<(usize, usize), RestructureError> {
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let mut moved = 0;
    let mut removed = 0;
    let mut deferred_files: Vec<PathBuf> = Vec::new();
    let mut pending_dirs: Vec<PathBuf> = Vec::new();

    for entry in entries {
        let path = entry.path();
        if entry.file_type().is_dir() {
            match fs::remove_dir(path) {
                Ok(()) => removed += 1,
                Err(_) => pending_dirs.push(path.to_path_buf()),
            }
        } else if entry.depth() > 1 {
            let target = dir.join(entry.file_name());
            if target.is_dir() {
                deferred_files.push(path.to_path_buf());
            } else if move_up(path, &target) {
                moved += 1;
            }
        }
    }

    for path in deferred_files {
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = dir.join(file_name);
        if target.is_dir() {
            log::warn!(
                "cannot flatten {}: {} is a directory",
                path.display(),
                target.display()
            );
        } else if move_up(&path, &target) {
            moved += 1;
        }
    }

    // Children were pushed before their parents
    for path in pending_dirs {
        match fs::remove_dir(&path) {
            Ok(()) => removed += 1,
            Err(e) => log::warn!("cannot remove {}: {}", path.display(), e),
        }
    }

    Ok((moved, removed))
}

fn move_up(path: &Path, target: &Path) -> bool {
    match fs::rename(path, target) {
        Ok(()) => true,
        Err(e) => {
            log::error!("cannot move {} to {}: {}", path.display(), target.display(), e);
            false
        }
    }
}

/// Move files under `root` whose names match `matcher` into `root/symbols`
///
/// Returns the new locations, in walk order.
pub fn relocate_symbols(root: &Path, matcher: &SymbolMatcher) -> Result<Vec<PathBuf>, RestructureError> {
    let symbols_dir = root.join(SYMBOLS_FOLDER);
    fs::create_dir_all(&symbols_dir).map_err(io_err(&symbols_dir))?;

    let mut matches = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|e| e.path() != symbols_dir)
    {
        let entry = entry?;
        if entry.file_type().is_file() && matcher.is_symbol_file(&entry.file_name().to_string_lossy()) {
            matches.push(entry.into_path());
        }
    }

    let mut relocated = Vec::with_capacity(matches.len());
    for path in matches {
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = symbols_dir.join(file_name);
        fs::rename(&path, &target).map_err(io_err(&path))?;
        log::debug!("moved symbols {} -> {}", path.display(), target.display());
        relocated.push(target);
    }

    Ok(relocated)
}
