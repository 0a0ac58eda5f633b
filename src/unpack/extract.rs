//! Archive extraction and directory merging
//!
//! Every routine writes into an existing-or-created destination and
//! overwrites same-named files, so unpacking several archives for the same
//! platform accumulates into one tree.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use walkdir::WalkDir;

use super::UnpackError;

/// Archive formats the unpacker understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveKind {
    /// Detect the format from the file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else {
            None
        }
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> UnpackError + '_ {
    move |source| UnpackError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Extract `archive` into `dest` according to its detected format
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<(), UnpackError> {
    match ArchiveKind::from_path(archive) {
        Some(ArchiveKind::Zip) => extract_zip(archive, dest),
        Some(ArchiveKind::Tar) => {
            let file = File::open(archive).map_err(io_err(archive))?;
            extract_tar(file, archive, dest)
        }
        Some(ArchiveKind::TarGz) => {
            let file = File::open(archive).map_err(io_err(archive))?;
            extract_tar(GzDecoder::new(file), archive, dest)
        }
        None => Err(UnpackError::UnsupportedArchive(archive.to_path_buf())),
    }
}

/// Extract a ZIP archive into `dest`
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<(), UnpackError> {
    let file = File::open(archive_path).map_err(io_err(archive_path))?;
    let mut archive = zip::ZipArchive::new(file)?;

    fs::create_dir_all(dest).map_err(io_err(dest))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let entry_path = entry
            .enclosed_name()
            .ok_or_else(|| UnpackError::UnsafeEntry(entry.name().to_string()))?;
        if !is_contained(&entry_path) {
            return Err(UnpackError::UnsafeEntry(entry_path.display().to_string()));
        }

        let output_path = dest.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&output_path).map_err(io_err(&output_path))?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let mut outfile = File::create(&output_path).map_err(io_err(&output_path))?;
        io::copy(&mut entry, &mut outfile).map_err(io_err(&output_path))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&output_path, fs::Permissions::from_mode(mode & 0o777))
                .map_err(io_err(&output_path))?;
        }
    }

    Ok(())
}

/// Extract a (possibly decompressed) tar stream into `dest`
///
/// `tar` skips entries that would land outside `dest`.
pub fn extract_tar<R: io::Read>(reader: R, archive_path: &Path, dest: &Path) -> Result<(), UnpackError> {
    fs::create_dir_all(dest).map_err(io_err(dest))?;

    let mut archive = tar::Archive::new(reader);
    archive.set_overwrite(true);
    archive.unpack(dest).map_err(io_err(archive_path))
}

/// Recursively copy `source` into `dest`, keeping existing content
///
/// Files with the same relative path are overwritten.
pub fn merge_dir(source: &Path, dest: &Path) -> Result<(), UnpackError> {
    fs::create_dir_all(dest).map_err(io_err(dest))?;

    for entry in WalkDir::new(source)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = entry?;
        let rel_path = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| UnpackError::UnsafeEntry(entry.path().display().to_string()))?;

        if rel_path.as_os_str().is_empty() {
            continue;
        }

        let target: PathBuf = dest.join(rel_path);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(io_err(&target))?;
        } else if file_type.is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(io_err(parent))?;
            }
            fs::copy(entry.path(), &target).map_err(io_err(&target))?;
        } else {
            log::debug!("skipping non-regular file {}", entry.path().display());
        }
    }

    Ok(())
}

/// Relative, with no `..` or root components
fn is_contained(path: &Path) -> bool {
    !path.is_absolute()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, contents) in files {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_archive_kind_detection() {
        assert_eq!(ArchiveKind::from_path(Path::new("a-artifacts.zip")), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::from_path(Path::new("a-artifacts.ZIP")), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::from_path(Path::new("a-artifacts.tar.gz")), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::from_path(Path::new("a-artifacts.tgz")), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::from_path(Path::new("a-artifacts.tar")), Some(ArchiveKind::Tar));
        assert_eq!(ArchiveKind::from_path(Path::new("a-artifacts.7z")), None);
    }

    #[test]
    fn test_extract_zip_nested() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("7.1.11/Setup.exe", b"exe"), ("notes.txt", b"n")]);

        let dest = dir.path().join("out");
        extract_zip(&archive, &dest).unwrap();

        assert_eq!(fs::read(dest.join("7.1.11/Setup.exe")).unwrap(), b"exe");
        assert_eq!(fs::read(dest.join("notes.txt")).unwrap(), b"n");
    }

    #[test]
    fn test_extract_zip_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("Setup.exe"), b"old").unwrap();
        fs::write(dest.join("keep.txt"), b"keep").unwrap();

        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("Setup.exe", b"new")]);
        extract_zip(&archive, &dest).unwrap();

        assert_eq!(fs::read(dest.join("Setup.exe")).unwrap(), b"new");
        assert_eq!(fs::read(dest.join("keep.txt")).unwrap(), b"keep");
    }

    #[test]
    fn test_extract_corrupt_zip() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("bad.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        let err = extract_zip(&archive, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, UnpackError::Zip(_)));
    }

    #[test]
    fn test_extract_tar_gz() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("a.tar.gz");
        {
            let file = File::create(&archive).unwrap();
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let data = b"linux build";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, "nested/Viewer.tar.xz", &data[..])
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }

        let dest = dir.path().join("out");
        extract_archive(&archive, &dest).unwrap();
        assert_eq!(fs::read(dest.join("nested/Viewer.tar.xz")).unwrap(), b"linux build");
    }

    #[test]
    fn test_merge_dir_preserves_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("sub/a.txt"), b"from source").unwrap();
        fs::write(source.join("b.txt"), b"b").unwrap();

        let dest = dir.path().join("dest");
        fs::create_dir_all(dest.join("sub")).unwrap();
        fs::write(dest.join("sub/a.txt"), b"old").unwrap();
        fs::write(dest.join("existing.txt"), b"kept").unwrap();

        merge_dir(&source, &dest).unwrap();

        assert_eq!(fs::read(dest.join("sub/a.txt")).unwrap(), b"from source");
        assert_eq!(fs::read(dest.join("b.txt")).unwrap(), b"b");
        assert_eq!(fs::read(dest.join("existing.txt")).unwrap(), b"kept");
    }

    #[test]
    fn test_is_contained() {
        assert!(is_contained(Path::new("a/b.txt")));
        assert!(!is_contained(Path::new("../b.txt")));
        assert!(!is_contained(Path::new("/etc/passwd")));
    }
}
