//! [`TarballBuilder`] for `.tar.gz` archives shaped like hosted source archives.

use std::io;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};
use walkdir::WalkDir;

/// Builds a gzipped tarball in memory.
///
/// Entries added through [`TarballBuilder::file`] and [`TarballBuilder::dir`]
/// are placed under `<top>/methodology/`, the layout of a repository archive.
pub struct TarballBuilder {
    top: String,
    builder: Builder<GzEncoder<Vec<u8>>>,
}

impl TarballBuilder {
    /// Start an archive whose single top-level directory is `top`.
    pub fn new(top: &str) -> Self {
        Self {
            top: top.to_string(),
            builder: Builder::new(GzEncoder::new(Vec::new(), Compression::default())),
        }
    }

    /// An archive holding every file and directory of `dir` under
    /// `spire-main/methodology/`.
    pub fn from_dir(dir: &Path) -> Vec<u8> {
        let mut tarball = Self::new("spire-main");
        for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
            let entry = entry.unwrap();
            let relative = entry
                .path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");

            if entry.file_type().is_dir() {
                tarball = tarball.dir(&relative);
            } else if entry.file_type().is_file() {
                let content = std::fs::read(entry.path()).unwrap();
                tarball = tarball.file(&relative, &content, file_mode(entry.path()));
            }
        }
        tarball.build()
    }

    /// Add a directory below `<top>/methodology/`.
    pub fn dir(self, relative: &str) -> Self {
        let name = format!("{}/methodology/{}/", self.top, relative.trim_end_matches('/'));
        self.append(&name, EntryType::Directory, 0o755, &[])
    }

    /// Add a regular file below `<top>/methodology/`.
    pub fn file(self, relative: &str, content: &[u8], mode: u32) -> Self {
        let name = format!("{}/methodology/{}", self.top, relative);
        self.append(&name, EntryType::Regular, mode, content)
    }

    /// Add a regular file at an arbitrary archive path.
    pub fn entry(self, name: &str, content: &[u8]) -> Self {
        self.append(name, EntryType::Regular, 0o644, content)
    }

    /// Add a symlink below `<top>/methodology/`.
    pub fn symlink(mut self, relative: &str, target: &str) -> Self {
        let name = format!("{}/methodology/{}", self.top, relative);
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        header.set_mode(0o777);
        self.builder
            .append_link(&mut header, &name, target)
            .unwrap();
        self
    }

    /// Add a regular file whose header name is written verbatim.
    ///
    /// Bypasses the path checks of [`tar::Header::set_path`], so names such
    /// as `pkg-main/methodology/../../escape` can be produced.
    pub fn raw_entry(mut self, name: &str, content: &[u8]) -> Self {
        let mut header = Header::new_gnu();
        {
            let gnu = header.as_gnu_mut().unwrap();
            let bytes = name.as_bytes();
            assert!(bytes.len() < gnu.name.len(), "raw entry name too long");
            gnu.name[..bytes.len()].copy_from_slice(bytes);
        }
        header.set_entry_type(EntryType::Regular);
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        self.builder.append(&header, content).unwrap();
        self
    }

    /// Finish the archive and return the gzipped bytes.
    pub fn build(self) -> Vec<u8> {
        let encoder = self.builder.into_inner().unwrap();
        encoder.finish().unwrap()
    }

    fn append(mut self, name: &str, kind: EntryType, mode: u32, content: &[u8]) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(kind);
        header.set_size(content.len() as u64);
        header.set_mode(mode);
        self.builder
            .append_data(&mut header, name, io::Cursor::new(content))
            .unwrap();
        self
    }
}

#[cfg(unix)]
fn file_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> u32 {
    0o644
}
