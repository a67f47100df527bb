use crate::error::{DistError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Packs `dir` into a gzip-compressed tarball at `dest`, under a top-level
/// folder named after `dir`.
pub fn pack_tar_gz(dir: &Path, dest: &Path) -> Result<PathBuf> {
    let folder = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| DistError::Config(format!("cannot archive {}", dir.display())))?;

    let file = File::create(dest).map_err(|e| DistError::io(dest, e))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    builder
        .append_dir_all(&folder, dir)
        .map_err(|e| DistError::io(dir, e))?;
    let encoder = builder.into_inner().map_err(|e| DistError::io(dest, e))?;
    encoder.finish().map_err(|e| DistError::io(dest, e))?;

    info!("Created archive {}", dest.display());
    Ok(dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_archive_contains_tree() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("kumihan_dist");
        fs::create_dir_all(dir.join("docs/user")).unwrap();
        fs::write(dir.join("docs/user/guide.html"), "<html></html>").unwrap();

        let dest = temp.path().join("kumihan_dist.tar.gz");
        pack_tar_gz(&dir, &dest).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&dest).unwrap()));
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert!(names.iter().any(|n| n == "kumihan_dist/docs/user/guide.html"));
    }
}
