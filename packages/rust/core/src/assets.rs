//! Output directory lifecycle and static assets.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use kwdoc_shared::{KwdocError, Result};

/// Name of the assets directory inside the output root.
pub const STATIC_DIR_NAME: &str = "static";

/// Assets bundled into the binary: `(file name, content)`.
const BUNDLED_ASSETS: &[(&str, &str)] = &[
    ("style.css", include_str!("../static/style.css")),
    ("filter.js", include_str!("../static/filter.js")),
];

/// Remove `out_dir` if present, recreate it, and populate `static/`.
///
/// `static_src` replaces the bundled assets when given.
#[instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub fn reset_output_dir(out_dir: &Path, static_src: Option<&Path>) -> Result<()> {
    if out_dir.is_dir() {
        std::fs::remove_dir_all(out_dir).map_err(|e| KwdocError::io(out_dir, e))?;
        debug!("removed previous output");
    } else if out_dir.exists() {
        return Err(KwdocError::invalid_input(format!(
            "output path {} exists and is not a directory",
            out_dir.display()
        )));
    }

    std::fs::create_dir_all(out_dir).map_err(|e| KwdocError::io(out_dir, e))?;

    let static_dst = out_dir.join(STATIC_DIR_NAME);
    match static_src {
        Some(src) => copy_dir(src, &static_dst)?,
        None => write_bundled(&static_dst)?,
    }

    info!("output directory ready");
    Ok(())
}

/// Write the bundled assets into `dst`.
fn write_bundled(dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst).map_err(|e| KwdocError::io(dst, e))?;
    for (name, content) in BUNDLED_ASSETS {
        let path = dst.join(name);
        std::fs::write(&path, content).map_err(|e| KwdocError::io(&path, e))?;
    }
    debug!(count = BUNDLED_ASSETS.len(), "wrote bundled assets");
    Ok(())
}

/// Recursively copy `src` to `dst`.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(KwdocError::config(format!(
            "static directory {} does not exist",
            src.display()
        )));
    }

    let mut copied = 0usize;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
            KwdocError::io(path, std::io::Error::other(e.to_string()))
        })?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target: PathBuf = dst.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| KwdocError::io(&target, e))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| KwdocError::io(&target, e))?;
            copied += 1;
        }
    }

    debug!(src = %src.display(), files = copied, "copied static directory");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_removes_previous_content() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        std::fs::create_dir_all(out.join("old/nested")).unwrap();
        std::fs::write(out.join("old/nested/stale.html"), "stale").unwrap();

        reset_output_dir(&out, None).unwrap();

        assert!(!out.join("old").exists());
        assert!(out.join("static/style.css").is_file());
        assert!(out.join("static/filter.js").is_file());
    }

    #[test]
    fn reset_creates_missing_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("a/b/out");
        reset_output_dir(&out, None).unwrap();
        assert!(out.join("static").is_dir());
    }

    #[test]
    fn custom_static_dir_is_copied_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("assets");
        std::fs::create_dir_all(src.join("img")).unwrap();
        std::fs::write(src.join("site.css"), "body{}").unwrap();
        std::fs::write(src.join("img/logo.svg"), "<svg/>").unwrap();

        let out = tmp.path().join("out");
        reset_output_dir(&out, Some(&src)).unwrap();

        assert!(out.join("static/site.css").is_file());
        assert!(out.join("static/img/logo.svg").is_file());
        assert!(!out.join("static/style.css").exists());
    }

    #[test]
    fn output_path_that_is_a_file_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        std::fs::write(&out, "file").unwrap();

        let err = reset_output_dir(&out, None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(out.is_file());
    }
}
