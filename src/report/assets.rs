//! Static assets bundled into every report.

use crate::error::{Result, SummaryError};
use std::fs;
use std::path::{Path, PathBuf};

/// A file copied verbatim into the report's resources directory.
#[derive(Debug, Clone, Copy)]
pub struct StaticAsset {
    /// Path relative to the resources directory.
    pub path: &'static str,
    pub contents: &'static str,
}

/// The fixed asset set, in the order stylesheets are linked.
pub const STATIC_ASSETS: &[StaticAsset] = &[
    StaticAsset {
        path: "dist/css/summary.css",
        contents: include_str!("assets/summary.css"),
    },
    StaticAsset {
        path: "dist/css/print.css",
        contents: include_str!("assets/print.css"),
    },
];

/// Write every bundled asset under `resources`, creating directories as needed.
pub fn copy_assets(resources: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(STATIC_ASSETS.len());
    for asset in STATIC_ASSETS {
        let target = resources.join(asset.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| SummaryError::output_write(parent, e))?;
        }
        fs::write(&target, asset.contents).map_err(|e| SummaryError::output_write(&target, e))?;
        written.push(target);
    }
    Ok(written)
}

/// Stylesheet links relative to the report index.
pub fn stylesheet_hrefs(resources_dir: &str) -> Vec<String> {
    STATIC_ASSETS
        .iter()
        .filter(|asset| asset.path.ends_with(".css"))
        .map(|asset| format!("{}/{}", resources_dir, asset.path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_assets_unmodified() {
        let dir = TempDir::new().unwrap();
        let written = copy_assets(dir.path()).unwrap();
        assert_eq!(written.len(), STATIC_ASSETS.len());
        for (path, asset) in written.iter().zip(STATIC_ASSETS) {
            assert_eq!(fs::read_to_string(path).unwrap(), asset.contents);
        }
    }

    #[test]
    fn test_stylesheet_hrefs() {
        let hrefs = stylesheet_hrefs("res");
        assert_eq!(hrefs, vec!["res/dist/css/summary.css", "res/dist/css/print.css"]);
    }
}
