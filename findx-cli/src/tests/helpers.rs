//! Test helpers for writing report pools to disk.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub(super) const REPORTS_JSON: &str = r#"[
    {
        "id": "lost-wallet",
        "type": "lost",
        "category": "item",
        "title": "Black leather wallet",
        "description": "Black leather wallet with two cards",
        "aiTags": ["wallet", "leather", "black"],
        "location": { "lat": 51.5072, "lng": -0.1276 },
        "reportedAt": "2024-05-01T10:00:00Z"
    },
    {
        "id": "found-wallet",
        "type": "found",
        "category": "item",
        "title": "Black leather wallet",
        "description": "Black leather wallet found on a bench",
        "aiTags": ["wallet", "black"],
        "location": { "lat": 51.5080, "lng": -0.1280 },
        "reportedAt": "2024-05-01T15:00:00Z"
    },
    {
        "id": "found-umbrella",
        "type": "found",
        "category": "item",
        "title": "Green umbrella",
        "aiTags": ["umbrella"],
        "location": { "lat": 53.4808, "lng": -2.2426 },
        "reportedAt": "2024-06-01T10:00:00Z"
    },
    {
        "id": "found-dog",
        "type": "found",
        "category": "pet",
        "title": "Black leather wallet",
        "aiTags": ["wallet"],
        "reportedAt": "2024-05-01T10:00:00Z"
    }
]"#;

/// Temporary directory holding a report pool.
pub(super) struct ReportsFile {
    _dir: TempDir,
    root: Utf8PathBuf,
    path: Utf8PathBuf,
}

impl ReportsFile {
    pub(super) fn with_contents(contents: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        let path = root.join("reports.json");
        write_utf8(&path, contents.as_bytes());
        Self {
            _dir: dir,
            root,
            path,
        }
    }

    pub(super) fn sample() -> Self {
        Self::with_contents(REPORTS_JSON)
    }

    pub(super) fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

pub(super) fn output_json(buffer: &[u8]) -> serde_json::Value {
    serde_json::from_slice(buffer).expect("output should be JSON")
}
