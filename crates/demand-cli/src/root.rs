use demand_core::paths::{ARCHIVE_KEY, DEMAND_DIR};
use std::path::{Path, PathBuf};

/// Resolve the data root directory.
///
/// Priority:
/// 1. `--root` flag / `DEMAND_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.demand/`
/// 3. Walk upward from `cwd` looking for `dataformodel.json`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    find_upward(&cwd, |dir| dir.join(DEMAND_DIR).is_dir())
        .or_else(|| find_upward(&cwd, |dir| dir.join(ARCHIVE_KEY).is_file()))
        .unwrap_or(cwd)
}

fn find_upward(start: &Path, found: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|dir| found(dir)).map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_demand_dir_from_nested_start() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".demand")).unwrap();
        let nested = dir.path().join("backend/jobs");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_upward(&nested, |d| d.join(DEMAND_DIR).is_dir());
        assert_eq!(found.as_deref(), Some(dir.path()));
    }

    #[test]
    fn finds_archive_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(ARCHIVE_KEY), "[]").unwrap();
        let nested = dir.path().join("scripts");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_upward(&nested, |d| d.join(ARCHIVE_KEY).is_file());
        assert_eq!(found.as_deref(), Some(dir.path()));
    }
}
