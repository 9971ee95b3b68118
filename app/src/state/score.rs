//! High score persistence: a single decimal number in a text file.

use std::path::Path;

/// Read the high score. A missing file is a fresh install (0); anything
/// unreadable is logged and also treated as 0.
pub fn load(path: &Path) -> u32 {
    match std::fs::read_to_string(path) {
        Ok(contents) => match contents.trim().parse() {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!("ignoring high score in {}: {e}", path.display());
                0
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
        Err(e) => {
            tracing::warn!("failed to read {}: {e}", path.display());
            0
        }
    }
}

/// Write the high score. Creates parent dirs if needed. Never panics.
pub fn save(path: &Path, score: u32) {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        tracing::warn!("failed to create score dir {}: {e}", dir.display());
        return;
    }
    match std::fs::write(path, format!("{score}\n")) {
        Ok(()) => tracing::debug!("high score {score} saved to {}", path.display()),
        Err(e) => tracing::warn!("failed to write {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load(&dir.path().join("score.txt")), 0);
    }

    #[test]
    fn garbage_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("score.txt");
        std::fs::write(&path, "lots").unwrap();
        assert_eq!(load(&path), 0);
        std::fs::write(&path, "-4").unwrap();
        assert_eq!(load(&path), 0);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores").join("score.txt");
        save(&path, 42);
        assert_eq!(load(&path), 42);
        save(&path, 7);
        assert_eq!(load(&path), 7);
    }

    #[test]
    fn surrounding_whitespace_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("score.txt");
        std::fs::write(&path, "  13\r\n").unwrap();
        assert_eq!(load(&path), 13);
    }
}
