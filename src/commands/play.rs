use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::parser::config::{self, Config};
use crate::parser::graph;
use crate::tui::canvas;

/// Launch the interactive board, with the graph from `path` or the
/// built-in demo board when no file is given.
pub fn run(path: Option<&Path>) -> Result<()> {
    let (graph, config, config_path) = match path {
        Some(path) => {
            let input = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let loaded = graph::parse(&input)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            let config_path = path.with_extension("cfg");
            let config = load_config(&config_path)?;
            (loaded.graph, config, Some(config_path))
        }
        // No file means nowhere to persist settings to.
        None => (canvas::demo_graph(), Config::default(), None),
    };
    canvas::run(graph, config, config_path)
}

/// Read the sibling `.cfg` file, falling back to defaults when absent.
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let input =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    config::parse(&input).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.cfg");
        let config = load_config(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn config_is_loaded_from_the_sibling_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.cfg");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "double_click_ms = 250").unwrap();
        writeln!(file, "show_day = false").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.double_click_ms, 250);
        assert!(!config.show_day);
    }

    #[test]
    fn a_broken_config_file_is_an_error_not_a_silent_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.cfg");
        fs::write(&path, "double_click_ms = soon\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
