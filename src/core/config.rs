/// Build configuration, loaded from RON with every field defaulted.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::sequence::{SequenceOptions, UnmatchedPolicy};
use crate::core::tree::VictoryRule;
use crate::schema::symbol::Side;

/// Tree length of the reference game.
pub const DEFAULT_LENGTH: i64 = 101;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Tree length; odd and at least 5.
    pub length: i64,
    /// RNG seed. `None` draws a fresh one per run.
    pub seed: Option<u64>,
    pub victory: VictoryRule,
    pub terminal_lookahead: Side,
    pub on_unmatched: UnmatchedPolicy,
    pub assets_dir: PathBuf,
    pub copies_dir: PathBuf,
    pub template_dir: PathBuf,
    pub template_name: String,
    pub output_file: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            seed: None,
            victory: VictoryRule::FixedRight,
            terminal_lookahead: Side::L,
            on_unmatched: UnmatchedPolicy::Fail,
            assets_dir: PathBuf::from("static/game_frames"),
            copies_dir: PathBuf::from("static/game_frame_copies"),
            template_dir: PathBuf::from("templates"),
            template_name: "game.html".to_string(),
            output_file: PathBuf::from("index.html"),
        }
    }
}

impl GameConfig {
    pub fn load_from_ron(path: &Path) -> Result<GameConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<GameConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    pub fn sequence_options(&self) -> SequenceOptions {
        SequenceOptions {
            terminal_lookahead: self.terminal_lookahead,
            on_unmatched: self.on_unmatched,
        }
    }

    /// `dir` as the page would link to it: relative to the output file's
    /// folder when possible, with forward slashes.
    pub fn page_relative(&self, dir: &Path) -> String {
        let base = self.output_file.parent().unwrap_or(Path::new(""));
        let rel = dir.strip_prefix(base).unwrap_or(dir);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.length, 101);
        assert_eq!(cfg.victory, VictoryRule::FixedRight);
        assert_eq!(cfg.terminal_lookahead, Side::L);
        assert_eq!(cfg.on_unmatched, UnmatchedPolicy::Fail);
        assert_eq!(cfg.output_file, PathBuf::from("index.html"));
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let cfg = GameConfig::parse_ron("(length: 21, seed: Some(9), victory: Random)").unwrap();
        assert_eq!(cfg.length, 21);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.victory, VictoryRule::Random);
        assert_eq!(cfg.template_name, "game.html");
        assert_eq!(cfg.assets_dir, PathBuf::from("static/game_frames"));
    }

    #[test]
    fn bad_ron_is_error() {
        assert!(matches!(
            GameConfig::parse_ron("(length: \"long\")"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn load_fixture() {
        let cfg = GameConfig::load_from_ron(Path::new("tests/fixtures/test_config.ron")).unwrap();
        assert_eq!(cfg.length, 9);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.on_unmatched, UnmatchedPolicy::Skip);
    }

    #[test]
    fn load_missing_file() {
        let err = GameConfig::load_from_ron(Path::new("tests/fixtures/nope.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn page_relative_paths() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.page_relative(&cfg.copies_dir), "static/game_frame_copies");

        let nested = GameConfig {
            output_file: PathBuf::from("site/index.html"),
            copies_dir: PathBuf::from("site/static/copies"),
            ..GameConfig::default()
        };
        assert_eq!(nested.page_relative(&nested.copies_dir), "static/copies");
    }
}
