/// The page build pipeline: Tree → Sequence → assets → page.
///
/// Runs as explicit stages so the pure part can be tested without a
/// filesystem:
/// 1. plan the sequence in memory,
/// 2. validate the plan,
/// 3. reset the copies folder,
/// 4. copy the numbered success frames,
/// 5. render and publish the page.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::assets::{AssetError, AssetStore, FsAssetStore};
use crate::core::config::{ConfigError, GameConfig};
use crate::core::render::{JinjaRenderer, PageContext, RenderError, TemplateRenderer};
use crate::core::sequence::{
    build_sequence, Sequence, SequenceError, SequenceOptions, UnmatchedPolicy,
};
use crate::core::tree::{Tree, TreeError};
use crate::schema::step::CopyRequest;
use crate::schema::symbol::Side;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("sequence error: {0}")]
    Sequence(#[from] SequenceError),
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("incomplete plan at index {index}: {reason}")]
    IncompletePlan { index: usize, reason: String },
    #[error("failed to publish {}: {source}", path.display())]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of the pure planning stage.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub tree: Tree,
    /// Seed the tree was generated from; `None` for a supplied tree.
    pub seed: Option<u64>,
    pub sequence: Sequence,
    pub copies: Vec<CopyRequest>,
}

/// Where and how the page gets written.
#[derive(Debug, Clone)]
pub struct OutputTarget {
    pub template_name: String,
    pub output_file: PathBuf,
    /// Page-relative folder of shared frames.
    pub frames_dir: String,
    /// Page-relative folder of numbered copies.
    pub copies_dir: String,
}

/// What a finished build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub tree: Tree,
    pub seed: Option<u64>,
    pub steps: usize,
    pub copies: usize,
    pub output: PathBuf,
}

/// Stage 1: derive the sequence and its copy requests from a tree.
pub fn plan(
    tree: Tree,
    seed: Option<u64>,
    options: &SequenceOptions,
) -> Result<BuildPlan, BuildError> {
    let sequence = build_sequence(&tree, options)?;
    let copies = sequence.copy_requests();
    Ok(BuildPlan {
        tree,
        seed,
        sequence,
        copies,
    })
}

impl BuildPlan {
    /// Stage 2: every step has exactly one copy named after its own index,
    /// no destination is written twice, and the tree has a victory branch.
    pub fn validate(&self) -> Result<(), BuildError> {
        let mut dests = FxHashSet::default();
        for copy in &self.copies {
            if !dests.insert(copy.dest_name()) {
                return Err(BuildError::IncompletePlan {
                    index: copy.index,
                    reason: format!("duplicate copy destination {}", copy.dest_name()),
                });
            }
        }

        if self.copies.len() != self.sequence.len() {
            return Err(BuildError::IncompletePlan {
                index: self.copies.len().min(self.sequence.len()),
                reason: format!(
                    "{} steps but {} copies",
                    self.sequence.len(),
                    self.copies.len()
                ),
            });
        }

        for (step, copy) in self.sequence.steps.iter().zip(&self.copies) {
            if copy.index != step.index || copy.source != step.success_asset {
                return Err(BuildError::IncompletePlan {
                    index: step.index,
                    reason: format!(
                        "step expects {} but copy is {}",
                        step.copy_name(),
                        copy.dest_name()
                    ),
                });
            }
        }

        if self.tree.penultimate().is_none() {
            return Err(BuildError::IncompletePlan {
                index: self.tree.len().saturating_sub(2),
                reason: "tree has no victory branch".to_string(),
            });
        }
        Ok(())
    }

    /// Number of numbered copies per source asset.
    pub fn copies_per_asset(&self) -> FxHashMap<&str, usize> {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for copy in &self.copies {
            *counts.entry(copy.source.as_str()).or_default() += 1;
        }
        counts
    }

    pub fn victory_side(&self) -> Option<Side> {
        self.tree.penultimate()
    }
}

/// Stages 3–5: reset the copies folder, copy frames, render and publish.
///
/// The page is rendered in memory and renamed into place, so a failure
/// never leaves a half-written page. The copies folder has no such
/// guarantee.
pub fn execute(
    plan: &BuildPlan,
    store: &mut dyn AssetStore,
    renderer: &dyn TemplateRenderer,
    target: &OutputTarget,
) -> Result<PathBuf, BuildError> {
    let victory = plan.victory_side().ok_or_else(|| BuildError::IncompletePlan {
        index: plan.tree.len().saturating_sub(2),
        reason: "tree has no victory branch".to_string(),
    })?;

    store.clear_and_recreate()?;
    debug!("copies folder reset");

    for copy in &plan.copies {
        store.copy_request(copy)?;
    }
    info!(copies = plan.copies.len(), "success frames copied");

    let context = PageContext::new(
        &plan.sequence,
        plan.tree.len(),
        victory,
        target.frames_dir.clone(),
        target.copies_dir.clone(),
    );
    let page = renderer.render(&target.template_name, &context)?;

    publish(&target.output_file, &page)?;
    info!(output = %target.output_file.display(), bytes = page.len(), "page written");
    Ok(target.output_file.clone())
}

/// Write to a sibling temp file, then rename over the destination.
fn publish(path: &Path, contents: &str) -> Result<(), BuildError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, contents).map_err(|source| BuildError::Publish {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        BuildError::Publish {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Builds the page from a [`GameConfig`], with per-run overrides.
pub struct PageBuilder {
    config: GameConfig,
    seed: Option<u64>,
    tree: Option<Tree>,
}

impl PageBuilder {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            seed: None,
            tree: None,
        }
    }

    /// Load the config from a RON file.
    pub fn from_ron(path: &Path) -> Result<Self, BuildError> {
        Ok(Self::new(GameConfig::load_from_ron(path)?))
    }

    /// Override the config's seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a fixed tree instead of generating one.
    pub fn tree(mut self, tree: Tree) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Stages 1–2 only: produce and validate the plan without touching disk.
    pub fn prepare(&self) -> Result<BuildPlan, BuildError> {
        let (tree, seed) = match &self.tree {
            Some(tree) => {
                match self.config.on_unmatched {
                    UnmatchedPolicy::Fail => tree.validate()?,
                    UnmatchedPolicy::Skip => tree.validate_layout()?,
                }
                tree.check_victory(self.config.victory)?;
                (tree.clone(), None)
            }
            None => {
                let seed = self
                    .seed
                    .or(self.config.seed)
                    .unwrap_or_else(rand::random);
                let mut rng = StdRng::seed_from_u64(seed);
                let tree = Tree::generate_with(self.config.length, self.config.victory, &mut rng)?;
                info!(length = tree.len(), seed, "tree generated");
                (tree, Some(seed))
            }
        };
        debug!(tree = %tree, "layout");

        let plan = plan(tree, seed, &self.config.sequence_options())?;
        plan.validate()?;
        if !plan.sequence.skipped.is_empty() {
            warn!(skipped = ?plan.sequence.skipped, "unmatched windows skipped");
        }
        info!(
            steps = plan.sequence.len(),
            assets = plan.copies_per_asset().len(),
            "sequence planned"
        );
        Ok(plan)
    }

    pub fn output_target(&self) -> OutputTarget {
        OutputTarget {
            template_name: self.config.template_name.clone(),
            output_file: self.config.output_file.clone(),
            frames_dir: self.config.page_relative(&self.config.assets_dir),
            copies_dir: self.config.page_relative(&self.config.copies_dir),
        }
    }

    /// Run every stage against the filesystem.
    pub fn build(self) -> Result<BuildReport, BuildError> {
        let mut store = FsAssetStore::new(&self.config.assets_dir, &self.config.copies_dir);
        let renderer = JinjaRenderer::new(&self.config.template_dir);
        self.build_with(&mut store, &renderer)
    }

    /// Run every stage against the given collaborators.
    pub fn build_with(
        self,
        store: &mut dyn AssetStore,
        renderer: &dyn TemplateRenderer,
    ) -> Result<BuildReport, BuildError> {
        let plan = self.prepare()?;
        let output = execute(&plan, store, renderer, &self.output_target())?;
        Ok(BuildReport {
            steps: plan.sequence.len(),
            copies: plan.copies.len(),
            tree: plan.tree,
            seed: plan.seed,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records copy requests instead of touching the filesystem.
    #[derive(Default)]
    struct RecordingStore {
        resets: usize,
        copies: Vec<(String, String)>,
    }

    impl AssetStore for RecordingStore {
        fn clear_and_recreate(&mut self) -> Result<(), AssetError> {
            self.resets += 1;
            self.copies.clear();
            Ok(())
        }

        fn copy(&mut self, source: &str, dest: &str) -> Result<(), AssetError> {
            self.copies.push((source.to_string(), dest.to_string()));
            Ok(())
        }
    }

    struct CountingRenderer;

    impl TemplateRenderer for CountingRenderer {
        fn render(&self, _name: &str, context: &PageContext) -> Result<String, RenderError> {
            Ok(format!("{} steps, win {}", context.sequence.len(), context.victory_asset))
        }
    }

    #[test]
    fn plan_is_pure_and_valid() {
        let tree: Tree = "NRNLNRNRN".parse().unwrap();
        let plan = plan(tree, None, &SequenceOptions::default()).unwrap();
        plan.validate().unwrap();
        assert_eq!(plan.sequence.len(), 8);
        assert_eq!(plan.copies.len(), 8);
        assert_eq!(plan.copies_per_asset()["NRN"], 3);
        assert_eq!(plan.victory_side(), Some(Side::R));
    }

    #[test]
    fn validate_catches_mismatched_copy() {
        let tree: Tree = "NRNLNRNRN".parse().unwrap();
        let mut plan = plan(tree, None, &SequenceOptions::default()).unwrap();
        plan.copies[2].index = 5;
        assert!(matches!(
            plan.validate(),
            Err(BuildError::IncompletePlan { .. })
        ));
    }

    #[test]
    fn validate_catches_duplicate_destination() {
        let tree: Tree = "NRNLNRNRN".parse().unwrap();
        let mut plan = plan(tree, None, &SequenceOptions::default()).unwrap();
        let dup = plan.copies[0].clone();
        plan.copies.push(dup);
        assert!(matches!(
            plan.validate(),
            Err(BuildError::IncompletePlan { index: 0, .. })
        ));
    }

    #[test]
    fn prepare_is_reproducible_from_seed() {
        let cfg = GameConfig {
            length: 31,
            ..GameConfig::default()
        };
        let a = PageBuilder::new(cfg.clone()).seed(5).prepare().unwrap();
        let b = PageBuilder::new(cfg).seed(5).prepare().unwrap();
        assert_eq!(a.tree, b.tree);
        assert_eq!(a.seed, Some(5));
        assert_eq!(a.sequence.len(), 30);
    }

    #[test]
    fn prepare_rejects_invalid_length() {
        let cfg = GameConfig {
            length: 4,
            ..GameConfig::default()
        };
        let err = PageBuilder::new(cfg).seed(1).prepare().unwrap_err();
        assert!(matches!(err, BuildError::Tree(TreeError::InvalidLength(4))));
    }

    #[test]
    fn prepare_rejects_malformed_supplied_tree() {
        let tree: Tree = "NNNRN".parse().unwrap();
        let err = PageBuilder::new(GameConfig::default())
            .tree(tree)
            .prepare()
            .unwrap_err();
        assert!(matches!(err, BuildError::Tree(TreeError::Invariant { index: 1, .. })));
    }

    #[test]
    fn build_with_records_one_copy_per_step() {
        let mut store = RecordingStore::default();
        let tree: Tree = "NRNLNRNRN".parse().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cfg = GameConfig {
            output_file: dir.path().join("index.html"),
            ..GameConfig::default()
        };

        let report = PageBuilder::new(cfg)
            .tree(tree)
            .build_with(&mut store, &CountingRenderer)
            .unwrap();

        assert_eq!(store.resets, 1);
        assert_eq!(report.steps, 8);
        assert_eq!(store.copies.len(), 8);
        assert_eq!(store.copies[1], ("RNL".to_string(), "RNL_1".to_string()));
        let page = std::fs::read_to_string(&report.output).unwrap();
        assert_eq!(page, "8 steps, win VICTORY_R");
    }

    #[test]
    fn skipped_positions_get_no_copy() {
        let tree: Tree = "NNNRN".parse().unwrap();
        let plan = plan(
            tree,
            None,
            &SequenceOptions {
                on_unmatched: UnmatchedPolicy::Skip,
                ..SequenceOptions::default()
            },
        )
        .unwrap();
        plan.validate().unwrap();

        let mut store = RecordingStore::default();
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget {
            template_name: "game.html".to_string(),
            output_file: dir.path().join("index.html"),
            frames_dir: "frames".to_string(),
            copies_dir: "copies".to_string(),
        };
        execute(&plan, &mut store, &CountingRenderer, &target).unwrap();

        let dests: Vec<&str> = store.copies.iter().map(|(_, d)| d.as_str()).collect();
        assert_eq!(dests, vec!["NRN_2", "RNL_3"]);
    }

    #[test]
    fn failed_render_publishes_nothing() {
        struct FailingRenderer;
        impl TemplateRenderer for FailingRenderer {
            fn render(&self, _name: &str, _context: &PageContext) -> Result<String, RenderError> {
                Err(RenderError::MissingTemplate {
                    path: PathBuf::from("templates/game.html"),
                })
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("index.html");
        let tree: Tree = "NLNRN".parse().unwrap();
        let plan = plan(tree, None, &SequenceOptions::default()).unwrap();
        let target = OutputTarget {
            template_name: "game.html".to_string(),
            output_file: output.clone(),
            frames_dir: "frames".to_string(),
            copies_dir: "copies".to_string(),
        };

        let mut store = RecordingStore::default();
        let err = execute(&plan, &mut store, &FailingRenderer, &target).unwrap_err();
        assert!(matches!(err, BuildError::Render(RenderError::MissingTemplate { .. })));
        assert!(!output.exists());
    }
}
