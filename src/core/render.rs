/// Page rendering — turns a built sequence into the game page markup.

use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::sequence::Sequence;
use crate::schema::symbol::Side;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("missing template: {}", path.display())]
    MissingTemplate { path: PathBuf },
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Victory animation for the branch the player clears last.
pub fn victory_asset(side: Side) -> &'static str {
    match side {
        Side::L => "VICTORY_L",
        Side::R => "VICTORY_R",
    }
}

/// Everything the page template sees.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    /// `[[correct, success_asset], [wrong, failure_asset]]` per step, in order.
    pub sequence: Vec<[[&'static str; 2]; 2]>,
    /// Tree index of each entry in `sequence`; matches the copy suffix.
    pub indices: Vec<usize>,
    pub length: usize,
    pub victory_asset: &'static str,
    /// Page-relative folder of shared frames (failure and victory animations).
    pub frames_dir: String,
    /// Page-relative folder of numbered success copies.
    pub copies_dir: String,
}

impl PageContext {
    pub fn new(
        sequence: &Sequence,
        tree_length: usize,
        victory: Side,
        frames_dir: impl Into<String>,
        copies_dir: impl Into<String>,
    ) -> Self {
        Self {
            sequence: sequence.steps.iter().map(|s| s.to_pairs()).collect(),
            indices: sequence.steps.iter().map(|s| s.index).collect(),
            length: tree_length,
            victory_asset: victory_asset(victory),
            frames_dir: frames_dir.into(),
            copies_dir: copies_dir.into(),
        }
    }
}

/// Renders a named template against a page context.
pub trait TemplateRenderer {
    fn render(&self, template_name: &str, context: &PageContext) -> Result<String, RenderError>;
}

/// Jinja templates loaded from a directory.
#[derive(Debug, Clone)]
pub struct JinjaRenderer {
    template_dir: PathBuf,
}

impl JinjaRenderer {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
        }
    }

    fn load_source(&self, template_name: &str) -> Result<String, RenderError> {
        let path = self.template_dir.join(template_name);
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                RenderError::MissingTemplate { path }
            } else {
                RenderError::Io { path, source }
            }
        })
    }
}

impl TemplateRenderer for JinjaRenderer {
    fn render(&self, template_name: &str, context: &PageContext) -> Result<String, RenderError> {
        let source = self.load_source(template_name)?;
        let mut env = Environment::new();
        // image paths must keep their `/`
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template(template_name, &source)?;
        let tmpl = env.get_template(template_name)?;
        Ok(tmpl.render(context)?)
    }
}
