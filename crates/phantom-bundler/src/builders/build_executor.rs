//! Build execution.
//!
//! All entries share one Rolldown invocation: ES modules for Node, with the
//! aggregation module and the externals resolver registered in phase order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use phantom_config::BuildConfig;
use rolldown::{
    BundleOutput, BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem,
    OutputFormat, Platform, ResolveOptions,
};
use rolldown_common::{Output, OutputChunk};
use tracing::{debug, info};

use crate::classify::DependencyClassifier;
use crate::entry::EntryMap;
use crate::output::writer::write_bundle_to;
use crate::plugins::{ExternalsPlugin, PluginAggregatePlugin, PluginRegistry};
use crate::virtual_plugins::VirtualPluginModule;
use crate::{Error, Result};

/// Node.js export conditions, most specific first.
const NODE_CONDITIONS: &[&str] = &["node", "import", "module", "default"];

/// The in-memory result of one build.
pub struct BuildResult {
    pub output: BundleOutput,
    /// Entry names in configured order.
    pub entry_names: Vec<String>,
}

impl std::fmt::Debug for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildResult")
            .field("output", &self.file_names())
            .field("entry_names", &self.entry_names)
            .finish()
    }
}

impl BuildResult {
    pub fn chunks(&self) -> impl Iterator<Item = &OutputChunk> {
        self.output.assets.iter().filter_map(|output| match output {
            Output::Chunk(chunk) => Some(chunk.as_ref()),
            Output::Asset(_) => None,
        })
    }

    /// The entry chunk produced for `name`, written as `<name>.js`.
    pub fn entry_chunk(&self, name: &str) -> Option<&OutputChunk> {
        let file_name = format!("{}.js", name);
        self.chunks()
            .find(|chunk| chunk.is_entry && chunk.filename.as_str() == file_name)
    }

    /// Output file names, as written relative to the output directory.
    pub fn file_names(&self) -> Vec<String> {
        self.output
            .assets
            .iter()
            .map(|output| match output {
                Output::Chunk(chunk) => chunk.filename.to_string(),
                Output::Asset(asset) => asset.filename.to_string(),
            })
            .collect()
    }

    /// Write every output file into `dir`, returning the written paths.
    pub fn write_to(&self, dir: impl AsRef<Path>, overwrite: bool) -> Result<Vec<PathBuf>> {
        write_bundle_to(&self.output, dir.as_ref(), overwrite)
    }
}

/// Bundle every entry in `entries` in one pass.
pub async fn build(
    config: &BuildConfig,
    entries: &EntryMap,
    virtual_module: Arc<VirtualPluginModule>,
    classifier: Arc<DependencyClassifier>,
) -> Result<BuildResult> {
    if entries.is_empty() {
        return Err(Error::NoValidEntries {
            missing: Vec::new(),
        });
    }

    let input = entries
        .iter()
        .map(|(name, path)| InputItem {
            name: Some(name.clone()),
            import: path.to_string_lossy().into_owned(),
        })
        .collect();

    let options = BundlerOptions {
        input: Some(input),
        cwd: Some(config.root.clone()),
        format: Some(OutputFormat::Esm),
        platform: Some(Platform::Node),
        resolve: Some(configure_resolution()),
        ..Default::default()
    };

    // Virtual (0) → Resolve (10)
    let mut registry = PluginRegistry::new();
    registry.add(PluginAggregatePlugin::new(virtual_module));
    registry.add(ExternalsPlugin::new(classifier, config.bundle_mode));

    info!(
        entries = entries.len(),
        mode = %config.bundle_mode,
        "Bundling automation scripts"
    );

    let mut bundler = RolldownBundlerBuilder::default()
        .with_options(options)
        .with_plugins(registry.into_rolldown_plugins())
        .build()
        .map_err(|e| Error::from_rolldown_batch(&e))?;

    let output = bundler
        .generate()
        .await
        .map_err(|e| Error::from_rolldown_batch(&e))?;

    for warning in &output.warnings {
        debug!("Bundler warning: {:?}", warning);
    }

    Ok(BuildResult {
        output,
        entry_names: entries.keys().cloned().collect(),
    })
}

fn configure_resolution() -> ResolveOptions {
    ResolveOptions {
        main_fields: Some(vec!["module".to_string(), "main".to_string()]),
        condition_names: Some(NODE_CONDITIONS.iter().map(|c| c.to_string()).collect()),
        extensions: Some(vec![
            ".ts".to_string(),
            ".mts".to_string(),
            ".js".to_string(),
            ".mjs".to_string(),
            ".cjs".to_string(),
            ".json".to_string(),
        ]),
        symlinks: Some(true),
        ..Default::default()
    }
}
