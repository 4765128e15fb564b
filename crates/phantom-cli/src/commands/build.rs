//! `phantom build`: bundle every configured entry into the output directory.

use std::sync::Arc;
use std::time::Instant;

use phantom_bundler::{DependencyClassifier, VirtualPluginModule, resolve_entries};
use phantom_config::BuildConfig;
use tracing::debug;

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Execute the build command.
///
/// Precedence for every setting is flags > `PHANTOM_*` environment >
/// configuration file > defaults. Missing entries and an unusable plugin list
/// are warnings; an empty entry set, a bundler failure or a write failure
/// abort the build.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    let root = utils::project_root(args.cwd.as_deref())?;
    ui::info("Loading configuration...");
    let mut loaded = phantom_config::load(args.config.as_deref(), &root);
    utils::report_config_warnings(&loaded);
    loaded.config = apply_flags(loaded.config, &args);
    let config = &loaded.config;

    let resolution = resolve_entries(config)?;
    for missing in &resolution.missing {
        ui::warning(&format!("Entry not found, skipping: {}", missing.display()));
    }

    let virtual_module = Arc::new(VirtualPluginModule::from_config(&loaded));
    if let Some(reason) = virtual_module.degradation() {
        ui::warning(&format!("Bundling without plugins: {}", reason));
    }
    let classifier = Arc::new(DependencyClassifier::from_config(config));

    ui::info(&format!(
        "Bundling {} entr{} with {} plugin(s) ({})",
        resolution.entries.len(),
        if resolution.entries.len() == 1 { "y" } else { "ies" },
        virtual_module.plugin_count(),
        config.bundle_mode
    ));

    let result = phantom_bundler::build(config, &resolution.entries, virtual_module, classifier).await?;
    if !result.output.warnings.is_empty() {
        debug!(count = result.output.warnings.len(), "Bundler reported warnings");
    }

    let out_dir = config.resolved_out_dir();
    let written = result.write_to(&out_dir, !args.no_overwrite)?;

    let mut files = Vec::with_capacity(written.len());
    for path in &written {
        let size = std::fs::metadata(path)?.len();
        let name = path
            .strip_prefix(&out_dir)
            .unwrap_or(path)
            .display()
            .to_string();
        files.push((name, size));
    }
    ui::print_build_summary(&files, start_time.elapsed());

    ui::success(&format!("Wrote {} file(s) to {}", written.len(), out_dir.display()));
    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_flags(mut config: BuildConfig, args: &BuildArgs) -> BuildConfig {
    if let Some(mode) = args.bundle_mode {
        config = config.with_bundle_mode(mode.into());
    }
    if let Some(out_dir) = &args.out_dir {
        config = config.with_out_dir(out_dir);
    }
    config
}
