//! `phantom check`: validate configuration and environment without building.

use phantom_bundler::{VirtualPluginModule, resolve_entries};
use phantom_config::PluginListStatus;
use phantom_runtime::{PluginLoader, PluginSource};

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the check command.
///
/// Reports, in order: configuration warnings, entry resolution, each
/// configured plugin and where it comes from, and which automation engines
/// are installed. Fails when no entry resolves or a plugin file is
/// missing; everything else is a warning.
pub async fn execute(args: CheckArgs) -> Result<()> {
    let root = utils::project_root(args.cwd.as_deref())?;

    ui::info("Checking configuration...");
    let loaded = phantom_config::load(args.config.as_deref(), &root);
    if loaded.warnings.is_empty() {
        ui::success(&format!("Configuration is valid: {}", loaded.source.display()));
    } else {
        utils::report_config_warnings(&loaded);
    }
    let config = &loaded.config;
    let mut problems = 0usize;

    ui::info("Checking entry points...");
    let resolution = resolve_entries(config)?;
    for (name, path) in &resolution.entries {
        ui::success(&format!("  {} -> {}", name, path.display()));
    }
    for missing in &resolution.missing {
        ui::warning(&format!("  missing, will be skipped: {}", missing.display()));
    }

    ui::info("Checking plugins...");
    match &loaded.plugins {
        PluginListStatus::Declared if config.plugins.is_empty() => {
            ui::info("  plugin list is empty");
        }
        PluginListStatus::Declared => {
            let loader = PluginLoader::with_builtins(&root);
            for descriptor in &config.plugins {
                match loader.inspect(descriptor) {
                    PluginSource::Registered(name) => {
                        ui::success(&format!("  {} (built-in '{}')", descriptor.specifier, name));
                    }
                    PluginSource::File(path) => {
                        ui::success(&format!("  {} -> {}", descriptor.specifier, path.display()));
                    }
                    PluginSource::MissingFile(path) => {
                        problems += 1;
                        ui::error(&format!(
                            "  {}: file not found at {}",
                            descriptor.specifier,
                            path.display()
                        ));
                    }
                    PluginSource::Package(name) => {
                        if utils::package_installed(&root, &name) {
                            ui::success(&format!("  {} (package)", name));
                        } else {
                            ui::warning(&format!("  {}: package not installed", name));
                        }
                    }
                }
            }
        }
        PluginListStatus::Absent => ui::warning("  no \"plugins\" key; plugins will be empty"),
        PluginListStatus::Unreadable(reason) => {
            ui::warning(&format!("  plugin list unreadable ({}); plugins will be empty", reason));
        }
    }

    ui::info("Checking automation engines...");
    for status in utils::engine_statuses(&root) {
        let configured = status.name == config.engine;
        let marker = if configured { " (configured)" } else { "" };
        match (&status.location, configured) {
            (Some(location), _) => ui::success(&format!(
                "  {} is installed at {}{}",
                status.name, location, marker
            )),
            (None, true) => ui::warning(&format!(
                "  {} is not installed{}. {}",
                status.name, marker, status.hint
            )),
            (None, false) => {
                ui::info(&format!("  {} is not installed. {}", status.name, status.hint))
            }
        }
    }
    if !utils::KNOWN_ENGINES.contains(&config.engine.as_str()) {
        ui::warning(&format!(
            "  configured engine '{}' is not a known engine",
            config.engine
        ));
    }

    if args.print_virtual {
        let module = VirtualPluginModule::from_config(&loaded);
        print!("{}", module.record().source);
    }

    if problems > 0 {
        return Err(CliError::CheckFailed(format!("{} problem(s) found", problems)));
    }
    ui::success("All checks passed");
    Ok(())
}
