//! `phantom script`: generate the runner script for the configured engine.

use phantom_runtime::render_runner;

use crate::cli::ScriptArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Execute the script command.
///
/// Prints the script to stdout, or writes it into `--out-dir` relative to the
/// project root.
pub async fn execute(args: ScriptArgs) -> Result<()> {
    let root = utils::project_root(args.cwd.as_deref())?;
    let mut loaded = phantom_config::load(args.config.as_deref(), &root);
    utils::report_config_warnings(&loaded);

    if let Some(engine) = &args.engine {
        loaded.config.engine = engine.clone();
    }
    if args.headed {
        loaded.config.headless = false;
    }

    let script = render_runner(&loaded.config, &args.url, Some("script"))?;
    if !script.engine.runs_plugins() && !loaded.config.plugins.is_empty() {
        ui::warning(&format!(
            "The {} runner does not run plugins; {} configured plugin(s) ignored",
            script.engine,
            loaded.config.plugins.len()
        ));
    }

    match &args.out_dir {
        Some(dir) => {
            let path = script.write_to(&root.join(dir))?;
            ui::success(&format!("Wrote {} runner to {}", script.engine, path.display()));
        }
        None => print!("{}", script.source),
    }
    Ok(())
}
