//! Runner scripts for the automation engines.
//!
//! A runner launches the browser with the configured headless mode and
//! viewport, visits one URL and calls the plugin hooks around that visit in
//! lifecycle order: `onStart(context)`, `onPageLoad(page)`, then `onExit()`
//! even if the visit failed. Plugins that fail to import or whose hooks
//! throw are reported and skipped, like [`Session`](crate::Session) does.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use phantom_config::BuildConfig;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::plugin::Hook;

/// Engines a runner can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    Puppeteer,
    Playwright,
    Selenium,
}

impl Engine {
    pub const ALL: [Engine; 3] = [Engine::Puppeteer, Engine::Playwright, Engine::Selenium];

    pub fn name(&self) -> &'static str {
        match self {
            Engine::Puppeteer => "puppeteer",
            Engine::Playwright => "playwright",
            Engine::Selenium => "selenium",
        }
    }

    /// File name the runner is written under.
    pub fn runner_file_name(&self) -> &'static str {
        match self {
            Engine::Puppeteer => "puppeteer-runner.mjs",
            Engine::Playwright => "playwright-runner.mjs",
            Engine::Selenium => "selenium-runner.py",
        }
    }

    /// Whether the runner executes JavaScript plugins. The Python runner
    /// cannot.
    pub fn runs_plugins(&self) -> bool {
        !matches!(self, Engine::Selenium)
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Engine {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "puppeteer" => Ok(Engine::Puppeteer),
            "playwright" => Ok(Engine::Playwright),
            "selenium" => Ok(Engine::Selenium),
            other => Err(RunnerError::UnsupportedEngine(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    #[error("unsupported engine '{0}' (expected puppeteer, playwright or selenium)")]
    UnsupportedEngine(String),

    #[error("a target URL is required")]
    MissingUrl,
}

/// A generated runner script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerScript {
    pub engine: Engine,
    pub source: String,
}

impl RunnerScript {
    pub fn file_name(&self) -> &'static str {
        self.engine.runner_file_name()
    }

    /// Write the script into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.source)?;
        debug!(engine = %self.engine, path = %path.display(), "Wrote runner script");
        Ok(path)
    }
}

/// Render the runner for `config.engine` visiting `url`.
///
/// `command` ends up in the `onStart` context as `meta.command`.
pub fn render_runner(
    config: &BuildConfig,
    url: &str,
    command: Option<&str>,
) -> Result<RunnerScript, RunnerError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(RunnerError::MissingUrl);
    }
    let engine: Engine = config.engine.parse()?;

    let source = match engine {
        Engine::Puppeteer | Engine::Playwright => {
            render_node(engine, config, url, command.unwrap_or("run"))
        }
        Engine::Selenium => {
            if !config.plugins.is_empty() {
                warn!(
                    plugins = config.plugins.len(),
                    "The selenium runner does not run plugins"
                );
            }
            render_selenium(config, url)
        }
    };

    Ok(RunnerScript { engine, source })
}

fn quoted(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

fn render_node(engine: Engine, config: &BuildConfig, url: &str, command: &str) -> String {
    let plugin_paths = Value::from(config.plugin_import_paths()).to_string();
    let context = json!({
        "engine": engine.name(),
        "meta": { "command": command, "url": url },
    });
    let width = config.viewport.width;
    let height = config.viewport.height;

    let (import, launch) = match engine {
        Engine::Playwright => (
            r#"import { chromium } from "playwright";"#.to_string(),
            format!(
                "const browser = await chromium.launch({{ headless: {headless} }});\n\
                 const browserContext = await browser.newContext({{ viewport: {{ width: {width}, height: {height} }} }});\n\
                 const page = await browserContext.newPage();",
                headless = config.headless,
            ),
        ),
        _ => (
            r#"import puppeteer from "puppeteer";"#.to_string(),
            format!(
                "const browser = await puppeteer.launch({{ headless: {headless} }});\n\
                 const page = await browser.newPage();\n\
                 await page.setViewport({{ width: {width}, height: {height} }});",
                headless = config.headless,
            ),
        ),
    };

    format!(
        r#"{import}

const pluginPaths = {plugin_paths};
const plugins = [];
for (const path of pluginPaths) {{
  try {{
    plugins.push(await import(path));
  }} catch (e) {{
    console.error("[phantom] Failed to load plugin:", path, e);
  }}
}}

async function runHook(hook, ...args) {{
  for (const plugin of plugins) {{
    if (typeof plugin[hook] !== "function") continue;
    try {{
      await plugin[hook](...args);
    }} catch (e) {{
      console.error(`[phantom] ${{hook}} failed:`, e);
    }}
  }}
}}

await runHook("{on_start}", {context});

{launch}
try {{
  await page.goto({url});
  await runHook("{on_page_load}", page);
  console.log("[phantom] Title:", await page.title());
}} finally {{
  await browser.close();
  await runHook("{on_exit}");
}}
"#,
        on_start = Hook::Start.export_name(),
        on_page_load = Hook::PageLoad.export_name(),
        on_exit = Hook::Exit.export_name(),
        url = quoted(url),
    )
}

fn render_selenium(config: &BuildConfig, url: &str) -> String {
    let headless = if config.headless {
        "options.add_argument(\"--headless=new\")\n"
    } else {
        ""
    };
    format!(
        r#"from selenium import webdriver
from selenium.webdriver.chrome.options import Options

options = Options()
{headless}options.add_argument("--window-size={width},{height}")
driver = webdriver.Chrome(options=options)
try:
    driver.get({url})
    print("[phantom] Title:", driver.title)
finally:
    driver.quit()
"#,
        width = config.viewport.width,
        height = config.viewport.height,
        url = quoted(url),
    )
}
