//! End-to-end builds through Rolldown.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use phantom_bundler::{DependencyClassifier, VirtualPluginModule, build, resolve_entries};
use phantom_config::{BundleMode, PluginListStatus, load};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn project(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "phantomvite.config.json", config);
    write(
        dir.path(),
        "plugins/logger.js",
        "export function onStart(context) {\n  console.log('logger-start', context && context.engine);\n}\n",
    );
    write(
        dir.path(),
        "scripts/login.ts",
        r#"import { readFileSync } from "fs";
import { plugins } from "virtual:phantom-plugins";

const title: string = "login-script";
for (const plugin of plugins) {
  plugin.onStart?.({ engine: "puppeteer", meta: {} });
}
console.log(title, readFileSync);
"#,
    );
    dir
}

#[tokio::test]
async fn bundles_entries_with_plugins_and_builtins_external() {
    let dir = project(r#"{ "entry": "scripts/login.ts", "plugins": ["./plugins/logger.js"] }"#);
    let loaded = load(None, dir.path());
    assert_eq!(loaded.plugins, PluginListStatus::Declared);

    let resolution = resolve_entries(&loaded.config).unwrap();
    let result = build(
        &loaded.config,
        &resolution.entries,
        Arc::new(VirtualPluginModule::from_config(&loaded)),
        Arc::new(DependencyClassifier::from_config(&loaded.config)),
    )
    .await
    .unwrap();

    let chunk = result.entry_chunk("login").expect("login.js entry chunk");
    assert!(chunk.code.contains("logger-start"), "{}", chunk.code);
    assert!(chunk.code.contains("login-script"), "{}", chunk.code);
    assert!(chunk.code.contains("\"fs\""), "{}", chunk.code);
    assert!(!chunk.code.contains("virtual:phantom-plugins"), "{}", chunk.code);
    assert_eq!(result.entry_names, vec!["login".to_string()]);

    let out = loaded.config.resolved_out_dir();
    result.write_to(&out, true).unwrap();
    assert!(out.join("login.js").is_file());
}

#[tokio::test]
async fn degraded_plugin_module_still_builds() {
    let dir = project(r#"{ "entry": "scripts/login.ts" }"#);
    let loaded = load(None, dir.path());
    assert_eq!(loaded.plugins, PluginListStatus::Absent);

    let resolution = resolve_entries(&loaded.config).unwrap();
    let module = Arc::new(VirtualPluginModule::from_config(&loaded));
    assert!(module.degradation().is_some());

    let result = build(
        &loaded.config,
        &resolution.entries,
        module,
        Arc::new(DependencyClassifier::new()),
    )
    .await
    .unwrap();

    let chunk = result.entry_chunk("login").unwrap();
    assert!(!chunk.code.contains("logger-start"));
}

#[tokio::test]
async fn one_output_file_per_entry() {
    let dir = project(r#"{ "entries": ["scripts/login.ts", "scripts/search.js"], "plugins": [] }"#);
    write(dir.path(), "scripts/search.js", "console.log('search-script');\n");
    let loaded = load(None, dir.path());

    let resolution = resolve_entries(&loaded.config).unwrap();
    let result = build(
        &loaded.config,
        &resolution.entries,
        Arc::new(VirtualPluginModule::from_config(&loaded)),
        Arc::new(DependencyClassifier::new()),
    )
    .await
    .unwrap();

    assert!(result.entry_chunk("login").is_some());
    let search = result.entry_chunk("search").unwrap();
    assert!(search.code.contains("search-script"));
    assert_eq!(result.entry_names, vec!["login".to_string(), "search".to_string()]);
}

#[tokio::test]
async fn drivers_follow_bundle_mode() {
    let dir = project(r#"{ "entry": "scripts/run.js", "plugins": [] }"#);
    write(
        dir.path(),
        "node_modules/puppeteer/package.json",
        r#"{ "name": "puppeteer", "version": "0.0.0", "type": "module", "main": "index.js" }"#,
    );
    write(
        dir.path(),
        "node_modules/puppeteer/index.js",
        "export function launch() { return 'bundled-driver'; }\n",
    );
    write(
        dir.path(),
        "scripts/run.js",
        "import { launch } from 'puppeteer';\nconsole.log(launch());\n",
    );

    let loaded = load(None, dir.path());
    let resolution = resolve_entries(&loaded.config).unwrap();

    let external = loaded.config.clone().with_bundle_mode(BundleMode::ExternalizeDrivers);
    let result = build(
        &external,
        &resolution.entries,
        Arc::new(VirtualPluginModule::from_config(&loaded)),
        Arc::new(DependencyClassifier::new()),
    )
    .await
    .unwrap();
    let chunk = result.entry_chunk("run").unwrap();
    assert!(chunk.code.contains("puppeteer"), "{}", chunk.code);
    assert!(!chunk.code.contains("bundled-driver"));

    let bundled = loaded.config.clone().with_bundle_mode(BundleMode::BundleEverything);
    let result = build(
        &bundled,
        &resolution.entries,
        Arc::new(VirtualPluginModule::from_config(&loaded)),
        Arc::new(DependencyClassifier::new()),
    )
    .await
    .unwrap();
    let chunk = result.entry_chunk("run").unwrap();
    assert!(chunk.code.contains("bundled-driver"), "{}", chunk.code);
}
