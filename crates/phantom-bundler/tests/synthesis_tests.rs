//! Config file to entry map and aggregation module, without bundling.

use std::fs;

use phantom_bundler::{
    Error, PUBLIC_ID, RESOLVED_ID, VirtualModule, VirtualPluginModule, resolve_entries,
};
use phantom_config::load;
use tempfile::TempDir;

#[test]
fn entries_and_plugins_keep_configured_order() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(
        root.join("phantomvite.config.json"),
        r#"{ "entries": ["a.ts", "b.ts"], "plugins": ["p1.js", "p2.js"] }"#,
    )
    .unwrap();
    fs::write(root.join("a.ts"), "export {};").unwrap();
    fs::write(root.join("b.ts"), "export {};").unwrap();

    let loaded = load(None, root);
    let resolution = resolve_entries(&loaded.config).unwrap();
    let names: Vec<_> = resolution.entries.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(resolution.entries["a"], root.join("a.ts"));
    assert_eq!(resolution.entries["b"], root.join("b.ts"));

    let module = VirtualPluginModule::from_config(&loaded);
    let resolved = module.resolve(PUBLIC_ID).unwrap();
    assert_eq!(resolved, RESOLVED_ID);
    let source = module.load(&resolved).unwrap();

    let p1 = format!(
        "import * as plugin0 from \"{}\";",
        root.join("p1.js").display()
    );
    let p2 = format!(
        "import * as plugin1 from \"{}\";",
        root.join("p2.js").display()
    );
    let first = source.find(&p1).expect("plugin0 import");
    let second = source.find(&p2).expect("plugin1 import");
    assert!(first < second);
    assert!(source.trim_end().ends_with("export const plugins = [plugin0, plugin1];"));
    assert_eq!(module.load(&resolved).unwrap(), source);
}

#[test]
fn missing_only_entry_is_fatal() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("phantomvite.config.json"),
        r#"{ "entry": "missing.ts" }"#,
    )
    .unwrap();

    let loaded = load(None, dir.path());
    match resolve_entries(&loaded.config) {
        Err(Error::NoValidEntries { missing }) => {
            assert_eq!(missing, vec![std::path::PathBuf::from("missing.ts")]);
        }
        other => panic!("expected NoValidEntries, got {other:?}"),
    }
}

#[test]
fn unreadable_config_degrades_to_empty_plugin_list() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("phantomvite.config.json"), "{ not json").unwrap();

    let loaded = load(None, dir.path());
    let module = VirtualPluginModule::from_config(&loaded);
    assert!(module.degradation().is_some());
    assert_eq!(
        module.load(RESOLVED_ID).unwrap(),
        "export const plugins = [];\n"
    );
}
