//! End-to-end reconstruction on the real filesystem.

#![allow(clippy::disallowed_methods)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use unbundle::{Bundle, HttpFetcher, ModuleId, NativeRuntime, Options};

/// Webpack bundle whose table entries carry their require-string lookups.
const BUNDLE: &str = r#"(function (modules) {
    var cache = {};
    function req(id) {
        if (cache[id]) return cache[id].exports;
        var mod = cache[id] = { exports: {} };
        modules[id][0].call(mod.exports, mod, mod.exports, req);
        return mod.exports;
    }
    return req(req.s = 1);
})({
    1: [function (m, e, r) {
        var util = r("./lib/util");
        var React = r("react");
        m.exports = util(React);
    }, { "./lib/util": 2, "react": 3 }],
    2: [function (m, e, r) {
        var helpers = r("./helpers");
        m.exports = function (x) { return helpers(x); };
    }, { "./helpers": 4 }],
    3: [function (m, e, r) {
        e.dom = r("./lib/dom");
    }, { "./lib/dom": 5 }],
    4: [function (m, e, r) { m.exports = function (x) { return x; }; }, {}],
    5: [function (m, e, r) { e.render = function () {}; }, {}]
});
"#;

fn read(path: std::path::PathBuf) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn reconstructs_a_project_tree() {
    let temp = TempDir::new().unwrap();
    let bundle_path = temp.path().join("main.js");
    std::fs::write(&bundle_path, BUNDLE).unwrap();
    let dist = temp.path().join("dist");

    let options = Options {
        dist_path: dist.clone(),
        ..Options::default()
    };
    let mut bundle = Bundle::open(
        &bundle_path,
        Arc::new(NativeRuntime::new()),
        Arc::new(HttpFetcher::new()),
        options,
    )
    .await
    .unwrap();

    bundle.parse().await.unwrap();
    assert_eq!(bundle.entry(), ModuleId::Index(1));
    assert!(bundle.resolve_paths().unwrap().is_empty());

    let report = bundle.write_all().await.unwrap();
    assert_eq!(report.files.len(), 5);

    let index = read(dist.join("index.js"));
    assert!(index.contains(r#"var util = require("./lib/util");"#));
    assert!(index.contains(r#"var React = require("react");"#));
    assert!(index.contains("module.exports = util(React);"));

    let util = read(dist.join("lib/util.js"));
    assert!(util.contains(r#"require("./helpers")"#));
    assert!(dist.join("lib/helpers.js").exists());

    let react = read(dist.join("node_modules/react/index.js"));
    assert_eq!(react, r#"exports.dom = require("./lib/dom");"#);
    assert!(dist.join("node_modules/react/lib/dom.js").exists());

    assert!(temp.path().join("main.js.info.json").exists());
}
