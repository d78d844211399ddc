use std::path::Path;
use std::sync::Arc;

use crate::bundle::Bundle;
use crate::options::Options;
use crate::test_utils::{StaticFetcher, TestRuntime};


/// Minified webpack 4 style bundle with an object module table.
///
/// Every closure is `function(e, t, n) { <body> }`, so `n` is `require`, `e` is `module` and
/// `t` is `exports`.
fn webpack_bundle(modules: &[(u64, &str)], entry: u64) -> String {
    let table: Vec<String> = modules
        .iter()
        .map(|(id, body)| format!("{id}:function(e,t,n){{{body}}}"))
        .collect();
    format!(
        "!function(e){{var t={{}};function n(r){{if(t[r])return t[r].exports;\
         var o=t[r]={{i:r,l:!1,exports:{{}}}};\
         return e[r].call(o.exports,o,o.exports,n),o.l=!0,o.exports}}\
         n.p=\"/assets/\";n(n.s={entry})}}({{{}}});\n",
        table.join(",")
    )
}

async fn open_with(
    runtime: TestRuntime,
    bundle: &Path,
    fetcher: StaticFetcher,
    options: Options,
) -> Bundle {
    Bundle::open(bundle, Arc::new(runtime), Arc::new(fetcher), options)
        .await
        .unwrap()
}

/// Write `source` as `app.js` in `dir`, open it and parse it.
async fn parsed(dir: &Path, source: &str, options: Options) -> Bundle {
    let runtime = TestRuntime::new(dir.to_path_buf());
    let path = runtime.write("app.js", source);
    let mut bundle = open_with(runtime, &path, StaticFetcher::new(), options).await;
    bundle.parse().await.unwrap();
    bundle
}
