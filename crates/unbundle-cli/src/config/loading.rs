use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use indexmap::IndexMap;
use serde::Serialize;
use unbundle::Options;

use crate::cli::UnbundleArgs;
use crate::error::{ConfigError, Result};

/// Config file picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "unbundle.config.json";

/// Prefix of the environment variables that map onto options.
pub const ENV_PREFIX: &str = "UNBUNDLE_";

/// Flags that override configured options. Unset flags are left out so lower layers show
/// through.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    dist_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_path_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry_point: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    known_paths: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_closure: Option<bool>,
}

impl From<&UnbundleArgs> for CliOverrides {
    fn from(args: &UnbundleArgs) -> Self {
        Self {
            dist_path: args.dist.clone(),
            public_path_prefix: args.public_path_prefix.clone(),
            entry_point: args.entry.as_ref().map(ToString::to_string),
            known_paths: args
                .known_paths
                .iter()
                .map(|(id, path)| (id.to_string(), path.clone()))
                .collect(),
            keep_closure: args.keep_closure.then_some(true),
        }
    }
}

/// Load options for `args`, looking for the default config file under `cwd`.
pub fn load_options(args: &UnbundleArgs, cwd: &Path) -> Result<Options> {
    let mut figment = Figment::new().merge(Serialized::defaults(Options::default()));

    if let Some(path) = config_file(args.config.as_deref(), cwd)? {
        tracing::debug!(config = %path.display(), "using config file");
        figment = figment.merge(Json::file(path));
    }

    figment = figment
        .merge(env_provider())
        .merge(Serialized::defaults(CliOverrides::from(args)));

    figment.extract().map_err(|e| {
        let field = if e.path.is_empty() {
            "configuration".to_string()
        } else {
            e.path.join(".")
        };
        ConfigError::InvalidValue {
            field,
            value: e.kind.to_string(),
            hint: format!("Check {CONFIG_FILE_NAME} and {ENV_PREFIX}* variables"),
        }
        .into()
    })
}

/// `UNBUNDLE_*` variables with keys renamed to the camelCase option names.
///
/// Keys must not be lowercased after mapping or `publicPathPrefix` would never match.
pub(crate) fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .lowercase(false)
        .map(|key| camel_case(key.as_str()).into())
}

fn config_file(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(ConfigError::NotFound(path.to_path_buf()).into()),
        None => {
            let default = cwd.join(CONFIG_FILE_NAME);
            Ok(default.exists().then_some(default))
        }
    }
}

/// `max_chunk_depth` → `maxChunkDepth`.
pub(crate) fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
