#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use std::path::{Path, PathBuf};

    use figment::Figment;
    use figment::providers::Serialized;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use tempfile::TempDir;
    use unbundle::{ModuleId, Options};

    use crate::cli::UnbundleArgs;
    use crate::config::loading::{camel_case, env_provider};
    use crate::config::{CONFIG_FILE_NAME, load_options};
    use crate::error::{CliError, ConfigError};

    fn args() -> UnbundleArgs {
        UnbundleArgs {
            bundle: PathBuf::from("app.js"),
            ..UnbundleArgs::default()
        }
    }

    fn write_config(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn camel_case_keys() {
        assert_eq!(camel_case("max_chunk_depth"), "maxChunkDepth");
        assert_eq!(camel_case("DIST_PATH"), "distPath");
        assert_eq!(camel_case("entry"), "entry");
    }

    #[test]
    #[serial]
    fn env_keys_become_camel_case() {
        unsafe {
            std::env::set_var("UNBUNDLE_MAX_CHUNK_DEPTH", "7");
            std::env::set_var("UNBUNDLE_PUBLIC_PATH_PREFIX", "https://cdn.example");
        }
        let options: Result<Options, _> = Figment::new()
            .merge(Serialized::defaults(Options::default()))
            .merge(env_provider())
            .extract();
        unsafe {
            std::env::remove_var("UNBUNDLE_MAX_CHUNK_DEPTH");
            std::env::remove_var("UNBUNDLE_PUBLIC_PATH_PREFIX");
        }

        let options = options.unwrap();
        assert_eq!(options.max_chunk_depth, 7);
        assert_eq!(options.public_path_prefix, "https://cdn.example");
    }

    #[test]
    #[serial]
    fn defaults_without_any_layer() {
        let temp = TempDir::new().unwrap();
        let options = load_options(&args(), temp.path()).unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    #[serial]
    fn config_file_in_working_directory() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            r#"{ "distPath": "out", "knownPaths": { "3": "./lib/three" }, "maxChunkDepth": 4 }"#,
        );

        let options = load_options(&args(), temp.path()).unwrap();
        assert_eq!(options.dist_path, PathBuf::from("out"));
        assert_eq!(options.max_chunk_depth, 4);
        assert_eq!(
            options.known_paths.get(&ModuleId::Index(3)).map(String::as_str),
            Some("./lib/three")
        );
        assert_eq!(options.chunk_file_name_suffix, ".bundle.js");
    }

    #[test]
    #[serial]
    fn flags_override_the_config_file() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            r#"{ "distPath": "out", "knownPaths": { "3": "./lib/three" } }"#,
        );

        let mut args = args();
        args.dist = Some(PathBuf::from("elsewhere"));
        args.entry = Some(ModuleId::Index(7));
        args.keep_closure = true;
        args.known_paths = vec![(ModuleId::Index(5), "./five".to_string())];

        let options = load_options(&args, temp.path()).unwrap();
        assert_eq!(options.dist_path, PathBuf::from("elsewhere"));
        assert_eq!(options.entry_point, Some(ModuleId::Index(7)));
        assert!(options.keep_closure);
        assert_eq!(options.known_paths.len(), 2);
    }

    #[test]
    #[serial]
    fn environment_sits_between_file_and_flags() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), r#"{ "publicPathPrefix": "https://file.example" }"#);

        unsafe {
            std::env::set_var("UNBUNDLE_PUBLIC_PATH_PREFIX", "https://env.example");
            std::env::set_var("UNBUNDLE_CHUNK_FILE_NAME_SUFFIX", ".chunk.js");
        }
        let from_env = load_options(&args(), temp.path());

        let mut flagged = args();
        flagged.public_path_prefix = Some("https://flag.example".to_string());
        let from_flag = load_options(&flagged, temp.path());
        unsafe {
            std::env::remove_var("UNBUNDLE_PUBLIC_PATH_PREFIX");
            std::env::remove_var("UNBUNDLE_CHUNK_FILE_NAME_SUFFIX");
        }

        let from_env = from_env.unwrap();
        assert_eq!(from_env.public_path_prefix, "https://env.example");
        assert_eq!(from_env.chunk_file_name_suffix, ".chunk.js");
        assert_eq!(from_flag.unwrap().public_path_prefix, "https://flag.example");
    }

    #[test]
    #[serial]
    fn explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();
        let mut args = args();
        args.config = Some(temp.path().join("missing.json"));

        let err = load_options(&args, temp.path()).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound(_))));
    }

    #[test]
    #[serial]
    fn wrong_types_name_the_field() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), r#"{ "maxChunkDepth": "deep" }"#);

        let err = load_options(&args(), temp.path()).unwrap_err();
        match err {
            CliError::Config(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "maxChunkDepth");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
