#[cfg(test)]
mod tests {
    use crate::cli::Cli;
    use crate::cli::validation::{is_package_name, parse_assignment, parse_module_id};
    use clap::Parser;
    use std::path::PathBuf;
    use unbundle::ModuleId;

    #[test]
    fn module_ids() {
        assert_eq!(parse_module_id("12"), Ok(ModuleId::Index(12)));
        assert_eq!(parse_module_id("abc1"), Ok(ModuleId::Name("abc1".into())));
        assert!(parse_module_id("  ").is_err());
    }

    #[test]
    fn assignments() {
        assert_eq!(
            parse_assignment("4=./lib/util"),
            Ok((ModuleId::Index(4), "./lib/util".to_string()))
        );
        assert_eq!(
            parse_assignment("./src/a.js=./src/b"),
            Ok((ModuleId::Name("./src/a.js".into()), "./src/b".to_string()))
        );
        assert!(parse_assignment("4").is_err());
        assert!(parse_assignment("4=").is_err());
    }

    #[test]
    fn package_names() {
        assert!(is_package_name("react"));
        assert!(is_package_name("lodash.debounce"));
        assert!(is_package_name("@babel/runtime"));
        assert!(!is_package_name("@babel"));
        assert!(!is_package_name("../escape"));
        assert!(!is_package_name("has space"));
        assert!(!is_package_name(""));
    }

    #[test]
    fn minimal_invocation() {
        let cli = Cli::try_parse_from(["unbundle", "build/app.js"]).unwrap();
        assert_eq!(cli.unbundle.bundle, PathBuf::from("build/app.js"));
        assert!(cli.unbundle.dist.is_none());
        assert!(!cli.unbundle.dry_run);
        assert!(!cli.verbose);
    }

    #[test]
    fn repeatable_overrides() {
        let cli = Cli::try_parse_from([
            "unbundle",
            "app.js",
            "--known-path",
            "1=./index",
            "--known-path",
            "2=./lib/two",
            "--package",
            "3=react",
            "--entry",
            "1",
            "--dist",
            "out",
            "--keep-closure",
            "--dry-run",
        ])
        .unwrap();

        let args = cli.unbundle;
        assert_eq!(args.known_paths.len(), 2);
        assert_eq!(args.packages, vec![(ModuleId::Index(3), "react".to_string())]);
        assert_eq!(args.entry, Some(ModuleId::Index(1)));
        assert_eq!(args.dist, Some(PathBuf::from("out")));
        assert!(args.keep_closure);
        assert!(args.dry_run);
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["unbundle", "app.js", "-v", "-q"]).is_err());
    }

    #[test]
    fn bundle_is_required() {
        assert!(Cli::try_parse_from(["unbundle"]).is_err());
    }
}
