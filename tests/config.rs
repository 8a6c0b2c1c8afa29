// ABOUTME: Integration tests for manifest parsing and resolution.
// ABOUTME: Tests YAML parsing, parameter key resolution, seeds and environment merging.

use stackplan::config::*;
use stackplan::error::Error;
use stackplan::types::ParameterName;
use std::time::Duration;
use tempfile::TempDir;

fn name(value: &str) -> ParameterName {
    ParameterName::new(value).unwrap()
}

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = r#"
stacks:
  - ecr
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.stacks.len(), 1);
        assert_eq!(config.stacks.head.name.as_str(), "ecr");
        assert!(config.topology.is_none());
        assert!(config.provisioner.is_none());
    }

    #[test]
    fn empty_stack_list_is_rejected() {
        let err = Config::from_yaml("stacks: []\n").unwrap_err();
        assert!(err.to_string().contains("at least one stack is required"));
    }

    #[test]
    fn invalid_stack_name_is_rejected() {
        assert!(Config::from_yaml("stacks:\n  - name: 9lives\n").is_err());
    }

    #[test]
    fn parse_provisioner_timeout() {
        let yaml = r#"
stacks: [ecr]
provisioner:
  command: ["./provision.sh", "--apply"]
  timeout: 90s
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let provisioner = config.provisioner.unwrap();
        assert_eq!(provisioner.command, vec!["./provision.sh", "--apply"]);
        assert_eq!(provisioner.timeout, Duration::from_secs(90));
    }

    #[test]
    fn template_parses() {
        let config = Config::template().unwrap();
        assert_eq!(config.stacks.len(), 5);
        assert!(config.topology.is_some());
        assert!(config.pipeline.is_some());
        assert_eq!(config.externals.len(), 4);
    }
}

mod parameters {
    use super::*;

    #[test]
    fn keys_resolve_against_namespace() {
        let config = Config::from_yaml("namespace: /prod/api\nstacks: [ecr]\n").unwrap();
        assert_eq!(config.parameter_name("albArn").unwrap(), name("/prod/api/albArn"));
        assert_eq!(config.parameter_name("/shared/zone").unwrap(), name("/shared/zone"));
    }

    #[test]
    fn parameters_table_wins() {
        let yaml = r#"
parameters:
  hostedZoneId: /dns/zoneId
stacks:
  - name: a-record
    reads: [hostedZoneId]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let descriptors = config.descriptors().unwrap();
        assert!(descriptors[0].reads.contains(&name("/dns/zoneId")));
    }

    #[test]
    fn invalid_key_is_reported() {
        let config = Config::from_yaml("stacks: [ecr]\n").unwrap();
        let err = config.parameter_name("alb arn").unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref key, .. } if key == "alb arn"));
    }

    #[test]
    fn repeated_read_is_rejected() {
        let yaml = r#"
stacks:
  - name: a-record
    reads: [albArn, /api/albArn]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let err = config.descriptors().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn external_seeds_resolve_literals_and_env() {
        let yaml = r#"
externals:
  hostedZoneId: Z0123
  aRecordName:
    env: STACKPLAN_TEST_RECORD
  hostedZoneName:
    env: STACKPLAN_TEST_MISSING_ZONE
    default: example.com
  certificateDomainName:
stacks: [ecr]
"#;
        let config = Config::from_yaml(yaml).unwrap();

        temp_env::with_var("STACKPLAN_TEST_RECORD", Some("api.example.com"), || {
            let seeds = config.external_seeds().unwrap();
            assert_eq!(
                seeds,
                vec![
                    (name("/api/aRecordName"), "api.example.com".to_string()),
                    (name("/api/hostedZoneId"), "Z0123".to_string()),
                    (name("/api/hostedZoneName"), "example.com".to_string()),
                ]
            );
        });
        assert_eq!(config.external_parameters().unwrap().len(), 4);
    }

    #[test]
    fn missing_seed_variable_is_an_error() {
        let yaml = r#"
externals:
  aRecordName:
    env: STACKPLAN_TEST_UNSET_RECORD
stacks: [ecr]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        temp_env::with_var_unset("STACKPLAN_TEST_UNSET_RECORD", || {
            let err = config.external_seeds().unwrap_err();
            assert!(matches!(err, Error::MissingEnvVar(ref v) if v == "STACKPLAN_TEST_UNSET_RECORD"));
        });
    }
}

mod environments {
    use super::*;

    const YAML: &str = r#"
region: eu-west-1
externals:
  hostedZoneId: Z-PROD
stacks: [ecr]
environments:
  staging:
    region: us-east-1
    account: "123456789012"
    externals:
      hostedZoneId: Z-STAGING
    store:
      path: .stackplan/staging.json
"#;

    #[test]
    fn environment_overrides_region_account_externals_and_store() {
        let config = Config::from_yaml(YAML).unwrap();
        let staging = config.for_environment("staging").unwrap();

        assert_eq!(staging.region, "us-east-1");
        assert_eq!(staging.account.as_deref(), Some("123456789012"));
        assert_eq!(
            staging.externals["hostedZoneId"],
            Some(SeedValue::Literal("Z-STAGING".to_string()))
        );
        assert!(staging.store.path.ends_with("staging.json"));
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn unknown_environment_is_an_error() {
        let config = Config::from_yaml(YAML).unwrap();
        assert!(matches!(
            config.for_environment("prod"),
            Err(Error::UnknownEnvironment(ref e)) if e == "prod"
        ));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn finds_manifest_in_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME_ALT), "stacks: [ecr]\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.stacks.head.name.as_str(), "ecr");
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::discover(dir.path()),
            Err(Error::ConfigNotFound(_))
        ));
    }

    #[test]
    fn store_path_is_relative_to_project() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_yaml("stacks: [ecr]\n").unwrap();
        assert_eq!(
            config.store_path(dir.path()),
            dir.path().join(".stackplan/parameters.json")
        );
    }
}

mod init {
    use super::*;

    #[test]
    fn writes_template_with_options() {
        let dir = TempDir::new().unwrap();
        let options = InitOptions {
            namespace: "/shop".to_string(),
            region: "us-west-2".to_string(),
            force: false,
        };
        init_config(dir.path(), &options).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.namespace, "/shop");
        assert_eq!(config.region, "us-west-2");
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        init_config(dir.path(), &InitOptions::default()).unwrap();

        let err = init_config(dir.path(), &InitOptions::default()).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        let forced = InitOptions {
            force: true,
            ..InitOptions::default()
        };
        init_config(dir.path(), &forced).unwrap();
    }

    #[test]
    fn rejects_bad_namespace() {
        let dir = TempDir::new().unwrap();
        let options = InitOptions {
            namespace: "api".to_string(),
            ..InitOptions::default()
        };
        assert!(matches!(
            init_config(dir.path(), &options),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
