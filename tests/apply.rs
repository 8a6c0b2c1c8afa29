// ABOUTME: Integration tests for plan execution.
// ABOUTME: Uses a scripted in-process provisioner and real shell commands for CommandProvisioner.

mod support;

use async_trait::async_trait;
use parking_lot::Mutex;
use stackplan::apply::{
    ApplyContext, ApplyFailure, CommandProvisioner, Executor, Outputs, ProvisionError,
    ProvisionRequest, Provisioner, missing_externals,
};
use stackplan::graph::{ApplyPlan, DependencyGraph, StackDescriptor};
use stackplan::output::{Output, OutputMode};
use stackplan::store::{MemoryStore, ParameterStore, StoreError};
use stackplan::types::ParameterName;
use std::collections::BTreeSet;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;
use support::{param, stack};
use tempfile::TempDir;

/// Publishes `<stack>:<leaf>` for every declared write and records call order.
#[derive(Default)]
struct ScriptedProvisioner {
    calls: Mutex<Vec<String>>,
    fail: Option<&'static str>,
    skip_output: Option<&'static str>,
    extra_output: Option<&'static str>,
}

#[async_trait]
impl Provisioner for ScriptedProvisioner {
    async fn provision(&self, request: ProvisionRequest<'_>) -> Result<Outputs, ProvisionError> {
        let stack = request.step.stack.as_str();
        self.calls.lock().push(stack.to_string());

        if self.fail == Some(stack) {
            return Err(ProvisionError::Failed {
                code: Some(1),
                stderr: "stack rollback complete".to_string(),
            });
        }

        let mut outputs = Outputs::new();
        for write in &request.step.writes {
            if self.skip_output == Some(write.leaf()) {
                continue;
            }
            outputs.insert(write.clone(), format!("{stack}:{}", write.leaf()));
        }
        if let Some(extra) = self.extra_output {
            outputs.insert(param(extra), "surprise".to_string());
        }
        Ok(outputs)
    }
}

/// Memory store whose `put` fails for one parameter.
struct RejectingStore {
    inner: MemoryStore,
    reject: ParameterName,
}

impl ParameterStore for RejectingStore {
    fn put(&self, name: &ParameterName, value: &str) -> Result<(), StoreError> {
        if name == &self.reject {
            return Err(StoreError::Io(std::io::Error::other("throttled")));
        }
        self.inner.put(name, value)
    }

    fn get(&self, name: &ParameterName) -> Result<String, StoreError> {
        self.inner.get(name)
    }

    fn list(&self) -> Result<Vec<ParameterName>, StoreError> {
        self.inner.list()
    }
}

fn context() -> ApplyContext {
    ApplyContext {
        region: "eu-west-1".to_string(),
        account: None,
    }
}

fn quiet() -> Output {
    Output::new(OutputMode::Quiet)
}

fn four_stacks() -> Vec<StackDescriptor> {
    vec![
        stack("a-record", &["albArn", "hostedZoneId"], &[]),
        stack("green-blue-fargate", &["certificateArn", "ecrRepositoryArn"], &["albArn"]),
        stack("ecr", &[], &["ecrRepositoryArn"]),
        stack("ssl-certificate", &["hostedZoneId"], &["certificateArn"]),
    ]
}

fn plan_for(stacks: &[StackDescriptor]) -> (DependencyGraph, ApplyPlan) {
    let externals = BTreeSet::from([param("hostedZoneId")]);
    let graph = DependencyGraph::build_with_externals(stacks, &externals).unwrap();
    let plan = ApplyPlan::emit(&graph);
    (graph, plan)
}

fn seeded_store() -> MemoryStore {
    MemoryStore::with_values([(param("hostedZoneId"), "Z123".to_string())])
}

mod executor {
    use super::*;

    #[tokio::test]
    async fn applies_in_plan_order_and_publishes_outputs() {
        support::init_tracing();
        let (_, plan) = plan_for(&four_stacks());
        let store = seeded_store();
        let provisioner = ScriptedProvisioner::default();

        let report = Executor::new(&store, &provisioner, context())
            .run(&plan, &quiet())
            .await
            .unwrap();

        let applied: Vec<&str> = report.stacks().iter().map(|s| s.as_str()).collect();
        assert_eq!(
            applied,
            vec!["ecr", "ssl-certificate", "green-blue-fargate", "a-record"]
        );
        assert_eq!(*provisioner.calls.lock(), applied);
        assert_eq!(
            store.get(&param("albArn")).unwrap(),
            "green-blue-fargate:albArn"
        );
        assert_eq!(report.applied[0].outputs, vec![param("ecrRepositoryArn")]);
    }

    #[tokio::test]
    async fn first_failure_aborts_remaining_stacks() {
        let (_, plan) = plan_for(&four_stacks());
        let store = seeded_store();
        let provisioner = ScriptedProvisioner {
            fail: Some("ssl-certificate"),
            ..Default::default()
        };

        let err = Executor::new(&store, &provisioner, context())
            .run(&plan, &quiet())
            .await
            .unwrap_err();

        assert_eq!(err.stack.as_str(), "ssl-certificate");
        assert!(matches!(err.cause, ApplyFailure::Provision(_)));
        let applied: Vec<&str> = err.applied.iter().map(|s| s.as_str()).collect();
        assert_eq!(applied, vec!["ecr"]);
        let remaining: Vec<&str> = err.remaining.iter().map(|s| s.as_str()).collect();
        assert_eq!(remaining, vec!["green-blue-fargate", "a-record"]);
        assert!(err.to_string().contains("not applied: green-blue-fargate, a-record"));

        assert_eq!(provisioner.calls.lock().len(), 2);
        assert!(!store.contains(&param("albArn")).unwrap());
    }

    #[tokio::test]
    async fn missing_input_is_not_found() {
        let (_, plan) = plan_for(&four_stacks());
        let store = MemoryStore::new();
        let provisioner = ScriptedProvisioner::default();

        let err = Executor::new(&store, &provisioner, context())
            .run(&plan, &quiet())
            .await
            .unwrap_err();

        assert_eq!(err.stack.as_str(), "ssl-certificate");
        assert!(err.is_not_found());
        assert!(matches!(
            err.cause,
            ApplyFailure::Input(StoreError::NotFound(ref name)) if name == &param("hostedZoneId")
        ));
    }

    #[tokio::test]
    async fn outputs_must_match_declared_writes() {
        let stacks = vec![stack("ecr", &[], &["ecrRepositoryArn", "ecrRepositoryUri"])];
        let (_, plan) = plan_for(&stacks);

        let missing = ScriptedProvisioner {
            skip_output: Some("ecrRepositoryUri"),
            ..Default::default()
        };
        let store = MemoryStore::new();
        let err = Executor::new(&store, &missing, context())
            .run(&plan, &quiet())
            .await
            .unwrap_err();
        assert!(matches!(
            err.cause,
            ApplyFailure::MissingOutput(ref name) if name == &param("ecrRepositoryUri")
        ));
        assert!(store.is_empty(), "nothing is published when outputs are incomplete");

        let extra = ScriptedProvisioner {
            extra_output: Some("albArn"),
            ..Default::default()
        };
        let err = Executor::new(&store, &extra, context())
            .run(&plan, &quiet())
            .await
            .unwrap_err();
        assert!(matches!(
            err.cause,
            ApplyFailure::UndeclaredOutput(ref name) if name == &param("albArn")
        ));
    }

    #[tokio::test]
    async fn failed_publish_lists_outputs_already_in_store() {
        let stacks = vec![stack("green-blue-fargate", &[], &["albArn", "albDnsName"])];
        let (_, plan) = plan_for(&stacks);
        let store = RejectingStore {
            inner: MemoryStore::new(),
            reject: param("albDnsName"),
        };

        let err = Executor::new(&store, &ScriptedProvisioner::default(), context())
            .run(&plan, &quiet())
            .await
            .unwrap_err();

        assert!(matches!(
            err.cause,
            ApplyFailure::Publish { ref output, ref published, .. }
                if output == &param("albDnsName") && published == &vec![param("albArn")]
        ));
        assert!(err.to_string().contains("already published: /api/albArn"));
        assert_eq!(store.list().unwrap(), vec![param("albArn")]);
    }

    #[test]
    fn reports_externals_missing_from_store() {
        let (graph, _) = plan_for(&four_stacks());

        assert_eq!(
            missing_externals(&graph, &MemoryStore::new()).unwrap(),
            vec![param("hostedZoneId")]
        );
        assert!(missing_externals(&graph, &seeded_store()).unwrap().is_empty());
    }
}

mod command_provisioner {
    use super::*;

    fn script(dir: &TempDir, body: &str) -> String {
        let path = dir.path().join("provision.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn passes_context_and_reads_json_outputs() {
        support::init_tracing();
        let dir = TempDir::new().unwrap();
        let path = script(
            &dir,
            r#"echo "$STACKPLAN_INPUTS" > inputs.json
printf '{"albArn": "%s:%s:%s"}' "$STACKPLAN_STACK" "$STACKPLAN_REGION" "$STACKPLAN_ACCOUNT"
"#,
        );

        let stacks = vec![
            stack("ssl-certificate", &[], &["certificateArn"]),
            stack("green-blue-fargate", &["certificateArn"], &["albArn"]),
        ];
        let (_, plan) = plan_for(&stacks);
        let provisioner =
            CommandProvisioner::new(vec![path], Duration::from_secs(10)).working_dir(dir.path());
        let context = ApplyContext {
            region: "eu-west-1".to_string(),
            account: Some("123456789012".to_string()),
        };

        let inputs = Outputs::from([(param("certificateArn"), "arn:cert".to_string())]);
        let outputs = provisioner
            .provision(ProvisionRequest {
                step: &plan.steps[1],
                inputs: &inputs,
                region: &context.region,
                account: context.account.as_deref(),
            })
            .await
            .unwrap();

        assert_eq!(
            outputs.get(&param("albArn")).map(String::as_str),
            Some("green-blue-fargate:eu-west-1:123456789012")
        );
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("inputs.json")).unwrap())
                .unwrap();
        assert_eq!(written["/api/certificateArn"], "arn:cert");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "echo 'quota exceeded' >&2\nexit 3\n");
        let (_, plan) = plan_for(&[stack("ecr", &[], &["ecrRepositoryArn"])]);
        let provisioner = CommandProvisioner::new(vec![path], Duration::from_secs(10));

        let err = provisioner
            .provision(ProvisionRequest {
                step: &plan.steps[0],
                inputs: &Outputs::new(),
                region: "eu-west-1",
                account: None,
            })
            .await
            .unwrap_err();

        match err {
            ProvisionError::Failed { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "quota exceeded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "sleep 5\n");
        let (_, plan) = plan_for(&[stack("ecr", &[], &[])]);
        let provisioner = CommandProvisioner::new(vec![path], Duration::from_millis(200));

        let err = provisioner
            .provision(ProvisionRequest {
                step: &plan.steps[0],
                inputs: &Outputs::new(),
                region: "eu-west-1",
                account: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Timeout(_)));
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let (_, plan) = plan_for(&[stack("ecr", &[], &[])]);
        let provisioner = CommandProvisioner::new(Vec::new(), Duration::from_secs(1));

        let err = provisioner
            .provision(ProvisionRequest {
                step: &plan.steps[0],
                inputs: &Outputs::new(),
                region: "eu-west-1",
                account: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::EmptyCommand));
    }

    #[tokio::test]
    async fn executor_runs_command_for_every_stack() {
        let dir = TempDir::new().unwrap();
        let path = script(
            &dir,
            r#"case "$STACKPLAN_STACK" in
  ecr) echo '{"ecrRepositoryArn": "arn:aws:ecr:repo"}' ;;
  *) echo '{}' ;;
esac
"#,
        );
        let stacks = vec![
            stack("service", &["ecrRepositoryArn"], &[]),
            stack("ecr", &[], &["ecrRepositoryArn"]),
        ];
        let (_, plan) = plan_for(&stacks);
        let store = MemoryStore::new();
        let provisioner = CommandProvisioner::new(vec![path], Duration::from_secs(10));

        let report = Executor::new(&store, &provisioner, context())
            .run(&plan, &quiet())
            .await
            .unwrap();

        assert_eq!(report.applied.len(), 2);
        assert_eq!(store.get(&param("ecrRepositoryArn")).unwrap(), "arn:aws:ecr:repo");
    }
}
