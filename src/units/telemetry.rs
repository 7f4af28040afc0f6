//! Auto-instrumentation for a service: an init container drops the agent into a shared
//! volume, the application loads it at start-up and ships signals to a collector sidecar.

use crate::error::DeployError;
use crate::model::{
    ContainerCondition, ContainerDefinition, ContainerDependency, LogConfiguration, MountPoint,
    Value,
};
use serde_json::json;

const INSTRUMENTATION_VOLUME: &str = "opentelemetry-auto-instrumentation";
const INSTRUMENTATION_PATH: &str = "/otel-auto-instrumentation";
const INIT_CONTAINER: &str = "init";
const AGENT_IMAGE: &str = "public.ecr.aws/cloudwatch-agent/cloudwatch-agent:latest";
const COLLECTOR_ENDPOINT: &str = "http://localhost:4316";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryIntegration {
    service_name: String,
    sdk_version: String,
    agent_container: String,
    agent_cpu: u32,
    agent_memory_mib: u32,
}

impl TelemetryIntegration {
    /// Java agent `v2.10.0` with an `ecs-cwagent` sidecar of 256 CPU units / 512 MiB.
    pub fn java(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            sdk_version: "v2.10.0".to_string(),
            agent_container: "ecs-cwagent".to_string(),
            agent_cpu: 256,
            agent_memory_mib: 512,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn agent_container(&self) -> &str {
        &self.agent_container
    }

    fn instrumentation_image(&self) -> String {
        format!(
            "public.ecr.aws/aws-observability/adot-autoinstrumentation-java:{}",
            self.sdk_version
        )
    }

    fn agent_config() -> String {
        json!({
            "traces": { "traces_collected": { "application_signals": {} } },
            "logs": { "metrics_collected": { "application_signals": {} } }
        })
        .to_string()
    }

    /// Rewrites the task's containers and volumes. `app` must name one of `containers`.
    pub fn apply(
        &self,
        containers: &mut Vec<ContainerDefinition>,
        volumes: &mut Vec<String>,
        app: &str,
        log_group: &Value,
    ) -> Result<(), DeployError> {
        let application = containers
            .iter_mut()
            .find(|container| container.name == app)
            .ok_or_else(|| {
                DeployError::configuration(
                    "telemetry integration",
                    format!("no application container named `{app}`"),
                )
            })?;

        application.mounts.push(MountPoint {
            volume: INSTRUMENTATION_VOLUME.to_string(),
            container_path: INSTRUMENTATION_PATH.to_string(),
            read_only: false,
        });
        application.depends_on.push(ContainerDependency {
            container: INIT_CONTAINER.to_string(),
            condition: ContainerCondition::Success,
        });
        application.depends_on.push(ContainerDependency {
            container: self.agent_container.clone(),
            condition: ContainerCondition::Start,
        });
        let env = [
            ("OTEL_RESOURCE_ATTRIBUTES", format!("service.name={}", self.service_name)),
            ("OTEL_LOGS_EXPORTER", "none".to_string()),
            ("OTEL_METRICS_EXPORTER", "none".to_string()),
            ("OTEL_EXPORTER_OTLP_PROTOCOL", "http/protobuf".to_string()),
            ("OTEL_AWS_APPLICATION_SIGNALS_ENABLED", "true".to_string()),
            (
                "OTEL_AWS_APPLICATION_SIGNALS_EXPORTER_ENDPOINT",
                format!("{COLLECTOR_ENDPOINT}/v1/metrics"),
            ),
            (
                "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT",
                format!("{COLLECTOR_ENDPOINT}/v1/traces"),
            ),
            ("OTEL_TRACES_SAMPLER", "xray".to_string()),
            ("OTEL_PROPAGATORS", "tracecontext,baggage,b3,xray".to_string()),
            (
                "JAVA_TOOL_OPTIONS",
                format!(" -javaagent:{INSTRUMENTATION_PATH}/javaagent.jar"),
            ),
        ];
        for (name, value) in env {
            application.environment.insert(name.to_string(), Value::Literal(value));
        }

        let mut init = ContainerDefinition::new(INIT_CONTAINER, Value::literal(self.instrumentation_image()));
        init.essential = false;
        init.command = vec![
            "cp".to_string(),
            "/javaagent.jar".to_string(),
            format!("{INSTRUMENTATION_PATH}/javaagent.jar"),
        ];
        init.mounts.push(MountPoint {
            volume: INSTRUMENTATION_VOLUME.to_string(),
            container_path: INSTRUMENTATION_PATH.to_string(),
            read_only: false,
        });

        let mut agent = ContainerDefinition::new(self.agent_container.clone(), Value::literal(AGENT_IMAGE));
        agent.cpu = Some(self.agent_cpu);
        agent.memory_mib = Some(self.agent_memory_mib);
        agent
            .environment
            .insert("CW_CONFIG_CONTENT".to_string(), Value::Literal(Self::agent_config()));
        agent.logging = Some(LogConfiguration {
            log_group: log_group.clone(),
            stream_prefix: self.agent_container.clone(),
        });

        containers.push(init);
        containers.push(agent);
        if !volumes.iter().any(|volume| volume == INSTRUMENTATION_VOLUME) {
            volumes.push(INSTRUMENTATION_VOLUME.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply() -> (Vec<ContainerDefinition>, Vec<String>) {
        let mut containers = vec![ContainerDefinition::new("WorldContainer", Value::literal("world"))];
        let mut volumes = Vec::new();
        TelemetryIntegration::java("world-service")
            .apply(&mut containers, &mut volumes, "WorldContainer", &Value::literal("logs"))
            .unwrap();
        (containers, volumes)
    }

    #[test]
    fn test_sidecar_and_init_container_are_added() {
        let (containers, volumes) = apply();
        let names: Vec<&str> = containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["WorldContainer", "init", "ecs-cwagent"]);
        assert_eq!(volumes, vec![INSTRUMENTATION_VOLUME.to_string()]);

        let agent = &containers[2];
        assert_eq!((agent.cpu, agent.memory_mib), (Some(256), Some(512)));
        assert!(agent.logging.is_some());
        let config: serde_json::Value =
            serde_json::from_str(agent.env("CW_CONFIG_CONTENT").unwrap().as_literal().unwrap()).unwrap();
        assert!(config["traces"]["traces_collected"]["application_signals"].is_object());

        assert!(!containers[1].essential);
        assert!(containers[1].image.as_literal().unwrap().ends_with(":v2.10.0"));
    }

    #[test]
    fn test_application_waits_for_agent_copy() {
        let (containers, _) = apply();
        let app = &containers[0];
        assert!(app.depends_on.contains(&ContainerDependency {
            container: "init".to_string(),
            condition: ContainerCondition::Success,
        }));
        assert_eq!(
            app.env("OTEL_RESOURCE_ATTRIBUTES"),
            Some(&Value::literal("service.name=world-service"))
        );
        assert!(app
            .env("JAVA_TOOL_OPTIONS")
            .and_then(Value::as_literal)
            .unwrap()
            .contains("-javaagent:/otel-auto-instrumentation/javaagent.jar"));
    }

    #[test]
    fn test_unknown_application_container() {
        let mut containers = Vec::new();
        let err = TelemetryIntegration::java("world-service")
            .apply(&mut containers, &mut Vec::new(), "WorldContainer", &Value::literal("logs"))
            .unwrap_err();
        assert!(matches!(err, DeployError::Configuration { .. }));
    }
}
