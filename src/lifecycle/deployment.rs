use crate::config::DeployConfig;
use crate::engine::{ChangeKind, ProvisioningEngine, ProvisioningError, TeardownReport, UnitReport};
use crate::error::DeployError;
use crate::model::{DependencyGraph, DeploymentName, UnitName, UnitTemplate};
use crate::units::{
    DeploymentUnit, FoundationProvisioner, RegistryProvisioner, ServiceTopologyProvisioner,
    UnitInputs,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// The deployment: units plus the ordering declared between them.
///
/// `deploy` evaluates the units in topological waves. Units in the same wave have no
/// dependency on each other and run concurrently; a wave only starts once every unit of the
/// previous wave has been committed by the engine.
///
/// # Example
///
/// ```ignore
/// let deployment = Deployment::standard(&DeployConfig::from_env()?)?;
/// let engine = Arc::new(LocalEngine::new());
/// let report = deployment.deploy(engine.clone()).await?;
/// println!("{:?}", report.output(&deployment.name().topology_unit(), "HelloALBDNS"));
/// ```
pub struct Deployment {
    name: DeploymentName,
    units: Vec<Arc<dyn DeploymentUnit>>,
    graph: DependencyGraph<UnitName>,
}

/// Everything one `deploy` produced, in evaluation order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeploymentReport {
    pub units: Vec<(UnitName, UnitReport)>,
    pub templates: Vec<UnitTemplate>,
}

impl DeploymentReport {
    pub fn unit(&self, name: &UnitName) -> Option<&UnitReport> {
        self.units
            .iter()
            .find(|(unit, _)| unit == name)
            .map(|(_, report)| report)
    }

    pub fn output(&self, unit: &UnitName, name: &str) -> Option<&str> {
        self.unit(unit)
            .and_then(|report| report.outputs.get(name))
            .map(String::as_str)
    }

    pub fn template(&self, unit: &UnitName) -> Option<&UnitTemplate> {
        self.templates.iter().find(|template| template.unit() == unit)
    }

    /// Total number of changes of `kind` across all units.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.units.iter().map(|(_, report)| report.count(kind)).sum()
    }
}

impl Deployment {
    pub fn new(name: DeploymentName) -> Self {
        Self {
            name,
            units: Vec::new(),
            graph: DependencyGraph::new(),
        }
    }

    /// Registry and foundation, then the service topology once both are committed.
    pub fn standard(config: &DeployConfig) -> Result<Self, DeployError> {
        let name = config.deployment.clone();
        let registry = RegistryProvisioner::new(name.clone());
        let foundation = FoundationProvisioner::new(name.clone());
        let topology = ServiceTopologyProvisioner::new(name.clone());

        let mut deployment = Self::new(name.clone());
        deployment.add_unit(Arc::new(registry))?;
        deployment.add_unit(Arc::new(foundation))?;
        deployment.add_unit(Arc::new(topology))?;
        deployment.add_dependency(&name.topology_unit(), &name.registry_unit())?;
        deployment.add_dependency(&name.topology_unit(), &name.foundation_unit())?;
        Ok(deployment)
    }

    pub fn name(&self) -> &DeploymentName {
        &self.name
    }

    pub fn add_unit(&mut self, unit: Arc<dyn DeploymentUnit>) -> Result<(), DeployError> {
        if self.graph.contains(unit.name()) {
            return Err(DeployError::configuration(
                format!("deployment {}", self.name),
                format!("unit `{}` is declared twice", unit.name()),
            ));
        }
        self.graph.add_node(unit.name().clone());
        self.units.push(unit);
        Ok(())
    }

    /// `dependent` is only evaluated once `dependency` has been committed, and may read its
    /// outputs.
    pub fn add_dependency(&mut self, dependent: &UnitName, dependency: &UnitName) -> Result<(), DeployError> {
        self.graph
            .add_edge(dependent, dependency)
            .map_err(|e| DeployError::configuration(format!("deployment {}", self.name), e.to_string()))
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitName> {
        self.units.iter().map(|unit| unit.name())
    }

    /// Evaluation waves. Fails on a dependency cycle.
    pub fn plan(&self) -> Result<Vec<Vec<UnitName>>, DeployError> {
        self.graph
            .waves()
            .map_err(|e| DeployError::configuration(format!("deployment {}", self.name), e.to_string()))
    }

    fn unit(&self, name: &UnitName) -> Result<Arc<dyn DeploymentUnit>, DeployError> {
        self.units
            .iter()
            .find(|unit| unit.name() == name)
            .cloned()
            .ok_or_else(|| {
                DeployError::configuration(format!("deployment {}", self.name), format!("unknown unit `{name}`"))
            })
    }

    async fn inputs(
        &self,
        unit: &dyn DeploymentUnit,
        engine: &dyn ProvisioningEngine,
        completed: &DeploymentReport,
    ) -> Result<UnitInputs, DeployError> {
        let name = unit.name();
        let mut inputs = UnitInputs::new(name.clone());
        for key in unit.imports() {
            let value = engine
                .read_parameter(&key)
                .await
                .map_err(|source| DeployError::Provisioning {
                    unit: name.clone(),
                    source,
                })?;
            match value {
                Some(value) => inputs = inputs.with_parameter(key, value),
                None => debug!(unit = %name, %key, "Parameter not published"),
            }
        }
        let dependencies = self
            .graph
            .dependencies_of(name)
            .map_err(|e| DeployError::configuration(format!("deployment {}", self.name), e.to_string()))?;
        for dependency in dependencies {
            if let Some(report) = completed.unit(dependency) {
                inputs = inputs.with_outputs(dependency.clone(), report.outputs.clone());
            }
        }
        Ok(inputs)
    }

    /// Evaluates every unit against `engine`.
    ///
    /// The first failing unit aborts the deployment once its wave has settled; units committed
    /// before it keep their resources.
    pub async fn deploy(&self, engine: Arc<dyn ProvisioningEngine>) -> Result<DeploymentReport, DeployError> {
        let waves = self.plan()?;
        let mut report = DeploymentReport::default();
        info!(deployment = %self.name, waves = waves.len(), "Deploying");

        for wave in waves {
            // Every input of the wave is read before any unit of it starts.
            let mut ready = Vec::with_capacity(wave.len());
            for name in wave {
                let unit = self.unit(&name)?;
                let inputs = self.inputs(unit.as_ref(), engine.as_ref(), &report).await?;
                ready.push((name, unit, inputs));
            }

            let mut handles = Vec::with_capacity(ready.len());
            for (name, unit, inputs) in ready {
                let engine = engine.clone();
                let span = info_span!("unit", unit = %name);
                let handle = tokio::spawn(
                    async move {
                        let template = unit.synthesize(&inputs)?;
                        debug!(resources = template.resources().len(), "Synthesized");
                        let unit_report = engine
                            .deploy(&template)
                            .await
                            .map_err(|source| DeployError::Provisioning {
                                unit: template.unit().clone(),
                                source,
                            })?;
                        info!(
                            created = unit_report.count(ChangeKind::Create),
                            updated = unit_report.count(ChangeKind::Update),
                            replaced = unit_report.count(ChangeKind::Replace),
                            deleted = unit_report.count(ChangeKind::Delete),
                            "Committed"
                        );
                        Ok::<_, DeployError>((template, unit_report))
                    }
                    .instrument(span),
                );
                handles.push((name, handle));
            }

            let mut failure = None;
            for (name, handle) in handles {
                let outcome = handle.await.map_err(|e| DeployError::Provisioning {
                    unit: name.clone(),
                    source: ProvisioningError::Backend(format!("unit task failed: {e}")),
                });
                match outcome.and_then(|result| result) {
                    Ok((template, unit_report)) => {
                        report.units.push((name, unit_report));
                        report.templates.push(template);
                    }
                    Err(e) => {
                        error!(unit = %name, error = %e, "Unit failed");
                        failure.get_or_insert(e);
                    }
                }
            }
            if let Some(e) = failure {
                return Err(e);
            }
        }

        info!(deployment = %self.name, "Deployment complete");
        Ok(report)
    }

    /// Destroys every unit, dependents first. Resources kept by their removal policy are
    /// reported, not deleted.
    pub async fn teardown(
        &self,
        engine: Arc<dyn ProvisioningEngine>,
    ) -> Result<Vec<(UnitName, TeardownReport)>, DeployError> {
        let mut order: Vec<UnitName> = self.plan()?.into_iter().flatten().collect();
        order.reverse();

        let mut reports = Vec::with_capacity(order.len());
        for name in order {
            let span = info_span!("unit", unit = %name);
            let report = engine
                .destroy(&name)
                .instrument(span)
                .await
                .map_err(|source| DeployError::Provisioning {
                    unit: name.clone(),
                    source,
                })?;
            for (resource, physical_name) in &report.retained {
                warn!(unit = %name, %resource, physical_name, "Retained");
            }
            info!(unit = %name, deleted = report.deleted.len(), "Destroyed");
            reports.push((name, report));
        }
        Ok(reports)
    }
}
