use async_trait::async_trait;
use stack_deploy::config::DeployConfig;
use stack_deploy::engine::{
    ChangeKind, LocalEngine, ProvisioningEngine, ProvisioningError, Route, TeardownReport,
    UnitReport,
};
use stack_deploy::error::DeployError;
use stack_deploy::lifecycle::Deployment;
use stack_deploy::model::{
    DeploymentName, LogicalId, ParameterKey, RemovalPolicy, ResourceKind, ResourceSpec,
    ServiceRole, UnitName, UnitTemplate,
};
use stack_deploy::units::{
    DeploymentUnit, FoundationProvisioner, RegistryProvisioner, ServiceTopologyProvisioner,
    UnitInputs,
};
use std::sync::Arc;

fn demo() -> DeploymentName {
    DeploymentName::new("demo").unwrap()
}

fn standard() -> Deployment {
    Deployment::standard(&DeployConfig::new(demo())).unwrap()
}

/// A repository some other team created by hand, outside this deployment.
struct ForeignRepository {
    unit: UnitName,
    repository_name: String,
}

impl DeploymentUnit for ForeignRepository {
    fn name(&self) -> &UnitName {
        &self.unit
    }

    fn synthesize(&self, _inputs: &UnitInputs) -> Result<UnitTemplate, DeployError> {
        let mut template = UnitTemplate::new(self.unit.clone());
        template.add(
            "Repository",
            ResourceSpec::ImageRepository {
                repository_name: self.repository_name.clone(),
                removal_policy: RemovalPolicy::Retain,
            },
        )?;
        Ok(template)
    }
}

/// A local engine whose parameter store cannot be reached.
struct ParameterStoreDown(Arc<LocalEngine>);

#[async_trait]
impl ProvisioningEngine for ParameterStoreDown {
    async fn deploy(&self, template: &UnitTemplate) -> Result<UnitReport, ProvisioningError> {
        self.0.deploy(template).await
    }

    async fn destroy(&self, unit: &UnitName) -> Result<TeardownReport, ProvisioningError> {
        self.0.destroy(unit).await
    }

    async fn read_parameter(&self, key: &ParameterKey) -> Result<Option<String>, ProvisioningError> {
        Err(ProvisioningError::Backend(format!("parameter store unreachable, reading {key}")))
    }
}

#[test]
fn test_registry_and_foundation_share_the_first_wave() {
    let deployment = standard();
    let plan = deployment.plan().unwrap();
    assert_eq!(
        plan,
        vec![
            vec![UnitName::new("demo-docker"), UnitName::new("demo-cluster")],
            vec![UnitName::new("demo-app")],
        ]
    );
}

#[tokio::test]
async fn test_full_deployment() {
    let engine = Arc::new(LocalEngine::new());
    let deployment = standard();
    let report = deployment.deploy(engine.clone()).await.expect("Deploy failed");

    // Lookup keys resolve to the registry names.
    for (role, expected) in [(ServiceRole::Primary, "demo-app"), (ServiceRole::Dependency, "demo-world-app")] {
        let key = demo().registry_lookup_key(role);
        let value = engine.read_parameter(&key).await.unwrap();
        assert_eq!(value.as_deref(), Some(expected));
    }
    assert_eq!(
        report.output(&UnitName::new("demo-docker"), "worldRepositoryURI"),
        Some("000000000000.dkr.ecr.local-1.amazonaws.com/demo-world-app")
    );

    let topology = demo().topology_unit();
    let world = report.output(&topology, "WorldALBDNS").expect("WorldALBDNS missing");
    let hello = report.output(&topology, "HelloALBDNS").expect("HelloALBDNS missing");
    assert_ne!(world, hello);
    assert!(world.ends_with(".elb.amazonaws.com"));

    let kinds: Vec<ResourceKind> = engine.resources(&topology).await.into_iter().map(|(_, kind)| kind).collect();
    assert_eq!(kinds.iter().filter(|k| **k == ResourceKind::Service).count(), 2);
    assert_eq!(kinds.iter().filter(|k| **k == ResourceKind::LoadBalancer).count(), 2);

    drop(report);
    Arc::try_unwrap(engine)
        .ok()
        .expect("engine still shared")
        .shutdown()
        .await
        .expect("Shutdown failed");
}

#[tokio::test]
async fn test_redeploy_is_a_no_op() {
    let engine = Arc::new(LocalEngine::new());
    let deployment = standard();
    let first = deployment.deploy(engine.clone()).await.unwrap();
    assert!(first.count(ChangeKind::Create) > 0);

    let second = deployment.deploy(engine.clone()).await.unwrap();
    assert_eq!(second.count(ChangeKind::Create), 0);
    assert_eq!(second.count(ChangeKind::Replace), 0);
    assert_eq!(second.count(ChangeKind::Update), 0);
    assert!(second.units.iter().all(|(_, report)| !report.changed()));
    assert_eq!(
        first.output(&demo().topology_unit(), "HelloALBDNS"),
        second.output(&demo().topology_unit(), "HelloALBDNS")
    );
}

#[tokio::test]
async fn test_unhealthy_target_receives_no_traffic() {
    let engine = Arc::new(LocalEngine::new());
    let report = standard().deploy(engine.clone()).await.unwrap();
    let topology = demo().topology_unit();
    let world = report.output(&topology, "WorldALBDNS").unwrap().to_string();

    match engine.route(&world).await.unwrap() {
        Route::Forwarded { service, status, .. } => {
            assert_eq!(service, LogicalId::new("WorldService"));
            assert_eq!(status, 200);
        }
        other => panic!("expected forwarded request, got {other:?}"),
    }

    engine
        .set_health_response(&topology, &LogicalId::new("WorldService"), 503)
        .await
        .unwrap();
    assert_eq!(engine.route(&world).await.unwrap(), Route::NoHealthyTarget);

    // The other front door is unaffected.
    let hello = report.output(&topology, "HelloALBDNS").unwrap();
    assert!(matches!(engine.route(hello).await.unwrap(), Route::Forwarded { .. }));
    assert_eq!(engine.route("nowhere.example.com").await.unwrap(), Route::UnknownHost);
}

#[tokio::test]
async fn test_teardown_removes_registries_and_images() {
    let engine = Arc::new(LocalEngine::new());
    let deployment = standard();
    deployment.deploy(engine.clone()).await.unwrap();
    engine.push_image("demo-app", "latest").await.unwrap();
    engine.push_image("demo-world-app", "latest").await.unwrap();

    let reports = deployment.teardown(engine.clone()).await.unwrap();
    let order: Vec<&str> = reports.iter().map(|(unit, _)| unit.as_str()).collect();
    assert_eq!(order, vec!["demo-app", "demo-cluster", "demo-docker"]);
    assert!(reports.iter().all(|(_, report)| report.retained.is_empty()));

    assert!(engine.repositories().await.unwrap().is_empty());
    assert!(engine.repository("demo-app").await.unwrap().is_none());
    assert_eq!(engine.read_parameter(&demo().registry_lookup_key(ServiceRole::Primary)).await.unwrap(), None);
    assert!(engine.resources(&demo().topology_unit()).await.is_empty());
}

#[tokio::test]
async fn test_retained_registries_are_orphaned() {
    let name = demo();
    let mut deployment = Deployment::new(name.clone());
    deployment
        .add_unit(Arc::new(
            RegistryProvisioner::new(name.clone()).with_removal_policy(RemovalPolicy::Retain),
        ))
        .unwrap();
    deployment.add_unit(Arc::new(FoundationProvisioner::new(name.clone()))).unwrap();
    deployment.add_unit(Arc::new(ServiceTopologyProvisioner::new(name.clone()))).unwrap();
    deployment.add_dependency(&name.topology_unit(), &name.registry_unit()).unwrap();
    deployment.add_dependency(&name.topology_unit(), &name.foundation_unit()).unwrap();

    let engine = Arc::new(LocalEngine::new());
    deployment.deploy(engine.clone()).await.unwrap();
    let reports = deployment.teardown(engine.clone()).await.unwrap();
    let (_, registry) = reports.last().unwrap();
    let retained: Vec<&str> = registry.retained.iter().map(|(_, physical)| physical.as_str()).collect();
    assert_eq!(retained, vec!["demo-world-app", "demo-app"]);
    assert_eq!(engine.repositories().await.unwrap(), vec!["demo-app", "demo-world-app"]);

    // The orphans now block a fresh deployment under the same name.
    let err = deployment.deploy(engine.clone()).await.unwrap_err();
    assert!(matches!(
        err,
        DeployError::Provisioning {
            source: ProvisioningError::Collision { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_topology_alone_cannot_resolve_registries() {
    let mut deployment = Deployment::new(demo());
    deployment
        .add_unit(Arc::new(ServiceTopologyProvisioner::new(demo())))
        .unwrap();
    let engine = Arc::new(LocalEngine::new());
    let err = deployment.deploy(engine.clone()).await.unwrap_err();
    match err {
        DeployError::Resolution { unit, .. } => assert_eq!(unit, demo().topology_unit()),
        other => panic!("expected resolution error, got {other:?}"),
    }
    assert!(engine.resources(&demo().topology_unit()).await.is_empty());
}

#[tokio::test]
async fn test_registry_collision_keeps_foundation() {
    let engine = Arc::new(LocalEngine::new());
    let mut legacy = Deployment::new(DeploymentName::new("legacy").unwrap());
    legacy
        .add_unit(Arc::new(ForeignRepository {
            unit: UnitName::new("legacy"),
            repository_name: "demo-app".to_string(),
        }))
        .unwrap();
    legacy.deploy(engine.clone()).await.unwrap();

    let err = standard().deploy(engine.clone()).await.unwrap_err();
    match &err {
        DeployError::Provisioning { unit, source } => {
            assert_eq!(unit, &demo().registry_unit());
            assert!(matches!(
                source,
                ProvisioningError::Collision {
                    kind: ResourceKind::ImageRepository,
                    ..
                }
            ));
        }
        other => panic!("expected provisioning error, got {other:?}"),
    }
    assert!(err.to_string().contains("demo-app"));

    // The foundation ran in the same wave and stays committed; the topology never started.
    assert_eq!(engine.resources(&demo().foundation_unit()).await.len(), 2);
    assert!(engine.resources(&demo().registry_unit()).await.is_empty());
    assert!(engine.resources(&demo().topology_unit()).await.is_empty());
}

#[tokio::test]
async fn test_dependency_cycle_is_rejected() {
    let name = demo();
    let mut deployment = Deployment::new(name.clone());
    deployment.add_unit(Arc::new(RegistryProvisioner::new(name.clone()))).unwrap();
    deployment.add_unit(Arc::new(FoundationProvisioner::new(name.clone()))).unwrap();
    deployment.add_dependency(&name.registry_unit(), &name.foundation_unit()).unwrap();
    deployment.add_dependency(&name.foundation_unit(), &name.registry_unit()).unwrap();

    assert!(matches!(deployment.plan(), Err(DeployError::Configuration { .. })));
    let engine = Arc::new(LocalEngine::new());
    assert!(deployment.deploy(engine.clone()).await.is_err());
    assert!(engine.repositories().await.unwrap().is_empty());
}

#[test]
fn test_duplicate_and_unknown_units_are_rejected() {
    let mut deployment = standard();
    let err = deployment
        .add_unit(Arc::new(FoundationProvisioner::new(demo())))
        .unwrap_err();
    assert!(matches!(err, DeployError::Configuration { .. }));
    assert!(deployment
        .add_dependency(&demo().topology_unit(), &UnitName::new("nowhere"))
        .is_err());
}

#[tokio::test]
async fn test_unreadable_input_fails_the_wave_before_any_unit_starts() {
    let local = Arc::new(LocalEngine::new());
    let name = demo();
    let mut deployment = Deployment::new(name.clone());
    deployment
        .add_unit(Arc::new(ForeignRepository {
            unit: UnitName::new("legacy"),
            repository_name: "legacy-app".to_string(),
        }))
        .unwrap();
    deployment
        .add_unit(Arc::new(ServiceTopologyProvisioner::new(name.clone())))
        .unwrap();
    assert_eq!(
        deployment.plan().unwrap(),
        vec![vec![UnitName::new("legacy"), name.topology_unit()]]
    );

    let err = deployment
        .deploy(Arc::new(ParameterStoreDown(local.clone())))
        .await
        .unwrap_err();
    match &err {
        DeployError::Provisioning { unit, source } => {
            assert_eq!(unit, &name.topology_unit());
            assert!(matches!(source, ProvisioningError::Backend(_)));
        }
        other => panic!("expected provisioning error, got {other:?}"),
    }

    // The unit ahead of it in the wave never ran, so nothing is left running behind the error.
    assert!(local.repositories().await.unwrap().is_empty());
    assert!(local.resources(&UnitName::new("legacy")).await.is_empty());
}
