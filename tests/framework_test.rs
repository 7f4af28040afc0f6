use stack_deploy::cloud::{
    self, CloudObjectCreate, CloudObjectError, ParameterCreate, ParameterTier, RepositoryCreate,
    RepositoryError,
};
use stack_deploy::framework::ActorClient;
use stack_deploy::model::{
    ContainerDefinition, LogicalId, ParameterKey, RemovalPolicy, ResourceSpec, UnitName, Value,
};

/// The simulated cloud services wired together the way the local engine wires them.
#[tokio::test]
async fn test_cloud_services_integration() {
    let (repository_actor, repositories) = cloud::repository::new();
    let (parameter_actor, parameters) = cloud::parameter::new();
    let (object_actor, objects) = cloud::object::new();
    let handles = vec![
        tokio::spawn(repository_actor.run(())),
        tokio::spawn(parameter_actor.run(())),
        tokio::spawn(object_actor.run(repositories.clone())),
    ];

    // Registry: create, push, list
    let name = repositories
        .create_repository(RepositoryCreate {
            name: "demo-world-app".to_string(),
            removal_policy: RemovalPolicy::Destroy,
        })
        .await
        .expect("Failed to create repository");
    assert_eq!(name, "demo-world-app");

    let image = repositories
        .push_image(name.clone(), "latest".to_string())
        .await
        .expect("Failed to push image");
    assert!(image.digest.starts_with("sha256:"));
    let images = repositories
        .list_images(name.clone())
        .await
        .expect("Failed to list images");
    assert_eq!(images, vec![image]);

    // Names are unique
    let duplicate = repositories
        .create_repository(RepositoryCreate {
            name: name.clone(),
            removal_policy: RemovalPolicy::Destroy,
        })
        .await;
    assert_eq!(duplicate, Err(RepositoryError::AlreadyExists(name.clone())));

    // Parameter store
    let key = parameters
        .put_parameter(ParameterCreate {
            key: ParameterKey::new("/demo/worldRepositoryName"),
            value: name.clone(),
            description: "The world app repository name".to_string(),
            tier: ParameterTier::Standard,
        })
        .await
        .expect("Failed to put parameter");
    assert_eq!(
        parameters.get_value(key).await.expect("Failed to read parameter"),
        Some(name.clone())
    );

    // Cloud control looks images up in the registry
    let task_definition = |image: String| {
        let mut container = ContainerDefinition::new("WorldContainer", Value::literal(image));
        container.port_mappings.push(8080);
        CloudObjectCreate {
            unit: UnitName::new("demo-app"),
            logical_id: LogicalId::new("WorldTaskDef"),
            spec: ResourceSpec::TaskDefinition {
                cpu: 256,
                memory_mib: 512,
                execution_role: Value::literal("arn:aws:iam::000000000000:role/exec"),
                task_role: Value::literal("arn:aws:iam::000000000000:role/task"),
                containers: vec![container],
                volumes: Vec::new(),
            },
        }
    };
    let id = objects
        .create_object(task_definition(format!("{}/{name}:latest", cloud::registry_host())))
        .await
        .expect("Failed to create task definition");
    let created = objects
        .get(id)
        .await
        .expect("Failed to get object")
        .expect("Object not found");
    assert_eq!(created.revision, 1);

    let missing = objects
        .create_object(task_definition(format!("{}/demo-app:latest", cloud::registry_host())))
        .await;
    assert_eq!(
        missing,
        Err(CloudObjectError::ImageRepositoryNotFound("demo-app".to_string()))
    );

    // Destroying the repository takes its images with it
    repositories
        .delete(name.clone())
        .await
        .expect("Failed to delete repository");
    assert!(repositories.get(name).await.expect("Failed to get").is_none());

    drop(repositories);
    drop(parameters);
    drop(objects);
    for handle in handles {
        handle.await.expect("Actor task failed");
    }
}
