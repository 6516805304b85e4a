use aws_sdk_sqs::config::Credentials;
use testcontainers::ContainerAsync;
use testcontainers_modules::{
    localstack::LocalStack,
    testcontainers::{runners::AsyncRunner, Image, ImageExt, TestcontainersError},
};

pub async fn localstack() -> Result<(String, ContainerAsync<LocalStack>), TestcontainersError> {
    let request = LocalStack::default()
        .with_tag("latest")
        .with_env_var("SERVICES", "sqs")
        .with_env_var("SKIP_SSL_CERT_DOWNLOAD", "1");
    let container = request.start().await?;

    let host_ip = container.get_host().await?;
    let host_port = container.get_host_port_ipv4(4566).await?;
    let endpoint_url = format!("http://{host_ip}:{host_port}");

    Ok((endpoint_url, container))
}

pub async fn create_test_queue<I: Image>(
    container: &ContainerAsync<I>,
    name: &str,
) -> Result<String, TestcontainersError> {
    let create_queue_command = testcontainers::core::ExecCommand::new([
        "awslocal",
        "sqs",
        "create-queue",
        "--queue-name",
        name,
    ])
    .with_container_ready_conditions(vec![testcontainers::core::WaitFor::message_on_stdout(
        "AWS sqs.CreateQueue => 200",
    )]);

    let mut result = container.exec(create_queue_command).await?;

    let output = result.stdout_to_vec().await?;

    let json: serde_json::Value =
        serde_json::from_slice(&output).map_err(|e| TestcontainersError::Other(Box::new(e)))?;

    match json["QueueUrl"].as_str() {
        Some(url) => Ok(url.to_string()),
        None => Err(TestcontainersError::Other(
            "QueueUrl not found in response".into(),
        )),
    }
}

pub fn local_config(endpoint_url: &str, region: Option<&'static str>) -> aws_config::ConfigLoader {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .endpoint_url(endpoint_url)
        .region(region.unwrap_or("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "static"))
}

pub async fn send_test_messages(
    config: &aws_config::SdkConfig,
    queue_url: &str,
    count: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = aws_sdk_sqs::Client::new(config);

    for i in 0..count {
        client
            .send_message()
            .queue_url(queue_url)
            .message_body(format!("Test message {i}"))
            .send()
            .await?;
    }

    Ok(())
}
