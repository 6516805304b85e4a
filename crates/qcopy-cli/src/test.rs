use assert_cmd::prelude::*;
use aws_sdk_sqs::config::Credentials;
use predicates::prelude::*;
use std::process::Command;
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

pub fn local_config(endpoint_url: &str) -> aws_config::ConfigLoader {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .endpoint_url(endpoint_url)
        .region("us-east-1")
        .credentials_provider(Credentials::new("test", "test", None, None, "static"))
}

async fn send_messages_to_queue(
    queue_url: &str,
    num_messages: i32,
    endpoint_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = local_config(endpoint_url).load().await;
    let client = aws_sdk_sqs::Client::new(&config);

    for i in 0..num_messages {
        client
            .send_message()
            .queue_url(queue_url)
            .message_body(format!("Test message {}", i))
            .send()
            .await?;
    }

    Ok(())
}

#[test]
fn wrong_argument_count_prints_usage() {
    let mut cmd = Command::cargo_bin("qcopy").unwrap();

    cmd.args(["eu-central-1", "from-queue"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn rejects_batch_size_outside_range() {
    let mut cmd = Command::cargo_bin("qcopy").unwrap();

    cmd.args(["eu-central-1", "a", "b", "--batch-size", "11"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("batch size"));
}

#[tokio::test]
async fn copies_messages_between_queues() {
    let (endpoint, container) = localstack().await.unwrap();

    let source_url = create_test_queue(&container, "cli-source").await.unwrap();
    create_test_queue(&container, "cli-dest").await.unwrap();

    send_messages_to_queue(&source_url, 3, &endpoint)
        .await
        .unwrap();

    let mut cmd = Command::cargo_bin("qcopy").unwrap();

    cmd.args(["us-east-1", "cli-source", "cli-dest"]);
    cmd.args(["--local", "--endpoint", &endpoint]);
    cmd.args(["--batch-size", "10"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""copied":3"#));

    container.stop().await.unwrap();
}

#[tokio::test]
async fn delete_source_removes_copied_messages() {
    let (endpoint, container) = localstack().await.unwrap();

    let source_url = create_test_queue(&container, "cli-drain-source")
        .await
        .unwrap();
    create_test_queue(&container, "cli-drain-dest").await.unwrap();

    send_messages_to_queue(&source_url, 2, &endpoint)
        .await
        .unwrap();

    let mut cmd = Command::cargo_bin("qcopy").unwrap();

    cmd.args(["us-east-1", "cli-drain-source", "cli-drain-dest"]);
    cmd.args(["--local", "--endpoint", &endpoint]);
    cmd.args(["--batch-size", "10", "--delete-source"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""deleted":2"#));

    let config = local_config(&endpoint).load().await;
    let client = aws_sdk_sqs::Client::new(&config);
    let output = client
        .receive_message()
        .queue_url(&source_url)
        .max_number_of_messages(10)
        .send()
        .await
        .unwrap();
    assert!(output.messages().is_empty());

    container.stop().await.unwrap();
}

#[tokio::test]
async fn missing_queue_fails_with_diagnostic() {
    let (endpoint, container) = localstack().await.unwrap();

    create_test_queue(&container, "cli-only-source").await.unwrap();

    let mut cmd = Command::cargo_bin("qcopy").unwrap();

    cmd.args(["us-east-1", "cli-only-source", "cli-no-such-queue"]);
    cmd.args(["--local", "--endpoint", &endpoint]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("queue could not be resolved"));

    container.stop().await.unwrap();
}
