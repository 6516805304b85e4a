//! SQS-backed implementation of the queue client contract.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs as sqs;
use aws_sdk_sqs::config::ProvideCredentials;
use aws_sdk_sqs::error::SdkError;

use crate::client::{CopyError, QueueClient, ReceivedMessage};
use crate::copier::BatchSize;

/// Received messages stay hidden from other consumers for this many seconds.
const DEFAULT_VISIBILITY_TIMEOUT: i32 = 15;

/// Queue client backed by AWS SQS.
///
/// Wraps the AWS SDK client and maps its failures onto [`CopyError`].
/// Transient network retries and per-call timeouts defer to the SDK's own
/// defaults.
///
/// # Example
///
/// ```no_run
/// use qcopy::SqsQueueClient;
///
/// # async fn example() -> Result<(), qcopy::CopyError> {
/// let client = SqsQueueClient::from_env("eu-central-1").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SqsQueueClient {
    /// The AWS SDK configuration used for SQS operations
    pub config: SdkConfig,
    /// The SQS client instance
    pub client: sqs::Client,
    visibility_timeout: Option<i32>,
}

impl SqsQueueClient {
    /// Builds a client bound to `region`, with credentials taken from the
    /// process environment (`AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`,
    /// or any other provider in the default chain).
    ///
    /// # Errors
    ///
    /// Fails before any queue is touched if the region is empty or no
    /// working credentials can be established.
    pub async fn from_env(region: &str) -> Result<Self, CopyError> {
        if region.trim().is_empty() {
            return Err(CopyError::ClientInitialization(
                "region must not be empty".to_string(),
            ));
        }

        let config = aws_config::from_env()
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        Self::from_config(config).await
    }

    /// Creates a client from a pre-built AWS SDK config.
    ///
    /// This is the preferred constructor when the caller configures
    /// credentials and endpoints itself (e.g. pointing at LocalStack).
    ///
    /// # Errors
    ///
    /// Fails with [`CopyError::ClientInitialization`] when the config has no
    /// credentials provider or the provider cannot produce credentials.
    pub async fn from_config(config: SdkConfig) -> Result<Self, CopyError> {
        let provider = config.credentials_provider().ok_or_else(|| {
            CopyError::ClientInitialization("no credentials provider configured".to_string())
        })?;

        provider
            .provide_credentials()
            .await
            .map_err(|e| CopyError::ClientInitialization(e.to_string()))?;

        let client = sqs::Client::new(&config);
        Ok(Self {
            config,
            client,
            visibility_timeout: Some(DEFAULT_VISIBILITY_TIMEOUT),
        })
    }

    /// Client for a locally hosted queue service with static test credentials.
    pub async fn local(endpoint: &str, region: &str) -> Result<Self, CopyError> {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(aws_config::Region::new(region.to_string()))
            .credentials_provider(sqs::config::Credentials::new(
                "test", "test", None, None, "static",
            ))
            .load()
            .await;

        Self::from_config(config).await
    }

    /// Overrides how long received messages stay hidden from other
    /// consumers. `None` leaves the queue's own default in place.
    pub fn visibility_timeout(mut self, seconds: Option<i32>) -> Self {
        self.visibility_timeout = seconds;
        self
    }
}

/// Pulls the primary service error message out of an SDK error when there is
/// one; transport-level failures fall back to the outer error.
fn describe_sdk_error<E: std::fmt::Display>(e: &SdkError<E>) -> String {
    match e {
        SdkError::ServiceError(se) => se.err().to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn resolve_queue_url(&self, name: &str) -> Result<String, CopyError> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(name)
            .send()
            .await
            .map_err(|e| CopyError::QueueNotFound(format!("{name}: {}", describe_sdk_error(&e))))?;

        output
            .queue_url
            .ok_or_else(|| CopyError::QueueNotFound(name.to_string()))
    }

    async fn receive(
        &self,
        queue_url: &str,
        max_messages: BatchSize,
    ) -> Result<Vec<ReceivedMessage>, CopyError> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages.get())
            .set_visibility_timeout(self.visibility_timeout)
            .send()
            .await
            .map_err(|e| CopyError::Receive(describe_sdk_error(&e)))?;

        let mut messages = Vec::new();
        for message in output.messages.unwrap_or_default() {
            let receipt_handle = message.receipt_handle.ok_or_else(|| {
                CopyError::Receive("received a message without a receipt handle".to_string())
            })?;
            messages.push(ReceivedMessage {
                body: message.body.unwrap_or_default(),
                receipt_handle,
            });
        }

        Ok(messages)
    }

    async fn send(&self, queue_url: &str, body: &str) -> Result<(), CopyError> {
        self.client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| CopyError::Forward(describe_sdk_error(&e)))?;

        Ok(())
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), CopyError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| CopyError::Delete(describe_sdk_error(&e)))?;

        Ok(())
    }
}
