use clap::Parser;
use qcopy::{BatchSize, Copier, CopyJob, SqsQueueClient};

#[cfg(test)]
mod test;

#[tokio::main]
pub async fn main() {
    env_logger::init();

    if let Err(e) = Cli::parse().run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[derive(Debug, Parser)]
#[command(name = "qcopy")]
#[command(about = "copy messages from one AWS SQS queue to another", long_about = None)]
pub struct Cli {
    /// Region the queues live in, e.g. eu-central-1
    region: String,

    /// Queue to copy messages from
    from_queue: String,

    /// Queue to copy messages to
    to_queue: String,

    /// Remove each message from the source queue after it is copied
    #[arg(long)]
    delete_source: bool,

    /// Messages to request per receive call (1-10)
    #[arg(long, default_value_t = 1)]
    batch_size: i32,

    /// Use static test credentials for a locally hosted queue service
    #[arg(long)]
    local: bool,

    /// Queue service endpoint, only meaningful together with --local
    #[arg(long)]
    endpoint: Option<String>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let batch_size = BatchSize::new(self.batch_size).map_err(anyhow::Error::msg)?;

        let client = if self.local {
            let endpoint = self.endpoint.as_deref().unwrap_or("http://localhost:4566");
            SqsQueueClient::local(endpoint, &self.region).await?
        } else {
            SqsQueueClient::from_env(&self.region).await?
        };

        let mut job = CopyJob::new(self.from_queue, self.to_queue);
        job.delete_after_copy = self.delete_source;
        job.max_messages_per_receive = batch_size;

        log::info!(
            "start copying messages from {} to {}",
            job.source_queue,
            job.dest_queue
        );

        let summary = Copier::new(client).run(&job).await?;
        println!("{}", serde_json::to_string(&summary)?);

        Ok(())
    }
}
