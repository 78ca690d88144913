use std::time::Duration;

use tokio::signal;

use recipegram::{
    config::Config,
    database::create_pool,
    jobs::{Job, JobQueue, NotificationHandler, RECIPE_PUBLISHED_KIND},
    repository::FollowRepository,
    telemetry::init_telemetry,
};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    let telemetry_guard = init_telemetry(&config)?;

    tracing::info!(environment = %config.environment, "Starting worker");

    let pool = create_pool(&config).await?;
    let job_queue = JobQueue::new(pool.clone());
    let follow_repo = FollowRepository::new(pool);

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            result = process_next(&job_queue, &follow_repo) => {
                match result {
                    Ok(true) => {}
                    Ok(false) => tokio::time::sleep(POLL_INTERVAL).await,
                    Err(e) => {
                        tracing::error!(error = %e, "Worker iteration failed");
                        tokio::time::sleep(POLL_INTERVAL).await;
                    }
                }
            }
        }
    }

    tracing::info!("Worker shutdown complete");
    telemetry_guard.shutdown();

    Ok(())
}

/// Claims and runs one job. Returns false when the queue is empty.
async fn process_next(
    job_queue: &JobQueue,
    follow_repo: &FollowRepository,
) -> anyhow::Result<bool> {
    let Some(job) = job_queue.dequeue().await? else {
        return Ok(false);
    };

    tracing::info!(job_id = job.id, kind = %job.kind, attempt = job.attempts, "Job claimed");

    match run_job(&job, follow_repo).await {
        Ok(()) => job_queue.complete(job.id).await?,
        Err(e) => {
            tracing::error!(job_id = job.id, error = %e, "Job failed");
            job_queue.fail(job.id, &e.to_string()).await?;
        }
    }

    Ok(true)
}

async fn run_job(job: &Job, follow_repo: &FollowRepository) -> anyhow::Result<()> {
    match job.kind.as_str() {
        RECIPE_PUBLISHED_KIND => NotificationHandler::handle(job, follow_repo).await,
        other => anyhow::bail!("Unknown job kind: {}", other),
    }
}
