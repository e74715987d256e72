//! Concurrency tests
//!
//! Many producers and consumers on one queue, many callers blocked in
//! await_all, and a pool of workers driven by a mock executor.

use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use workq_core::application::worker::{shutdown_channel, Worker};
use workq_core::port::job_executor::mocks::{MockBehavior, MockJobExecutor};
use workq_core::{Interest, JobId, SubmitRequest, WorkQueue};

const PRODUCERS: usize = 8;
const JOBS_PER_PRODUCER: usize = 50;
const CONSUMERS: usize = 6;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_job_taken_exactly_once() {
    let queue = Arc::new(WorkQueue::new());
    let total = PRODUCERS * JOBS_PER_PRODUCER;

    // Consumers start first so most jobs go through direct hand-off.
    let mut consumers = Vec::new();
    for c in 0..CONSUMERS {
        let queue = Arc::clone(&queue);
        consumers.push(tokio::spawn(async move {
            let interest = if c % 2 == 0 {
                Interest::any()
            } else {
                Interest::of(["even", "odd"])
            };
            let mut taken = Vec::new();
            while let Some(job) = queue
                .take_timeout(interest.clone(), Duration::from_millis(300))
                .await
                .unwrap()
            {
                taken.push(job.id);
            }
            taken
        }));
    }

    let mut producers = JoinSet::new();
    for p in 0..PRODUCERS {
        let queue = Arc::clone(&queue);
        producers.spawn(async move {
            let mut ids = Vec::new();
            for n in 0..JOBS_PER_PRODUCER {
                let channel = if n % 2 == 0 { "even" } else { "odd" };
                ids.push(queue.submit(
                    SubmitRequest::new("work")
                        .channel(channel)
                        .priority((n % 5) as i64)
                        .payload(json!({ "producer": p, "n": n })),
                ));
                if n % 10 == 0 {
                    tokio::task::yield_now().await;
                }
            }
            ids
        });
    }

    let mut submitted: HashSet<JobId> = HashSet::new();
    while let Some(ids) = producers.join_next().await {
        submitted.extend(ids.unwrap());
    }
    assert_eq!(submitted.len(), total, "ids must be unique");

    let mut taken = Vec::new();
    for consumer in consumers {
        taken.extend(consumer.await.unwrap());
    }

    let unique: HashSet<_> = taken.iter().cloned().collect();
    assert_eq!(taken.len(), total, "no job may be taken twice");
    assert_eq!(unique, submitted);

    let report = queue.snapshot();
    assert!(report.is_idle());
    assert_eq!(report.waiting, 0);
    assert_eq!(report.submitted, total as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_waiters_on_the_same_jobs() {
    let queue = Arc::new(WorkQueue::new());
    let ids: Vec<JobId> = (0..5)
        .map(|_| queue.submit(SubmitRequest::new("work")))
        .collect();

    let mut waiters = Vec::new();
    for _ in 0..20 {
        let queue = Arc::clone(&queue);
        let ids = ids.clone();
        waiters.push(tokio::spawn(async move { queue.await_all(&ids).await }));
    }

    tokio::time::sleep(Duration::from_millis(20)).await;
    for (n, id) in ids.iter().enumerate().rev() {
        queue.complete(id, Some(json!(n)), None).unwrap();
    }

    for waiter in waiters {
        let jobs = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter must wake")
            .unwrap()
            .unwrap();
        let results: Vec<_> = jobs.iter().map(|j| j.result.clone()).collect();
        assert_eq!(
            results,
            (0..5).map(|n| Some(json!(n))).collect::<Vec<_>>()
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelled_takes_never_lose_jobs() {
    let queue = Arc::new(WorkQueue::new());

    // Consumers that give up almost immediately, racing with submissions.
    let mut impatient = Vec::new();
    for _ in 0..20 {
        let queue = Arc::clone(&queue);
        impatient.push(tokio::spawn(async move {
            let mut taken = Vec::new();
            for _ in 0..20 {
                if let Some(job) = queue
                    .take_timeout(Interest::of(["c"]), Duration::from_micros(200))
                    .await
                    .unwrap()
                {
                    taken.push(job.id);
                }
            }
            taken
        }));
    }

    let mut submitted = HashSet::new();
    for _ in 0..200 {
        submitted.insert(queue.submit(SubmitRequest::new("work").channel("c")));
        tokio::task::yield_now().await;
    }

    let mut taken = Vec::new();
    for task in impatient {
        taken.extend(task.await.unwrap());
    }
    // Whatever the impatient consumers missed is still queued.
    while let Some(job) = queue
        .take_timeout(Interest::of(["c"]), Duration::from_millis(50))
        .await
        .unwrap()
    {
        taken.push(job.id);
    }

    let unique: HashSet<_> = taken.iter().cloned().collect();
    assert_eq!(taken.len(), submitted.len());
    assert_eq!(unique, submitted);
    assert_eq!(queue.snapshot().waiting, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_pool_drains_queue_and_shuts_down() {
    let queue = Arc::new(WorkQueue::new());
    let executor = Arc::new(MockJobExecutor::new(MockBehavior::Slow(
        Duration::from_millis(2),
    )));

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let mut workers = Vec::new();
    for n in 0..4 {
        let worker = Worker::new(
            format!("worker-{}", n),
            Arc::clone(&queue),
            Interest::of(["render"]),
            executor.clone(),
        );
        let token = shutdown_rx.clone();
        workers.push(tokio::spawn(async move { worker.run(token).await }));
    }

    let ids: Vec<JobId> = (0..40)
        .map(|n| {
            queue.submit(
                SubmitRequest::new("render")
                    .channel("render")
                    .priority(n % 3)
                    .payload(json!(n)),
            )
        })
        .collect();

    let jobs = tokio::time::timeout(Duration::from_secs(10), queue.await_all(&ids))
        .await
        .expect("workers must finish every job")
        .unwrap();
    for (n, job) in jobs.iter().enumerate() {
        assert!(job.succeeded());
        assert_eq!(job.result, Some(json!(n)));
    }
    assert_eq!(executor.call_count(), 40);

    shutdown_tx.shutdown();
    for worker in workers {
        let stopped = tokio::time::timeout(Duration::from_secs(2), worker)
            .await
            .expect("worker must stop on shutdown");
        assert!(stopped.unwrap().is_ok());
    }
    assert_eq!(queue.snapshot().waiting, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_panicking_job_does_not_stall_pool() {
    let queue = Arc::new(WorkQueue::new());
    let executor = Arc::new(MockJobExecutor::new_panic_inducing("boom"));

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let worker = Worker::new(
        "solo",
        Arc::clone(&queue),
        Interest::any(),
        executor.clone(),
    );
    let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    let ids: Vec<JobId> = (0..3)
        .map(|_| queue.submit(SubmitRequest::new("explode")))
        .collect();

    let jobs = tokio::time::timeout(Duration::from_secs(5), queue.await_all(&ids))
        .await
        .expect("panics must still complete jobs")
        .unwrap();
    for job in &jobs {
        assert!(job.done);
        assert_eq!(job.error, Some(json!("panicked: boom")));
    }
    assert_eq!(executor.seen(), ids);

    shutdown_tx.shutdown();
    assert!(handle.await.unwrap().is_ok());
}
