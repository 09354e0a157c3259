//! Bounded offload pool for the report pipeline.
//!
//! Offloading keeps slow uploads from stalling the capture loop, but the
//! pool is bounded in both worker count and queue depth: when the queue is
//! full the report is dropped and logged instead of queueing without bound.

use std::io;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::detect::Detection;
use crate::frame::Frame;
use crate::report::{FrameSink, ReportOptions, ReportPipeline};

/// One cycle's report work: the detections and the frame they came from.
pub struct ReportJob {
    pub detections: Vec<Detection>,
    pub frame: Frame,
}

/// Fixed-size worker pool draining a bounded report queue.
pub struct ReportWorkerPool {
    tx: Option<Sender<ReportJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl ReportWorkerPool {
    /// Spawn `worker_count` workers over a queue of `queue_depth` jobs.
    ///
    /// Each worker gets its own pipeline from `make_sink` so sinks never
    /// need shared state.
    pub fn spawn<F>(
        worker_count: usize,
        queue_depth: usize,
        options: ReportOptions,
        make_sink: F,
    ) -> io::Result<Self>
    where
        F: Fn() -> Option<Box<dyn FrameSink>>,
    {
        let (tx, rx) = bounded::<ReportJob>(queue_depth);
        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let rx: Receiver<ReportJob> = rx.clone();
            let mut pipeline = ReportPipeline::new(options, make_sink());
            let handle = std::thread::Builder::new()
                .name(format!("report-{id}"))
                .spawn(move || {
                    while let Ok(mut job) = rx.recv() {
                        if let Err(err) = pipeline.process(&job.detections, &mut job.frame) {
                            log::warn!("report worker: {err}");
                        }
                    }
                })?;
            workers.push(handle);
        }
        Ok(Self {
            tx: Some(tx),
            workers,
        })
    }

    /// Hand a report job to the pool.
    ///
    /// Returns false when the queue is saturated (the job is dropped) or the
    /// pool is shut down.
    pub fn submit(&mut self, job: ReportJob) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        match tx.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("report queue full; dropping this frame's report");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Close the queue and wait for in-flight reports to finish.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.tx.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::warn!("report worker panicked");
            }
        }
    }
}

impl Drop for ReportWorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CycleError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Sink that announces pick-up, then parks until the test releases it.
    struct BlockingSink {
        started: crossbeam_channel::Sender<()>,
        gate: crossbeam_channel::Receiver<()>,
        deliveries: Arc<AtomicUsize>,
    }

    impl FrameSink for BlockingSink {
        fn deliver(&mut self, _frame: &Frame) -> Result<(), CycleError> {
            let _ = self.started.send(());
            let _ = self.gate.recv();
            self.deliveries.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn job() -> ReportJob {
        ReportJob {
            detections: vec![Detection { x: 1, y: 1, w: 2, h: 2 }],
            frame: Frame::solid([0, 0, 0], 8, 8),
        }
    }

    struct Harness {
        started: crossbeam_channel::Receiver<()>,
        release: crossbeam_channel::Sender<()>,
        deliveries: Arc<AtomicUsize>,
    }

    fn blocking_pool(worker_count: usize, queue_depth: usize) -> (ReportWorkerPool, Harness) {
        let (started_tx, started_rx) = crossbeam_channel::unbounded::<()>();
        let (release_tx, release_rx) = crossbeam_channel::unbounded::<()>();
        let deliveries = Arc::new(AtomicUsize::new(0));
        let sink_deliveries = deliveries.clone();

        let pool = ReportWorkerPool::spawn(
            worker_count,
            queue_depth,
            ReportOptions::default(),
            move || {
                Some(Box::new(BlockingSink {
                    started: started_tx.clone(),
                    gate: release_rx.clone(),
                    deliveries: sink_deliveries.clone(),
                }) as Box<dyn FrameSink>)
            },
        )
        .unwrap();

        (
            pool,
            Harness {
                started: started_rx,
                release: release_tx,
                deliveries,
            },
        )
    }

    #[test]
    fn saturated_queue_drops_instead_of_growing() {
        let (mut pool, harness) = blocking_pool(1, 1);
        let wait = std::time::Duration::from_secs(5);

        // First job occupies the single worker...
        assert!(pool.submit(job()));
        harness.started.recv_timeout(wait).unwrap();
        // ...the second fills the one queue slot, so the third must drop.
        assert!(pool.submit(job()));
        assert!(!pool.submit(job()), "saturated queue must drop the report");

        harness.release.send(()).unwrap();
        harness.started.recv_timeout(wait).unwrap();
        harness.release.send(()).unwrap();

        pool.shutdown();
        assert_eq!(harness.deliveries.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shutdown_waits_for_in_flight_reports() {
        let (mut pool, harness) = blocking_pool(2, 4);

        assert!(pool.submit(job()));
        assert!(pool.submit(job()));
        harness.release.send(()).unwrap();
        harness.release.send(()).unwrap();
        drop(harness.release);

        pool.shutdown();
        assert_eq!(harness.deliveries.load(Ordering::SeqCst), 2);
    }
}
