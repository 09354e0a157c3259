//! watchpostd - camera sentry daemon
//!
//! This daemon:
//! 1. Resolves configuration (defaults, optional JSON file, env, CLI flags)
//! 2. Opens the camera source and the configured detector backend
//! 3. Runs the capture loop: frame -> debounce gate -> detector -> report
//! 4. Reports run inline, or on the bounded worker pool with --threading
//! 5. Stops on Ctrl-C, draining in-flight reports before exit

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use watchpost::ui::Ui;
use watchpost::{
    select_backend, CameraConfig, CameraSource, CycleError, DetectMode, DetectionGate, Detector,
    FrameSink, ReportJob, ReportOptions, ReportPipeline, ReportWorkerPool, TcpUploader,
    UploadConfig, WatchConfig,
};

const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Fixed report pool size; saturation drops the report rather than spawning
/// more threads.
const REPORT_WORKERS: usize = 2;
const REPORT_QUEUE_DEPTH: usize = 4;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Highlight detected targets in the captured frame.
    #[arg(long)]
    highlight: bool,
    /// Log each detection to the console.
    #[arg(long)]
    console: bool,
    /// Detect faces (the default mode detects people).
    #[arg(long)]
    faces: bool,
    /// Disable uploading frames to the collector server.
    #[arg(long)]
    noserver: bool,
    /// Offload the report pipeline to a bounded worker pool.
    #[arg(long)]
    threading: bool,
    /// Hostname of the collector server (default 127.0.0.1).
    #[arg(short = 's', value_name = "HOST")]
    server: Option<String>,
    /// Port the collector server listens on (default 8000).
    #[arg(short = 'p', value_name = "PORT")]
    port: Option<u16>,
    /// Debounce timeout between detection attempts, in seconds (default 10).
    #[arg(short = 't', value_name = "SECONDS")]
    debounce_secs: Option<u64>,
    /// Camera device path, or stub:// for the synthetic source.
    #[arg(long, value_name = "PATH")]
    device: Option<String>,
    /// Cascade model file for faces mode.
    #[arg(long, value_name = "PATH")]
    cascade: Option<String>,
    /// UI mode for stderr progress (auto|plain|pretty).
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = WatchConfig::load()?;
    apply_cli(&mut cfg, &args);
    let ui = Ui::from_flag(&args.ui);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("install shutdown handler")?;
    }

    let mut source = {
        let _stage = ui.stage("Open camera");
        let mut source = CameraSource::new(CameraConfig {
            device: cfg.camera.device.clone(),
            target_fps: cfg.camera.target_fps,
            width: cfg.camera.width,
            height: cfg.camera.height,
        })?;
        source.connect()?;
        source
    };

    let mut detector = {
        let _stage = ui.stage("Load detector");
        let mut detector = select_backend(cfg.mode, &cfg.cascade_path)?;
        detector.warm_up()?;
        detector
    };

    let options = ReportOptions {
        highlight: cfg.highlight,
        console: cfg.console,
    };
    let upload_config = UploadConfig {
        server: cfg.server.clone(),
        port: cfg.port,
    };

    let mut pool = if cfg.threading {
        let upload = cfg.upload;
        let pool_upload_config = upload_config.clone();
        let pool = ReportWorkerPool::spawn(REPORT_WORKERS, REPORT_QUEUE_DEPTH, options, move || {
            upload
                .then(|| Box::new(TcpUploader::new(pool_upload_config.clone())) as Box<dyn FrameSink>)
        })
        .context("spawn report workers")?;
        Some(pool)
    } else {
        None
    };
    let mut inline_pipeline =
        ReportPipeline::new(options, cfg.upload.then(|| TcpUploader::new(upload_config)));

    let mut gate = DetectionGate::new(cfg.debounce);
    let frame_interval = Duration::from_millis(1000 / cfg.camera.target_fps.max(1) as u64);

    log::info!(
        "watchpostd running: mode={:?} collector={}:{} upload={} debounce={}s",
        cfg.mode,
        cfg.server,
        cfg.port,
        cfg.upload,
        cfg.debounce.as_secs()
    );

    let mut last_health_log = Instant::now();
    while running.load(Ordering::SeqCst) {
        let mut frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(err) => {
                // Capture failures skip the cycle, never the loop.
                log::warn!("{}", CycleError::Capture(err));
                std::thread::sleep(frame_interval);
                continue;
            }
        };

        if gate.should_run(Instant::now()) {
            let luma = frame.to_luma();
            let detections = match detector.detect(&luma, frame.width(), frame.height()) {
                Ok(detections) => detections,
                Err(cause) => {
                    // Detector failure counts as zero detections this cycle.
                    log::warn!(
                        "{}",
                        CycleError::Detector {
                            backend: detector.name(),
                            cause,
                        }
                    );
                    Vec::new()
                }
            };
            if !detections.is_empty() {
                log::info!("{} detection(s) this cycle", detections.len());
            }

            match &mut pool {
                Some(pool) => {
                    if !detections.is_empty() {
                        pool.submit(ReportJob { detections, frame });
                    }
                }
                None => {
                    if let Err(err) = inline_pipeline.process(&detections, &mut frame) {
                        log::warn!("{err}");
                    }
                }
            }
        }

        if last_health_log.elapsed() >= HEALTH_LOG_INTERVAL {
            let stats = source.stats();
            log::info!(
                "camera health={} frames={} device={}",
                source.is_healthy(),
                stats.frames_captured,
                stats.device
            );
            last_health_log = Instant::now();
        }

        std::thread::sleep(frame_interval);
    }

    if let Some(pool) = pool {
        let _stage = ui.stage("Drain report queue");
        pool.shutdown();
    }
    log::info!(
        "watchpostd stopped after {} frames",
        source.stats().frames_captured
    );
    Ok(())
}

fn apply_cli(cfg: &mut WatchConfig, args: &Args) {
    if args.highlight {
        cfg.highlight = true;
    }
    if args.console {
        cfg.console = true;
    }
    if args.faces {
        cfg.mode = DetectMode::Faces;
    }
    if args.noserver {
        cfg.upload = false;
    }
    if args.threading {
        cfg.threading = true;
    }
    if let Some(server) = &args.server {
        cfg.server = server.clone();
    }
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(secs) = args.debounce_secs {
        cfg.debounce = Duration::from_secs(secs);
    }
    if let Some(device) = &args.device {
        cfg.camera.device = device.clone();
    }
    if let Some(cascade) = &args.cascade {
        cfg.cascade_path = cascade.clone();
    }
}
