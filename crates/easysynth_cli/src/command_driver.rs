//! Render driver that runs an external renderer program per sequence.

use std::fs;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use easysynth_core::config::RendererSettings;
use easysynth_core::jobs::SequenceRenderJob;
use easysynth_core::models::{OutputImageResolution, TargetConfiguration};
use easysynth_core::render::{RenderDriver, RenderingFinished, StartError};

/// Number of stderr lines kept as the failure message.
const STDERR_TAIL_LINES: usize = 20;

/// Spawns the renderer for each job and reports its exit on a channel.
pub struct CommandRenderDriver {
    program: String,
    extra_args: Vec<String>,
    events: Sender<RenderingFinished>,
    busy: Arc<AtomicBool>,
    last_error: Arc<Mutex<String>>,
}

impl CommandRenderDriver {
    pub fn new(settings: &RendererSettings, events: Sender<RenderingFinished>) -> Self {
        Self {
            program: settings.program.clone(),
            extra_args: settings.extra_args.clone(),
            events,
            busy: Arc::new(AtomicBool::new(false)),
            last_error: Arc::new(Mutex::new(String::new())),
        }
    }
}

/// Command line arguments describing one job.
pub fn render_args(
    job: &SequenceRenderJob,
    config: &TargetConfiguration,
    resolution: OutputImageResolution,
) -> Vec<String> {
    let targets: Vec<String> = config
        .active_targets()
        .into_iter()
        .map(|kind| format!("{}:{}", kind.key(), config.format(kind)))
        .collect();

    let mut args = vec![
        "--sequence".to_string(),
        job.sequence().object_path.clone(),
        "--output".to_string(),
        job.output_directory().display().to_string(),
        "--resolution".to_string(),
        resolution.to_string(),
        "--targets".to_string(),
        targets.join(","),
        "--depth-range".to_string(),
        config.depth_range_meters().to_string(),
        "--flow-scale".to_string(),
        config.optical_flow_scale().to_string(),
    ];
    if let Some(material) = config.custom_material() {
        args.push("--material".to_string());
        args.push(material.to_string());
    }
    if config.export_camera_poses() {
        args.push("--camera-poses".to_string());
    }
    args
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

impl RenderDriver for CommandRenderDriver {
    fn start_render(
        &mut self,
        job: &SequenceRenderJob,
        config: &TargetConfiguration,
        resolution: OutputImageResolution,
    ) -> Result<(), StartError> {
        if self.busy.load(Ordering::SeqCst) {
            return Err(StartError::Busy);
        }
        if job.sequence().object_path.is_empty() {
            return Err(StartError::InvalidSequence(job.name().to_string()));
        }
        if config.active_targets().is_empty() {
            return Err(StartError::NothingToRender);
        }

        fs::create_dir_all(job.output_directory())
            .map_err(|e| StartError::output_directory(job.output_directory(), e.to_string()))?;

        let args = render_args(job, config, resolution);
        tracing::debug!(
            "Running: {} {} {}",
            self.program,
            self.extra_args.join(" "),
            args.join(" ")
        );

        let mut child = Command::new(&self.program)
            .args(&self.extra_args)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StartError::other(format!("Failed to run {}: {}", self.program, e)))?;

        self.busy.store(true, Ordering::SeqCst);
        self.last_error.lock().clear();

        let busy = Arc::clone(&self.busy);
        let last_error = Arc::clone(&self.last_error);
        let events = self.events.clone();
        let program = self.program.clone();

        thread::spawn(move || {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                if let Err(e) = pipe.read_to_string(&mut stderr) {
                    tracing::warn!("Failed to read {} stderr: {}", program, e);
                }
            }

            let success = match child.wait() {
                Ok(status) if status.success() => true,
                Ok(status) => {
                    let tail = stderr_tail(&stderr);
                    *last_error.lock() = if tail.is_empty() {
                        format!("{} exited with {}", program, status)
                    } else {
                        tail
                    };
                    false
                }
                Err(e) => {
                    *last_error.lock() = format!("Failed to wait for {}: {}", program, e);
                    false
                }
            };

            busy.store(false, Ordering::SeqCst);
            if events.send(RenderingFinished { success }).is_err() {
                tracing::warn!("Render finished after the host stopped listening");
            }
        });

        Ok(())
    }

    fn is_rendering(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn error_message(&self) -> String {
        self.last_error.lock().clone()
    }
}
