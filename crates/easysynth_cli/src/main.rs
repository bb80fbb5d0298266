//! EasySynth - headless batch renderer and panel state editor.

mod command_driver;

use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};

use easysynth_core::config::{ConfigManager, Settings};
use easysynth_core::jobs::FsContentDirectory;
use easysynth_core::logging::{init_tracing, LogLevel};
use easysynth_core::models::{ImageFormat, RenderTargetKind};
use easysynth_core::orchestrator::{BatchOrchestrator, Notification, ReclaimAndSettle, Transition};
use easysynth_core::panel::ControlPanel;
use easysynth_core::persistence::{PanelState, PersistenceBridge, TomlRecordStore};

use command_driver::CommandRenderDriver;

#[derive(Parser, Debug)]
#[command(name = "easysynth", version, about)]
struct Cli {
    /// Settings file.
    #[arg(long, global = true, default_value = ".easysynth/settings.toml")]
    config: PathBuf,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every level sequence in a content folder.
    Render(RenderArgs),
    /// Print the saved panel state.
    Show(ShowArgs),
    /// Edit and save the panel state.
    Configure(ConfigureArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Content folder holding the level sequences.
    #[arg(long)]
    sequences: PathBuf,

    /// Base output directory; each sequence renders into a subfolder.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// Print as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ConfigureArgs {
    /// Select a render target (color, depth, normal, optical_flow, semantic).
    #[arg(long = "enable", value_name = "TARGET")]
    enable: Vec<RenderTargetKind>,

    /// Deselect a render target.
    #[arg(long = "disable", value_name = "TARGET")]
    disable: Vec<RenderTargetKind>,

    /// Output format of a target, e.g. `depth=exr`.
    #[arg(long = "format", value_name = "TARGET=FORMAT", value_parser = parse_format_choice)]
    formats: Vec<(RenderTargetKind, ImageFormat)>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Depth range in meters.
    #[arg(long)]
    depth_range: Option<f32>,

    /// Optical flow scale coefficient.
    #[arg(long)]
    flow_scale: Option<f32>,

    /// Object path of the custom post-process material.
    #[arg(long, conflicts_with = "clear_material")]
    material: Option<String>,

    /// Remove the custom post-process material.
    #[arg(long, default_value_t = false)]
    clear_material: bool,

    /// Export camera poses alongside the images.
    #[arg(long)]
    camera_poses: Option<bool>,

    /// Base output directory.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_format_choice(s: &str) -> Result<(RenderTargetKind, ImageFormat), String> {
    let (target, format) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TARGET=FORMAT, got '{}'", s))?;
    let target: RenderTargetKind = target.trim().parse().map_err(|e| format!("{}", e))?;
    let format: ImageFormat = format.trim().parse().map_err(|e| format!("{}", e))?;
    Ok((target, format))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("load settings '{}'", cli.config.display()))?;

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        config.settings().logging.level
    };
    init_tracing(level);

    config
        .ensure_dirs_exist()
        .context("create state and log folders")?;

    match cli.cmd {
        Command::Render(args) => cmd_render(&config, args),
        Command::Show(args) => cmd_show(&config, args),
        Command::Configure(args) => cmd_configure(&config, args),
    }
}

fn bridge(config: &ConfigManager) -> PersistenceBridge {
    PersistenceBridge::new(Box::new(TomlRecordStore::new(config.state_folder())))
}

fn print_notification(notification: Notification) {
    if notification.is_error() {
        eprintln!("{}\n{}", notification.title(), notification.message());
    } else {
        println!("{}\n{}", notification.title(), notification.message());
    }
}

fn cmd_render(config: &ConfigManager, args: RenderArgs) -> anyhow::Result<()> {
    let settings: &Settings = config.settings();
    let (tx, rx) = mpsc::channel();

    let driver = CommandRenderDriver::new(&settings.renderer, tx);
    let registry = FsContentDirectory::new(&settings.paths.content_root);

    let mut orchestrator = BatchOrchestrator::new(
        Box::new(driver),
        Box::new(registry),
        Box::new(print_notification),
    )
    .with_hook(Box::new(ReclaimAndSettle::from_settings(&settings.batch)));
    if settings.logging.batch_log_files {
        orchestrator =
            orchestrator.with_batch_logs(config.logs_folder(), settings.logging.log_config());
    }

    let mut panel = ControlPanel::new(bridge(config), orchestrator);
    panel.load_options().context("load panel state")?;

    panel.set_sequences_folder(&args.sequences);
    if let Some(output) = args.output {
        panel.set_output_directory(output);
    } else if panel.output_directory().as_os_str().is_empty() {
        panel.set_output_directory(&settings.paths.default_output_directory);
    }

    let mut transition = panel
        .on_render_clicked()
        .with_context(|| format!("start batch over '{}'", args.sequences.display()))?;

    loop {
        match transition {
            Transition::Started { total } => {
                tracing::info!("Batch started with {} sequences", total);
                report_current_job(&panel);
            }
            Transition::Advanced { index, total } => {
                tracing::info!("Advanced to sequence {}/{}", index + 1, total);
                report_current_job(&panel);
            }
            Transition::Completed { count } => {
                tracing::info!("Rendered {} sequences", count);
                return Ok(());
            }
            Transition::Aborted(reason) => bail!("batch aborted: {}", reason),
            Transition::SingleRenderFinished { success } => {
                if success {
                    return Ok(());
                }
                bail!("rendering failed");
            }
        }

        let event = rx.recv().context("renderer stopped without reporting")?;
        transition = panel.on_rendering_finished(event.success);
    }
}

fn report_current_job(panel: &ControlPanel) {
    if let Some(job) = panel.orchestrator().current_job() {
        println!("Rendering {} -> {}", job.name(), job.output_directory().display());
    }
}

fn load_state(config: &ConfigManager) -> anyhow::Result<PanelState> {
    let state = bridge(config).load().context("load panel state")?;
    Ok(state.unwrap_or_default())
}

fn cmd_show(config: &ConfigManager, args: ShowArgs) -> anyhow::Result<()> {
    let state = load_state(config)?;
    let targets = &state.targets;

    if args.json {
        let target_list: Vec<serde_json::Value> = RenderTargetKind::all()
            .iter()
            .map(|kind| {
                serde_json::json!({
                    "target": kind.key(),
                    "selected": targets.selected(*kind),
                    "format": targets.format(*kind).name(),
                })
            })
            .collect();
        let value = serde_json::json!({
            "targets": target_list,
            "camera_poses": targets.export_camera_poses(),
            "depth_range_meters": targets.depth_range_meters(),
            "optical_flow_scale": targets.optical_flow_scale(),
            "custom_material": targets.custom_material(),
            "width": state.resolution.width(),
            "height": state.resolution.height(),
            "output_directory": state.output_directory.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for kind in RenderTargetKind::all() {
        let mark = if targets.selected(*kind) { "x" } else { " " };
        println!("[{}] {:<24} {}", mark, kind.label(), targets.format(*kind));
    }
    println!("Camera poses:       {}", targets.export_camera_poses());
    println!("Custom material:    {}", targets.custom_material().unwrap_or("-"));
    println!("Depth range:        {} m", targets.depth_range_meters());
    println!("Optical flow scale: {}", targets.optical_flow_scale());
    println!(
        "Resolution:         {} (aspect {:.3})",
        state.resolution,
        state.resolution.aspect_ratio()
    );
    println!("Output directory:   {}", state.output_directory.display());
    Ok(())
}

fn cmd_configure(config: &ConfigManager, args: ConfigureArgs) -> anyhow::Result<()> {
    let mut state = load_state(config)?;
    let targets = &mut state.targets;

    for kind in args.enable {
        targets.set_selected(kind, true);
    }
    for kind in args.disable {
        targets.set_selected(kind, false);
    }
    for (kind, format) in args.formats {
        targets.set_format(kind, format);
    }
    if let Some(meters) = args.depth_range {
        targets.set_depth_range_meters(meters);
    }
    if let Some(scale) = args.flow_scale {
        targets.set_optical_flow_scale(scale);
    }
    if let Some(material) = args.material {
        targets.set_custom_material(Some(material));
    } else if args.clear_material {
        targets.set_custom_material(None);
    }
    if let Some(export) = args.camera_poses {
        targets.set_export_camera_poses(export);
    }
    if let Some(width) = args.width {
        state.resolution.set_width(width);
    }
    if let Some(height) = args.height {
        state.resolution.set_height(height);
    }
    if let Some(output) = args.output {
        state.output_directory = output;
    }

    bridge(config)
        .save(&state)
        .context("save panel state")?;
    println!("Saved panel state to {}", config.state_folder().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_choice_parses_pairs() {
        assert_eq!(
            parse_format_choice("depth=exr").unwrap(),
            (RenderTargetKind::DepthImage, ImageFormat::Exr)
        );
        assert!(parse_format_choice("depth").is_err());
        assert!(parse_format_choice("depth=gif").is_err());
    }

    #[test]
    fn cli_parses_configure_flags() {
        let cli = Cli::try_parse_from([
            "easysynth",
            "configure",
            "--enable",
            "color",
            "--enable",
            "semantic",
            "--format",
            "color=png",
            "--camera-poses",
            "true",
        ])
        .unwrap();

        let Command::Configure(args) = cli.cmd else {
            panic!("expected configure");
        };
        assert_eq!(
            args.enable,
            [RenderTargetKind::ColorImage, RenderTargetKind::SemanticImage]
        );
        assert_eq!(args.camera_poses, Some(true));
    }

    #[test]
    fn cli_rejects_conflicting_material_flags() {
        let result = Cli::try_parse_from([
            "easysynth",
            "configure",
            "--material",
            "/Game/M_Mask",
            "--clear-material",
        ]);
        assert!(result.is_err());
    }
}
