use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use viewport::backend::{WgpuBackendFactory, WinitDriver};
use viewport::cli::Cli;
use viewport::core::input::NullInputPump;
use viewport::{Platform, PlatformWindow, WindowConfig};

fn load_config(cli: &Cli) -> Result<WindowConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            WindowConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => WindowConfig::default(),
    };
    cli.apply(&mut config);
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let platform = Platform::current();
    info!("starting on {platform:?}");

    let driver = WinitDriver::new().context("windowing subsystem unavailable")?;
    let factory = WgpuBackendFactory::new();
    let mut window = PlatformWindow::create(
        platform,
        Box::new(driver),
        &factory,
        Box::new(NullInputPump),
        &config,
    )
    .context("window construction failed")?;

    let state = window.state();
    let geometry = state.snapshot();
    println!(
        "window: {}x{} native, {}x{} surface, scale {} (profile {})",
        geometry.native_size.width,
        geometry.native_size.height,
        geometry.surface_size.width,
        geometry.surface_size.height,
        geometry.native_scale,
        window.context_profile(),
    );

    state.notifier().subscribe(|change| {
        println!(
            "scale change: native {} -> {}, effective {} -> {}",
            change.old_native_scale,
            change.new_native_scale,
            change.old_effective_scale,
            change.new_effective_scale
        );
    });

    // Exercise the render path once before tearing down
    if let Some(context) = window.graphics() {
        context
            .submit(Box::new(|| info!("first frame task ran")))
            .context("render submission failed")?;
    }

    window.dispose();
    Ok(())
}
