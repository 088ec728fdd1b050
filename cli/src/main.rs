use debugview_core::platform::mock::MockPlatform;
use debugview_core::{Config, DebugContext};
use log::{error, info};
use std::error::Error;
use std::rc::Rc;

mod cli;
mod logger;
mod plugins;
mod script;

use script::{Script, ScriptRunner};

fn main() {
    let args = cli::parse_args();

    if let Err(e) = logger::init_logger(args.quiet, args.verbose) {
        eprintln!("Failed to initialize logger: {e}");
    }

    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: cli::Args) -> Result<(), Box<dyn Error>> {
    info!("Starting DebugView {}", debugview_core::version());

    if args.write_default_config {
        let path = match args.config_path.clone() {
            Some(path) => path,
            None => Config::default_config_path().ok_or("Could not determine config directory")?,
        };
        Config::default().save_to_file(&path)?;
        info!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = if args.use_defaults {
        info!("Using default configuration");
        Config::default()
    } else {
        let config = Config::load(args.config_path.as_deref(), false)?;
        if let Some(path) = &config.config_path {
            info!("Loaded config from {}", path.display());
        }
        config
    };

    let script = Script::load(args.script.as_deref())?;

    if args.dry_run {
        info!(
            "Configuration and script are valid ({} steps)",
            script.steps.len()
        );
        return Ok(());
    }

    let platform = Rc::new(MockPlatform::new());
    platform.set_api_level(script.api_level);

    let context = DebugContext::install(platform.clone(), config, plugins::catalog())?;
    for name in &script.opt_in {
        context.screens().opt_in(name.clone());
    }

    let runner = ScriptRunner::new(&platform, &context);
    runner.run(&script.steps);
    runner.summarize();

    info!("DebugView stopped");
    Ok(())
}
