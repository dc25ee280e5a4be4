use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use engine_core::{default_plugin_path, App};
use engine_shared::ASSETS_DIR_ENV;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    // king_donkey [plugin-path] [assets-dir]
    let args: Vec<String> = env::args().collect();
    let plugin_path = args.get(1).map(PathBuf::from).unwrap_or_else(default_plugin_path);
    let assets_dir = args.get(2).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("assets"));

    // The module reads its asset directory from the environment.
    env::set_var(ASSETS_DIR_ENV, &assets_dir);

    match App::new(plugin_path, assets_dir).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "engine stopped");
            ExitCode::FAILURE
        }
    }
}
