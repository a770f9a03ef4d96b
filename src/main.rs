use kestrel_selection_history::cli::CliOverrides;
use kestrel_selection_history::run_with_overrides;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    let config_path = cli.config_path().cloned().unwrap_or_else(|| PathBuf::from("config/app.json"));
    if let Err(err) = run_with_overrides(cli.into_config_overrides(), config_path) {
        log::error!("Application error: {err:?}");
        std::process::exit(1);
    }
}
