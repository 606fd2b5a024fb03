#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = gridboard_cli::run_from_env() {
        tracing::error!(%error, exit_code = error.exit_code(), "command failed");
        eprintln!("gridboard: {error}");
        std::process::exit(error.exit_code());
    }
}
