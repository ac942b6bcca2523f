use std::process::ExitCode;

fn main() -> ExitCode {
    // Keep stderr quiet by default: the TUI owns the terminal.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match sales_dash::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("exiting with {err:?}");
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
