use std::process::ExitCode;

fn main() -> ExitCode {
    schemagen::logging::init();
    ExitCode::from(schemagen::cli::run(std::env::args_os()))
}
