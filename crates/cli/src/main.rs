use std::process::ExitCode;

fn main() -> ExitCode {
    clientsync_cli::run()
}
