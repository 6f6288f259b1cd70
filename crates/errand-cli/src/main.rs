use std::process::ExitCode;

fn main() -> ExitCode {
    match errand_core::run(std::env::args_os().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("errand: {err:#}");
            ExitCode::FAILURE
        }
    }
}
