use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match tzlinkd::run_daemon().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("tzlinkd: {error}");
            ExitCode::FAILURE
        }
    }
}
