pub mod app_error;
pub mod cli;
pub mod config;
pub mod github;
pub mod model;
pub mod output;
pub mod report;
pub mod timestamp;
pub mod version;

pub fn run() -> i32 {
    match cli::run_cli() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}", output::failure(&err.to_string()));
            err.code()
        }
    }
}
