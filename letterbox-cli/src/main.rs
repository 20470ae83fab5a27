//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = letterbox_cli::run() {
        eprintln!("letterbox: {err}");
        std::process::exit(1);
    }
}
