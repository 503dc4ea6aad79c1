//! Binary entry point for the codegraft CLI.

fn main() {
    codegraft::cli::run();
}
