use demofetch_cli::cli;
use demofetch_core::{logging, DemoSet};

fn main() {
    let sink = logging::init();
    tracing::debug!(?sink, "logging ready");

    std::process::exit(cli::main_for(DemoSet::RedAlert));
}
