pub mod command;
pub mod config;
pub mod controller;
pub mod model;
pub mod swapi;
pub mod view;

/// Install the stderr log subscriber shared by the binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
