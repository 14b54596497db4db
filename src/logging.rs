use env_logger::{Env, Target};

/// stderr only; stdout carries the report stream.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .format_timestamp_millis()
        .init();
}
