pub mod cache;
pub mod config;
pub mod errors;
pub mod flow;
pub mod framework;
pub mod plugin;
pub mod view;

#[cfg(test)]
mod test_setup {
    use std::sync::Once;
    static INIT: Once = Once::new();

    #[ctor::ctor]
    fn init_tracing() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .init();
        });
    }
}
