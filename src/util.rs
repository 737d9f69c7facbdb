pub mod log {
    use std::sync::Once;

    use tracing_subscriber::{fmt::time::OffsetTime, EnvFilter};

    pub fn init() {
        static ONCE: Once = Once::new();
        ONCE.call_once(|| {
            let builder = tracing_subscriber::fmt().with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| "trace".into()),
            );

            // Local offset can only be determined in single threaded environment.
            let local_timer = if cfg!(test) {
                None
            } else {
                OffsetTime::local_rfc_3339().ok()
            };

            let result = match local_timer {
                Some(timer) => builder.with_timer(timer).try_init(),
                None => builder.try_init(),
            };
            if let Err(e) = result {
                eprintln!("tracing subscriber already set: {e}");
            }
        })
    }
}
