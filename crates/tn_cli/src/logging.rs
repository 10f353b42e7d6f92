use std::sync::Once;

use tracing::Level;

static INIT: Once = Once::new();

/// Install the global fmt subscriber once. `debug` lowers the level to DEBUG.
pub fn init_logging(debug: bool) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        let level = if debug { Level::DEBUG } else { Level::INFO };
        tracing_subscriber::fmt().with_max_level(level).with_target(debug).init();
    });
}
