use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{ColumnDef, LeafColumnDef, Pinned};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Olympic-winners style definitions used across tests:
///
/// ```text
/// athlete: name, age
/// country
/// medals: gold, silver
/// ```
pub fn olympic_defs() -> Vec<ColumnDef> {
    vec![
        ColumnDef::group(
            "athlete",
            vec![ColumnDef::leaf("name"), ColumnDef::leaf("age")],
        ),
        ColumnDef::leaf("country"),
        ColumnDef::group(
            "medals",
            vec![ColumnDef::leaf("gold"), ColumnDef::leaf("silver")],
        ),
    ]
}

/// Same as `olympic_defs`, with `name` pinned left and `silver` pinned right.
pub fn pinned_olympic_defs() -> Vec<ColumnDef> {
    vec![
        ColumnDef::group(
            "athlete",
            vec![
                LeafColumnDef::new("name").pinned(Pinned::Left).into(),
                ColumnDef::leaf("age"),
            ],
        ),
        ColumnDef::leaf("country"),
        ColumnDef::group(
            "medals",
            vec![
                ColumnDef::leaf("gold"),
                LeafColumnDef::new("silver").pinned(Pinned::Right).into(),
            ],
        ),
    ]
}
