// =============================================================================
// Logging Setup Tests
// =============================================================================
// Runs in its own test binary: the global subscriber can be installed once per process.

use artifact_gen::{
    EmbeddedResourceStore, LogFormat, LogOutput, LoggingConfig, TemplateResolver, TeraEngine,
    init_logging, logging::LOG_FILE_PREFIX,
};
use std::fs;
use tracing_appender::rolling::Rotation;

#[test]
fn directory_output_installs_once_and_flushes_on_guard_drop() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log_dir = dir.path().join("logs");
    let config = LoggingConfig {
        format: LogFormat::Json,
        output: LogOutput::Directory {
            dir: log_dir.clone(),
            rotation: Rotation::NEVER,
        },
        filter: "artifact_gen=debug,logging_tests=debug".to_string(),
    };

    let guard = init_logging(config.clone()).expect("first initialization");

    let resolver = TemplateResolver::new(
        EmbeddedResourceStore::from_static(&[("greeting.tmpl", "Hello, {{name}}!")]),
        TeraEngine::new(),
    );
    resolver.resolve("greeting.tmpl").expect("resolve");
    resolver.resolve("greeting.tmpl").expect("resolve again");

    let second = init_logging(config);
    let err = second.expect_err("a second subscriber must be rejected");
    assert!(err.to_string().contains("already installed"));

    drop(guard);

    let contents = fs::read_to_string(log_dir.join(LOG_FILE_PREFIX)).expect("log file");
    assert!(contents.contains("logging initialized"));
    assert!(contents.contains("template cache lookup"));
    assert!(contents.contains("greeting.tmpl"));
    for line in contents.lines() {
        serde_json::from_str::<serde_json::Value>(line).expect("one JSON object per line");
    }
}

#[test]
fn invalid_filter_is_rejected_before_installing() {
    let config = LoggingConfig {
        filter: "artifact_gen=notalevel".to_string(),
        ..LoggingConfig::default()
    };
    let err = init_logging(config).expect_err("filter must not parse");
    assert!(err.to_string().contains("invalid log filter"));
}
