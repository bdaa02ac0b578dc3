// build.rs - TOML-driven compile-time constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    documents: DocumentLimits,
    identifiers: IdentifierLimits,
    composition: CompositionLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct DocumentLimits {
    max_document_size: u64,
    max_tree_depth: usize,
}

#[derive(serde::Deserialize)]
struct IdentifierLimits {
    max_id_attempts: usize,
    max_id_length: usize,
}

#[derive(serde::Deserialize)]
struct CompositionLimits {
    max_embedded_test_results: usize,
    max_sub_reports: usize,
    max_diagnostics: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_document: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ARF_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ARF_CONFIG_DIR");

    let profile = env::var("ARF_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("ARF_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of arf_core directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_DOCUMENT_SIZE: u64 = 2_000_000_000;
    const ABSOLUTE_MAX_ID_ATTEMPTS: usize = 1000;

    if config.documents.max_document_size > ABSOLUTE_MAX_DOCUMENT_SIZE {
        panic!("SECURITY: max_document_size exceeds absolute maximum");
    }

    if config.documents.max_tree_depth == 0 {
        panic!("max_tree_depth must be positive");
    }

    // Tailoring suffixes are rendered with three digits
    if config.identifiers.max_id_attempts > ABSOLUTE_MAX_ID_ATTEMPTS {
        panic!("max_id_attempts cannot exceed {}", ABSOLUTE_MAX_ID_ATTEMPTS);
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if config.logging.max_log_events_per_document > config.logging.log_buffer_size {
        panic!("max_log_events_per_document exceeds log_buffer_size");
    }

    if profile == "production" && config.documents.max_document_size > 500_000_000 {
        panic!("PRODUCTION: max_document_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod documents {{
        pub const MAX_DOCUMENT_SIZE: u64 = {};
        pub const MAX_TREE_DEPTH: usize = {};
    }}

    pub mod identifiers {{
        pub const MAX_ID_ATTEMPTS: usize = {};
        pub const MAX_ID_LENGTH: usize = {};
    }}

    pub mod composition {{
        pub const MAX_EMBEDDED_TEST_RESULTS: usize = {};
        pub const MAX_SUB_REPORTS: usize = {};
        pub const MAX_DIAGNOSTICS: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_DOCUMENT: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.documents.max_document_size,
        config.documents.max_tree_depth,
        config.identifiers.max_id_attempts,
        config.identifiers.max_id_length,
        config.composition.max_embedded_test_results,
        config.composition.max_sub_reports,
        config.composition.max_diagnostics,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_document,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
