//! Naming conventions shared by schema assembly and lazy lookup

use regex::Regex;
use std::sync::LazyLock;

static UPPER_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());
static LOWER_UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Prefix given to synthesised lazy record types.
pub const LAZY_PREFIX: &str = "Lazy";

/// Prefix every root (global) record type name must carry.
pub const GLOBAL_PREFIX: &str = "Global";

/// Convert a CamelCase type name to the snake_case field name it is
/// injected under, e.g. `PathPlanningConfig` -> `path_planning_config`.
pub fn camel_to_snake(name: &str) -> String {
    let spaced = UPPER_WORD.replace_all(name, "${1}_${2}");
    LOWER_UPPER.replace_all(&spaced, "${1}_${2}").to_lowercase()
}

/// Default name of the lazy counterpart of `base`.
pub fn lazy_type_name(base: &str) -> String {
    format!("{}{}", LAZY_PREFIX, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PathPlanningConfig", "path_planning_config")]
    #[case("GlobalPipelineConfig", "global_pipeline_config")]
    #[case("Path", "path")]
    #[case("HTTPServerConfig", "http_server_config")]
    #[case("Step2Config", "step2_config")]
    #[case("already_snake", "already_snake")]
    fn test_camel_to_snake(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(camel_to_snake(input), expected);
    }

    #[test]
    fn test_lazy_type_name() {
        assert_eq!(lazy_type_name("StepConfig"), "LazyStepConfig");
    }
}
