//! End-to-end assembly scenarios
//!
//! Each test lays out a program tree on disk, discovers it with the real
//! directory walker and assembles it through `assemble_program`.

use mbed_config::{AssemblyOptions, Config, Error, Result, assemble_program};
use mbed_fs::{FileDiscovery, NormalizedPath, WalkDiscovery};
use mbed_test_utils::program::TestProgram;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::BTreeSet;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Assemble `program` against the target descriptor it carries.
fn assemble(program: &TestProgram, target: Value) -> Result<Config> {
    let target_file = program.write_target(target);
    assemble_program(
        &target_file,
        &program.normalized_root(),
        &WalkDiscovery::new(),
        &AssemblyOptions::default(),
    )
}

/// Discovery that only reports a fixed list of files.
struct ListedDiscovery {
    files: Vec<NormalizedPath>,
}

impl FileDiscovery for ListedDiscovery {
    fn discover(&self, file_name: &str, _root: &NormalizedPath) -> mbed_fs::Result<Vec<NormalizedPath>> {
        Ok(self
            .files
            .iter()
            .filter(|path| path.file_name() == Some(file_name))
            .cloned()
            .collect())
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn feature_added_in_first_pass_enables_library_in_second() {
    let program = TestProgram::new();
    program.write_library(
        "FEATURE_A/lib",
        json!({
            "name": "lib",
            "config": {"size": 10},
            "target_overrides": {"*": {"target.features_add": ["B"]}}
        }),
    );
    program.write_library("FEATURE_B/lib2", json!({"name": "lib2", "config": {"count": 2}}));

    let config = assemble(&program, json!({"features": ["A"]})).unwrap();

    assert_eq!(config.target_metadata.features(), &set(&["A", "B"]));
    assert_eq!(config.value("lib.size"), Some(&json!(10)));
    assert_eq!(config.value("lib2.count"), Some(&json!(2)));
}

#[test]
fn override_without_help_keeps_declared_help() {
    let program = TestProgram::new();
    program.write_library(
        "lib",
        json!({"name": "lib", "config": {"x": {"value": 1, "help": "H"}}}),
    );
    program.write_app(json!({"target_overrides": {"*": {"lib.x": 99}}}));

    let config = assemble(&program, json!({})).unwrap();

    let option = config.option("lib.x").unwrap();
    assert_eq!(option.value, json!(99));
    assert_eq!(option.help_text.as_deref(), Some("H"));
    assert!(option.set_by.ends_with("mbed_app.json"));
}

#[test]
fn override_of_undeclared_key_aborts() {
    let program = TestProgram::new();
    program.write_library(
        "lib",
        json!({"name": "lib", "target_overrides": {"*": {"z": 1}}}),
    );

    match assemble(&program, json!({})).unwrap_err() {
        Error::UnknownConfigKey { key, origin } => {
            assert_eq!(key, "lib.z");
            assert!(origin.ends_with("lib/mbed_lib.json"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn add_then_remove_in_sequence() {
    let program = TestProgram::new();
    program.write_library(
        "lib",
        json!({
            "name": "lib",
            "target_overrides": {"*": {
                "target.features_add": ["P", "Q"],
                "target.features_remove": ["Q"]
            }}
        }),
    );

    let config = assemble(&program, json!({})).unwrap();
    assert_eq!(config.target_metadata.features(), &set(&["P"]));
}

#[test]
fn feature_like_key_is_a_plain_setting() {
    let program = TestProgram::new();
    program.write_library(
        "lib",
        json!({
            "name": "lib",
            "config": {"my-feature-flag": false},
            "target_overrides": {"*": {"my-feature-flag": true}}
        }),
    );

    let config = assemble(&program, json!({"features": ["A"]})).unwrap();

    assert_eq!(config.value("lib.my-feature-flag"), Some(&json!(true)));
    assert_eq!(config.target_metadata.features(), &set(&["A"]));
    assert_eq!(
        config.option("lib.my-feature-flag").unwrap().macro_name,
        "MBED_CONF_LIB_MY_FEATURE_FLAG"
    );
}

#[test]
fn target_setting_macro_name_is_derived() {
    let program = TestProgram::new();

    let config = assemble(&program, json!({"config": {"stack-size": 4096}})).unwrap();

    let option = config.option("target.stack-size").unwrap();
    assert_eq!(option.macro_name, "MBED_CONF_TARGET_STACK_SIZE");
    assert_eq!(option.value, json!(4096));
}

// =============================================================================
// Whole programs
// =============================================================================

#[test]
fn header_entries_are_sorted_by_macro_name() {
    let program = TestProgram::new();
    program.write_library(
        "zeta",
        json!({"name": "zeta", "config": {"a": 1, "custom": {"value": 2, "macro_name": "AAA_CUSTOM"}}}),
    );
    program.write_library("alpha", json!({"name": "alpha", "config": {"b": 3}}));

    let config = assemble(&program, json!({})).unwrap();

    let macros: Vec<&str> = config
        .header_entries()
        .iter()
        .map(|option| option.macro_name.as_str())
        .collect();
    assert_eq!(
        macros,
        vec!["AAA_CUSTOM", "MBED_CONF_ALPHA_B", "MBED_CONF_ZETA_A"]
    );
}

#[test]
fn ignored_and_unlabelled_trees_stay_out() {
    let program = TestProgram::new();
    program.write_library("TARGET_K64F/board", json!({"name": "board", "config": {"pins": 64}}));
    program.write_library("TARGET_NRF52/board", json!({"name": "nordic", "config": {"pins": 48}}));
    program.write_library("tools/scratch", json!({"name": "scratch", "config": {"junk": 1}}));
    program.write_library(
        "drivers/COMPONENT_SD/sd",
        json!({"name": "sd", "config": {"spi": 1}, "macros": ["SD_PRESENT"]}),
    );
    program.write_ignore("tools", &["# build helpers", "", "scratch/*"]);

    let config = assemble(
        &program,
        json!({"labels": ["K64F"], "components": ["SD"]}),
    )
    .unwrap();

    let keys: Vec<&str> = config.options.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["board.pins", "sd.spi"]);
    assert_eq!(config.macros(), &set(&["SD_PRESENT"]));
}

#[test]
fn target_label_selects_override_block() {
    let program = TestProgram::new();
    program.write_library("lib", json!({"name": "lib", "config": {"clock": 16}}));
    program.write_app(json!({
        "target_overrides": {
            "*": {"lib.clock": 32},
            "K64F": {"lib.clock": 120},
            "NRF52": {"lib.clock": 64}
        }
    }));

    let config = assemble(&program, json!({"labels": ["K64F"]})).unwrap();
    assert_eq!(config.value("lib.clock"), Some(&json!(120)));
}

#[test]
fn contradictory_libraries_do_not_converge() {
    let program = TestProgram::new();
    program.write_library(
        "FEATURE_A/flip",
        json!({"name": "flip", "target_overrides": {"*": {
            "target.features_remove": ["A"], "target.features_add": ["B"]
        }}}),
    );
    program.write_library(
        "FEATURE_B/flop",
        json!({"name": "flop", "target_overrides": {"*": {
            "target.features_remove": ["B"], "target.features_add": ["A"]
        }}}),
    );

    match assemble(&program, json!({"features": ["A"]})).unwrap_err() {
        Error::ConfigDidNotConverge { iterations, .. } => {
            assert_eq!(iterations, AssemblyOptions::default().max_iterations);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_descriptor_aborts_with_its_path() {
    let program = TestProgram::new();
    let broken = program.write_file("lib/mbed_lib.json", "{ not json");

    match assemble(&program, json!({})).unwrap_err() {
        Error::DescriptorParse { path, .. } => assert_eq!(path, broken.to_native()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn custom_discovery_limits_candidates() {
    let program = TestProgram::new();
    let target = program.write_target(json!({}));
    let listed = program.write_library("listed", json!({"name": "listed", "config": {"on": 1}}));
    program.write_library("unlisted", json!({"name": "unlisted", "config": {"on": 1}}));

    let discovery = ListedDiscovery { files: vec![listed] };
    let config = assemble_program(
        &target,
        &program.normalized_root(),
        &discovery,
        &AssemblyOptions::default(),
    )
    .unwrap();

    let keys: Vec<&str> = config.options.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["listed.on"]);
}

#[test]
fn app_descriptor_comes_from_discovery() {
    let program = TestProgram::new();
    let target = program.write_target(json!({}));
    let lib = program.write_library("lib", json!({"name": "lib", "config": {"x": 1}}));
    let app = program.write_app(json!({"target_overrides": {"*": {"lib.x": 2}}}));
    let nested_app = program.write_json("lib/mbed_app.json", json!({"config": {"nested": 1}}));

    let assemble_with = |files: Vec<NormalizedPath>| {
        assemble_program(
            &target,
            &program.normalized_root(),
            &ListedDiscovery { files },
            &AssemblyOptions::default(),
        )
        .unwrap()
    };

    let without_app = assemble_with(vec![lib.clone(), nested_app.clone()]);
    assert_eq!(without_app.value("lib.x"), Some(&json!(1)));
    assert!(without_app.option("app.nested").is_none());

    let with_app = assemble_with(vec![lib, app, nested_app]);
    assert_eq!(with_app.value("lib.x"), Some(&json!(2)));
    assert!(with_app.option("app.nested").is_none());
}

#[test]
fn bare_directory_in_ignore_file_excludes_its_tree() {
    let program = TestProgram::new();
    program.write_library("rtos", json!({"name": "rtos", "config": {"tick": 1}}));
    program.write_library("legacy/old", json!({"name": "old", "config": {"dead": 1}}));
    program.write_library("legacy/older/deep", json!({"name": "deep", "config": {"dead": 1}}));
    program.write_ignore("", &["legacy"]);

    let config = assemble(&program, json!({})).unwrap();

    let keys: Vec<&str> = config.options.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["rtos.tick"]);
}

#[test]
fn options_file_drives_assembly() {
    let program = TestProgram::new();
    let target = program.write_target(json!({}));
    program.write_json("lib/library.json", json!({"name": "lib", "config": {"x": 1}}));
    program.write_json("application.json", json!({"target_overrides": {"*": {"lib.x": 2}}}));

    let options = AssemblyOptions::parse(
        r#"
        max_iterations = 4
        library_file_name = "library.json"
        app_file_name = "application.json"
        "#,
    )
    .unwrap();
    let config = assemble_program(
        &target,
        &program.normalized_root(),
        &WalkDiscovery::new(),
        &options,
    )
    .unwrap();

    assert_eq!(config.value("lib.x"), Some(&json!(2)));
}
