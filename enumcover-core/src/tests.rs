//! End-to-end test suite for enumcover-core: temporary crates on disk,
//! checked through the public entry points.

use crate::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_file(file: &Path, content: &str) {
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

fn setup_temp_project(name: &str) -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("enumcover_tests")
        .join(format!("{}_{}", timestamp, id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(dir.join("src")).unwrap();
    write_file(
        &dir.join("Cargo.toml"),
        &format!("[package]\nname = \"{}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n", name),
    );
    dir
}

fn check(root: &Path) -> CrateReport {
    check_crate(root, &EnumcoverConfig::default()).unwrap()
}

fn messages(report: &CrateReport) -> Vec<&str> {
    report.diagnostics.iter().map(|d| d.message.as_str()).collect()
}

const COLORS: &str = r#"
pub struct Color(pub &'static str);

pub const RED: Color = Color("r");
pub const GREEN: Color = Color("g");
pub const BLUE: Color = Color("b");
"#;

// Scenario 1: a missing constant is reported at the annotated node
#[test]
fn test_missing_constant() {
    let root = setup_temp_project("palette");
    write_file(&root.join("src/lib.rs"), "pub mod colors;\npub mod app;\n");
    write_file(&root.join("src/colors.rs"), COLORS);
    write_file(
        &root.join("src/app.rs"),
        r#"use crate::colors::{Color, GREEN, RED};

pub fn primaries() -> Vec<Color> {
    // enumcover:Color
    vec![RED, GREEN]
}
"#,
    );

    let report = check(&root);
    assert_eq!(messages(&report), vec!["Unhandled const: BLUE (b)"]);
    let diag = &report.diagnostics[0];
    assert!(diag.file.ends_with("src/app.rs"));
    assert_eq!(diag.span.line, 5);
    assert_eq!(diag.kind, DiagnosticKind::UnhandledConst);
    assert_eq!(report.crate_name, "palette");

    fs::remove_dir_all(&root).ok();
}

// Scenario 2: a renamed module import qualifies the directive
#[test]
fn test_renamed_module_import() {
    let root = setup_temp_project("shapes-demo");
    write_file(&root.join("src/lib.rs"), "pub mod shapes;\npub mod kinds;\npub mod draw;\n");
    write_file(
        &root.join("src/shapes.rs"),
        "pub use crate::kinds::EXTRA;\npub struct Kind(pub u8);\npub const CIRCLE: Kind = Kind(1);\npub const SQUARE: Kind = Kind(2);\n",
    );
    write_file(
        &root.join("src/kinds.rs"),
        "use crate::shapes::Kind;\npub const EXTRA: Kind = Kind(9);\n",
    );
    write_file(
        &root.join("src/draw.rs"),
        r#"use crate::shapes as sh;

pub fn sides(k: sh::Kind) -> u8 {
    // enumcover:sh.Kind
    match k {
        sh::CIRCLE => 0,
        sh::SQUARE => 4,
        _ => 0,
    }
}
"#,
    );

    let report = check(&root);
    // EXTRA lives in a module `shapes` imports from.
    assert_eq!(messages(&report), vec!["Unhandled const: EXTRA (9)"]);
    assert!(report.stats.modules_visited >= 3);

    fs::remove_dir_all(&root).ok();
}

// Scenario 3: an alias shares its target's value
#[test]
fn test_alias_constants_share_value() {
    let root = setup_temp_project("aliases");
    write_file(
        &root.join("src/lib.rs"),
        r#"pub struct Letter(pub &'static str);

pub const A: Letter = Letter("a");
pub const B: Letter = Letter("b");
pub const D: Letter = Letter("c");
pub const C: Letter = D;

pub fn via_d() -> [Letter; 3] {
    // enumcover:Letter
    [A, B, D]
}

pub fn via_c() -> [Letter; 3] {
    // enumcover:Letter
    [A, B, C]
}
"#,
    );

    let report = check(&root);
    assert!(report.diagnostics.is_empty(), "{:?}", messages(&report));

    fs::remove_dir_all(&root).ok();
}

// Scenario 4: a malformed directive is reported and not checked
#[test]
fn test_malformed_directive() {
    let root = setup_temp_project("malformed");
    write_file(&root.join("src/lib.rs"), "pub mod colors;\npub mod app;\n");
    write_file(&root.join("src/colors.rs"), COLORS);
    write_file(
        &root.join("src/app.rs"),
        "use crate::colors::RED;\n\npub fn f() {\n    // enumcover: Color\n    let _c = RED;\n}\n",
    );

    let report = check(&root);
    assert_eq!(
        messages(&report),
        vec!["Malformed enumcover comment (should be of the form \"enumcover:sometypename\"): // enumcover: Color"]
    );
    assert_eq!(report.diagnostics[0].span.line, 4);

    fs::remove_dir_all(&root).ok();
}

// Scenario 5: qualifying through a glob import degrades resolution
#[test]
fn test_dot_import_unhandled() {
    let root = setup_temp_project("dots");
    write_file(&root.join("src/lib.rs"), "pub mod dotmod;\npub mod app;\n");
    write_file(
        &root.join("src/dotmod.rs"),
        "pub struct Thing(pub u8);\npub const ONE: Thing = Thing(1);\n",
    );
    write_file(
        &root.join("src/app.rs"),
        r#"use crate::dotmod::*;

pub fn f(t: Thing) -> bool {
    // enumcover:dotmod.Thing
    matches!(t, ONE)
}
"#,
    );

    let report = check(&root);
    assert_eq!(
        messages(&report),
        vec!["Dot imports are unhandled!", "No consts found for type Thing"]
    );

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_enum_variants_with_discriminants() {
    let root = setup_temp_project("modes");
    write_file(
        &root.join("src/lib.rs"),
        r#"#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Fast = 1,
    Slow = 2,
    Off = 0,
}

pub fn speed(m: Mode) -> u32 {
    // enumcover:Mode
    match m {
        Mode::Fast => 10,
        Mode::Slow => 1,
        Mode::Off => 0,
    }
}

pub fn describe(m: Mode) -> &'static str {
    /* enumcover:Mode */
    if m == Mode::Fast { "fast" } else { "other" }
}
"#,
    );

    let report = check(&root);
    let msgs = messages(&report);
    // Same location, so ordered by message.
    assert_eq!(msgs, vec!["Unhandled const: Off (0)", "Unhandled const: Slow (2)"]);
    assert!(report.diagnostics.iter().all(|d| d.span.line == 19));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_literal_patterns_cover_values() {
    let root = setup_temp_project("codes");
    write_file(
        &root.join("src/lib.rs"),
        r#"#[derive(PartialEq, Eq)]
pub struct Code(pub u16);

impl Code {
    pub const OK: Code = Code(200);
    pub const MISSING: Self = Self(404);
    pub const BROKEN: Code = Code(500);
}

pub fn text(c: Code) -> &'static str {
    // enumcover:Code
    match c {
        Code(200) => "ok",
        Code::MISSING => "missing",
        _ => "?",
    }
}
"#,
    );

    let report = check(&root);
    assert_eq!(messages(&report), vec!["Unhandled const: BROKEN (500)"]);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_integration_test_uses_library_name() {
    let root = setup_temp_project("my-palette");
    write_file(&root.join("src/lib.rs"), &format!("pub mod colors {{{}}}\n", COLORS));
    write_file(
        &root.join("tests/all.rs"),
        r#"use my_palette::colors::{self, Color};

#[test]
fn every_color() {
    // enumcover:Color
    let all: [Color; 2] = [colors::RED, colors::BLUE];
    assert_eq!(all.len(), 2);
}
"#,
    );

    let report = check(&root);
    assert_eq!(messages(&report), vec!["Unhandled const: GREEN (g)"]);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_unparsable_file_is_skipped() {
    let root = setup_temp_project("broken");
    write_file(&root.join("src/lib.rs"), "pub mod colors;\npub mod bad;\npub mod app;\n");
    write_file(&root.join("src/colors.rs"), COLORS);
    write_file(&root.join("src/bad.rs"), "// enumcover:Color\nfn broken( {\n");
    write_file(
        &root.join("src/app.rs"),
        "use crate::colors::*;\n\npub fn f() -> [Color; 3] {\n    // enumcover:Color\n    [RED, GREEN, BLUE]\n}\n",
    );

    let report = check(&root);
    assert!(report.diagnostics.is_empty());
    // lib.rs, colors.rs and app.rs; bad.rs failed to parse.
    assert_eq!(report.files_checked, 3);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_excluded_directories() {
    let root = setup_temp_project("excludes");
    write_file(&root.join("src/lib.rs"), "pub mod colors;\n");
    write_file(&root.join("src/colors.rs"), COLORS);
    write_file(
        &root.join("generated/extra.rs"),
        "use crate::colors::*;\nfn f() {\n    // enumcover:Color\n    let _ = RED;\n}\n",
    );

    let all = check(&root);
    assert_eq!(all.diagnostics.len(), 2);

    let config = EnumcoverConfig::default().with_excludes(["generated".to_string()]);
    let trimmed = check_crate(&root, &config).unwrap();
    assert!(trimmed.diagnostics.is_empty());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_config_file_loaded() {
    let root = setup_temp_project("configured");
    write_file(
        &root.join(CONFIG_FILE),
        "exclude = [\"fixtures\"]\n\n[output]\nformat = \"json\"\n",
    );

    let config = load_config(&root).unwrap().unwrap();
    assert!(config.wants_json());
    assert_eq!(config.excluded_dirs(), vec!["fixtures"]);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_workspace_checks_every_member() {
    let root = setup_temp_project("ignored");
    write_file(
        &root.join("Cargo.toml"),
        "[workspace]\nmembers = [\"alpha\", \"beta\"]\nresolver = \"2\"\n",
    );
    fs::remove_dir_all(root.join("src")).unwrap();
    for member in ["alpha", "beta"] {
        write_file(
            &root.join(member).join("Cargo.toml"),
            &format!("[package]\nname = \"{}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n", member),
        );
        write_file(
            &root.join(member).join("src/lib.rs"),
            &format!(
                "pub mod colors {{{}}}\nuse colors::*;\npub fn f() -> [Color; 2] {{\n    // enumcover:Color\n    [RED, GREEN]\n}}\n",
                COLORS
            ),
        );
    }

    let reports = check_workspace(&root, &EnumcoverConfig::default()).unwrap();
    let names: Vec<_> = reports.iter().map(|r| r.crate_name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    for report in &reports {
        assert_eq!(messages(report), vec!["Unhandled const: BLUE (b)"]);
    }

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_bad_path_is_invalid_argument() {
    let missing = std::env::temp_dir().join("enumcover_tests").join("does-not-exist");
    let err = check_crate(&missing, &EnumcoverConfig::default()).unwrap_err();
    assert!(matches!(err, EnumcoverError::InvalidArgument { .. }));
    assert!(!err.is_recoverable());
}
