use std::fs;

use langpack_core::{Lang, Package, ParserConfig, ParserFactory, ParserHandle, PatternKind};
use tempfile::TempDir;

async fn load(package: Package) -> ParserHandle {
    ParserFactory::new(package).load().await.unwrap()
}

// -----------------------------------------------------------------------
// PHP package
// -----------------------------------------------------------------------

#[tokio::test]
async fn php_has_a_lang_value() {
    let parser = load(Package::Php).await;
    assert_eq!(parser.get_langs(), vec![21]);
}

#[tokio::test]
async fn php_parses_a_pattern() {
    let parser = load(Package::Php).await;
    let pattern = parser.parse_pattern(true, "echo $X;").unwrap();
    assert_eq!(pattern.lang, Lang::Php);
    assert_eq!(pattern.kind, PatternKind::Stmt);
    assert_eq!(pattern.metavariables, vec!["$X"]);
}

#[tokio::test]
async fn php_parses_a_file() {
    let parser = load(Package::Php).await;
    let target = parser.parse_target("tests/test.php").unwrap();
    assert_eq!(target.lang, Lang::Php);
    assert!(target.errors.is_empty(), "unexpected errors: {:?}", target.errors);
    assert_eq!(target.stats.error_lines, 0);
    assert!(target.stats.total_lines > 20);
    assert_eq!(target.ast.root_node().unwrap().kind, "program");
    assert_eq!(
        target.ast.find_all(|n| n.kind == "method_declaration").len(),
        2
    );
}

// -----------------------------------------------------------------------
// Python package
// -----------------------------------------------------------------------

#[tokio::test]
async fn python_has_a_lang_value() {
    let parser = load(Package::Python).await;
    assert_eq!(parser.get_langs(), vec![24, 22, 23]);
}

#[tokio::test]
async fn python_parses_a_pattern() {
    let parser = load(Package::Python).await;
    let pattern = parser.parse_pattern(false, "print($X)").unwrap();
    assert_eq!(pattern.lang, Lang::Python);
    assert_eq!(pattern.kind, PatternKind::Expr);
    assert!(pattern.errors.is_empty());
    assert_eq!(pattern.metavariables, vec!["$X"]);
}

#[tokio::test]
async fn python_parses_a_file() {
    let parser = load(Package::Python).await;
    let target = parser.parse_target("tests/test.py").unwrap();
    assert_eq!(target.lang, Lang::Python);
    assert!(target.errors.is_empty(), "unexpected errors: {:?}", target.errors);
    assert_eq!(
        target.ast.find_all(|n| n.kind == "class_definition").len(),
        1
    );
}

// -----------------------------------------------------------------------
// Cross-package and configuration behaviour
// -----------------------------------------------------------------------

#[tokio::test]
async fn rejects_languages_outside_the_package() {
    let parser = load(Package::Python).await;

    let err = parser.parse_target("tests/test.php").unwrap_err();
    assert!(err.to_string().contains("not provided by the python package"));

    let err = parser.parse_pattern_as(Lang::Php, true, "echo $X;").unwrap_err();
    assert!(err.to_string().contains("php (21)"));
}

#[tokio::test]
async fn explicit_lang_applies_dialect_checks() {
    let parser = load(Package::Python).await;
    assert!(parser.parse_pattern_as(Lang::Python2, true, "print 'x'").is_ok());
    assert!(parser.parse_pattern_as(Lang::Python3, true, "print 'x'").is_err());

    let lenient = parser
        .parse_pattern_as(Lang::Python3, false, "print 'x'")
        .unwrap();
    assert_eq!(lenient.errors.len(), 1);
}

#[tokio::test]
async fn shebang_selects_python_dialect() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("tool");
    fs::write(&script, "#!/usr/bin/env python2\nprint 'hello'\n").unwrap();

    let parser = load(Package::Python).await;
    let target = parser.parse_target(&script).unwrap();
    assert_eq!(target.lang, Lang::Python2);
    assert!(target.errors.is_empty());

    let forced = parser.parse_target_as(Lang::Python3, &script).unwrap();
    assert_eq!(forced.errors.len(), 1);
    assert_eq!(forced.stats.error_lines, 1);
}

#[tokio::test]
async fn unknown_extension_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let notes = temp_dir.path().join("notes.txt");
    fs::write(&notes, "hello").unwrap();

    let parser = load(Package::Php).await;
    let err = parser.parse_target(&notes).unwrap_err();
    assert!(err.to_string().contains("cannot determine the language"));
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let parser = load(Package::Php).await;
    assert!(parser.parse_target("tests/does_not_exist.php").is_err());
}

#[tokio::test]
async fn oversized_targets_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let big = temp_dir.path().join("big.py");
    fs::write(&big, "x = 1\n".repeat(100)).unwrap();

    let parser = ParserFactory::new(Package::Python)
        .with_config(ParserConfig::default().with_max_target_bytes(64))
        .load()
        .await
        .unwrap();
    let err = parser.parse_target(&big).unwrap_err();
    assert!(err.to_string().contains("byte limit"));
}

#[tokio::test]
async fn invalid_utf8_is_replaced() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("latin1.py");
    fs::write(&file, b"name = 'caf\xe9'\n").unwrap();

    let parser = load(Package::Python).await;
    let target = parser.parse_target(&file).unwrap();
    assert!(target.errors.is_empty());
}

#[tokio::test]
async fn parse_timeout_fails_and_parser_recovers() {
    let temp_dir = TempDir::new().unwrap();
    let big = temp_dir.path().join("big.py");
    fs::write(&big, "x = 1\n".repeat(200_000)).unwrap();

    let parser = ParserFactory::new(Package::Python)
        .with_config(ParserConfig::default().with_parse_timeout_micros(1))
        .load()
        .await
        .unwrap();
    let err = parser.parse_target(&big).unwrap_err();
    assert!(format!("{err:#}").contains("timed out"), "{err:#}");

    // The grammar's parser is reset after the timeout and stays usable.
    let pattern = parser.parse_pattern(true, "x = 1").unwrap();
    assert!(pattern.errors.is_empty());
}

#[tokio::test]
async fn scans_a_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::create_dir_all(root.join("node_modules/dep")).unwrap();
    fs::create_dir_all(root.join("__pycache__")).unwrap();
    fs::create_dir_all(root.join("repo.git")).unwrap();
    fs::create_dir_all(root.join("foo.egg-info")).unwrap();

    fs::write(root.join("main.py"), "import pkg\n").unwrap();
    fs::write(root.join("pkg/__init__.py"), "def helper():\n    return 1\n").unwrap();
    fs::write(root.join("pkg/index.php"), "<?php echo 1;").unwrap();
    fs::write(root.join("README"), "not code").unwrap();
    fs::write(root.join("run"), "#!/usr/bin/env python3\nprint('hi')\n").unwrap();
    fs::write(root.join("node_modules/dep/x.py"), "x = 1\n").unwrap();
    fs::write(root.join("__pycache__/cached.py"), "x = 1\n").unwrap();
    fs::write(root.join("repo.git/mod.py"), "x = 1\n").unwrap();
    fs::write(root.join("foo.egg-info/y.py"), "x = 1\n").unwrap();

    let parser = load(Package::Python).await;
    let targets = parser.parse_dir(root).unwrap();

    let mut names: Vec<String> = targets
        .iter()
        .map(|t| {
            std::path::Path::new(&t.path)
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    names.sort();
    assert_eq!(names, vec!["main.py", "pkg/__init__.py", "repo.git/mod.py", "run"]);

    let run = targets.iter().find(|t| t.path.ends_with("run")).unwrap();
    assert_eq!(run.lang, Lang::Python3);
}

#[tokio::test]
async fn handle_is_shared_across_tasks() {
    let parser = load(Package::Python).await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let parser = parser.clone();
        tasks.push(tokio::spawn(async move {
            let text = format!("foo($X, {i})");
            parser.parse_pattern(true, &text).map(|p| p.metavariables)
        }));
    }
    for task in tasks {
        let metavariables = task.await.unwrap().unwrap();
        assert_eq!(metavariables, vec!["$X"]);
    }
}

#[tokio::test]
async fn pattern_json_shape() {
    let parser = load(Package::Php).await;
    let pattern = parser.parse_pattern(true, "echo $X;").unwrap();
    let json = serde_json::to_value(&pattern).unwrap();

    assert_eq!(json["lang"], "php");
    assert_eq!(json["kind"], "stmt");
    assert_eq!(json["strict"], true);
    assert_eq!(json["ast"]["kind"], "echo_statement");
    assert_eq!(json["ast"]["span"]["startLine"], 1);
    assert_eq!(json["metavariables"][0], "$X");
}
