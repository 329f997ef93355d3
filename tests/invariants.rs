//! Contract Invariant Tests
//!
//! These tests run the whole pipeline against scratch directories and
//! verify the guarantees callers rely on.

use std::fs;
use std::path::Path;

use bible_embed_core::{
    canon::{canonical_order, position_of, CANON_LEN},
    emit::DEFAULT_VARIABLE,
    read_artifact, ConversionPipeline, DiagnosticKind, ExtrasPolicy, PipelineConfig,
    PipelineError, Variant,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn book(name: &str, chapters: &[(u32, &[(u32, &str)])]) -> Value {
    json!({
        "book": name,
        "chapters": chapters.iter().map(|(c, verses)| json!({
            "chapter": c.to_string(),
            "verses": verses.iter().map(|(v, t)| json!({"verse": v.to_string(), "text": t})).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
    })
}

struct Workspace {
    _root: TempDir,
    input: std::path::PathBuf,
    output: std::path::PathBuf,
}

fn workspace() -> Workspace {
    let root = tempfile::tempdir().unwrap();
    let input = root.path().join("Bible");
    fs::create_dir(&input).unwrap();
    let output = root.path().join("bible.html");
    Workspace { _root: root, input, output }
}

fn pipeline(ws: &Workspace, variant: Variant) -> ConversionPipeline {
    ConversionPipeline::new(PipelineConfig::new(&ws.input, &ws.output, variant)).unwrap()
}

fn read_output(ws: &Workspace) -> bible_embed_core::Corpus {
    let text = fs::read_to_string(&ws.output).unwrap();
    read_artifact(&text, DEFAULT_VARIABLE).unwrap()
}

#[test]
fn scenario_single_book_numbers_coerced() {
    let ws = workspace();
    write_json(
        &ws.input,
        "john.json",
        &json!({"book": "John", "chapters": [{"chapter": "3", "verses": [{"verse": "16", "text": "For God so loved..."}]}]}),
    );

    for variant in [Variant::Consolidated, Variant::Canonical] {
        let report = pipeline(&ws, variant).run().unwrap();
        assert_eq!(report.books_written, 1);

        let html = fs::read_to_string(&ws.output).unwrap();
        assert!(html.contains("\"chapter\": 3"));
        assert!(html.contains("\"verse\": 16"));
        assert!(html.contains("\"text\": \"For God so loved...\""));

        let john = read_output(&ws).get("John").cloned().unwrap();
        assert_eq!(john.chapters[0].number, 3);
        assert_eq!(john.chapters[0].verses[0].number, 16);
    }
}

#[test]
fn scenario_duplicate_last_file_wins() {
    let ws = workspace();
    write_json(&ws.input, "a.json", &book("Genesis", &[(1, &[(1, "first")])]));
    write_json(&ws.input, "b.json", &book("Genesis", &[(1, &[(1, "second")])]));

    let report = pipeline(&ws, Variant::Consolidated).run().unwrap();
    let corpus = read_output(&ws);
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus.get("Genesis").unwrap().chapters[0].verses[0].text, "second");

    let dup: Vec<_> = report.diagnostics.of_kind(DiagnosticKind::DuplicateBook).collect();
    assert_eq!(dup.len(), 1);
    assert!(dup[0].message.contains("Genesis"));
    assert!(dup[0].message.contains("b.json"));
}

#[test]
fn scenario_bad_verse_skips_whole_chapter() {
    let ws = workspace();
    write_json(
        &ws.input,
        "exodus.json",
        &json!({"book": "Exodus", "chapters": [
            {"chapter": 1, "verses": [{"verse": "abc", "text": "x"}]},
            {"chapter": 2, "verses": [{"verse": 1, "text": "kept"}]}
        ]}),
    );

    let report = pipeline(&ws, Variant::Canonical).run().unwrap();
    let exodus = read_output(&ws).get("Exodus").cloned().unwrap();
    assert_eq!(exodus.chapters.len(), 1);
    assert_eq!(exodus.chapters[0].number, 2);

    let warning = report
        .diagnostics
        .of_kind(DiagnosticKind::MalformedUnit)
        .next()
        .unwrap();
    assert_eq!(warning.context.book.as_deref(), Some("Exodus"));
    assert_eq!(warning.context.chapter.as_deref(), Some("1"));
}

#[test]
fn scenario_canonical_subset_and_missing_warnings() {
    let ws = workspace();
    write_json(
        &ws.input,
        "books.json",
        &json!([
            book("Revelation", &[(1, &[(1, "The Revelation of Jesus Christ")])]),
            book("Genesis", &[(1, &[(1, "In the beginning")])]),
        ]),
    );

    let report = pipeline(&ws, Variant::Canonical).run().unwrap();
    let corpus = read_output(&ws);
    assert_eq!(corpus.names().collect::<Vec<_>>(), vec!["Genesis", "Revelation"]);

    let missing: Vec<_> = report
        .diagnostics
        .of_kind(DiagnosticKind::MissingCanonical)
        .filter_map(|d| d.context.book.clone())
        .collect();
    assert_eq!(missing.len(), CANON_LEN - 2);
    assert!(missing.contains(&"Exodus".to_string()));
    assert!(!missing.contains(&"Genesis".to_string()));
}

#[test]
fn scenario_empty_directory_writes_nothing() {
    let ws = workspace();

    let report = pipeline(&ws, Variant::Canonical).run().unwrap();
    assert!(!ws.output.exists());
    assert!(!report.wrote_output());
    assert_eq!(report.books_written, 0);
    assert!(report.artifact_hash.is_none());
    assert_eq!(report.diagnostics.of_kind(DiagnosticKind::EmptyResult).count(), 1);
    assert!(!report.diagnostics.has_errors());
}

#[test]
fn invariant_missing_input_dir_is_reported_not_fatal() {
    let ws = workspace();
    let config = PipelineConfig::new(ws.input.join("nope"), &ws.output, Variant::Canonical);

    let report = ConversionPipeline::new(config).unwrap().run().unwrap();
    assert!(!ws.output.exists());
    assert!(report.diagnostics.has_errors());
    assert_eq!(report.diagnostics.of_kind(DiagnosticKind::IoFailure).count(), 1);
}

#[test]
fn invariant_book_count_bounded_by_distinct_names() {
    let ws = workspace();
    write_json(
        &ws.input,
        "one.json",
        &json!([book("Ruth", &[(1, &[(1, "a")])]), book("Job", &[(1, &[(1, "b")])])]),
    );
    write_json(&ws.input, "two.json", &book("Ruth", &[(2, &[(1, "c")])]));
    write_json(&ws.input, "three.json", &book("Tobit", &[(1, &[(1, "d")])]));

    let report = pipeline(&ws, Variant::Consolidated).run().unwrap();
    assert_eq!(report.books_written, 3);
    assert_eq!(read_output(&ws).len(), 3);
}

#[test]
fn invariant_output_is_idempotent() {
    let ws = workspace();
    write_json(&ws.input, "a.json", &book("Psalms", &[(23, &[(1, "The LORD is my shepherd")])]));
    write_json(&ws.input, "b.json", &book("Jonah", &[(1, &[(2, "b"), (1, "a")])]));

    let p = pipeline(&ws, Variant::Canonical);
    let first = p.run().unwrap();
    let bytes1 = fs::read(&ws.output).unwrap();
    let second = p.run().unwrap();
    let bytes2 = fs::read(&ws.output).unwrap();

    assert_eq!(bytes1, bytes2);
    assert_eq!(first.artifact_hash, second.artifact_hash);
    assert_ne!(first.run_id, second.run_id);
}

#[test]
fn invariant_canonical_order_and_sorting_laws() {
    let ws = workspace();
    write_json(
        &ws.input,
        "mixed.json",
        &json!([
            book("Mark", &[(2, &[(3, "c"), (1, "a")]), (1, &[(2, "b"), (1, "a")])]),
            book("Tobit", &[(1, &[(1, "x")])]),
            book("Exodus", &[(10, &[(1, "a")]), (9, &[(1, "a")])]),
            book("1 John", &[(1, &[(1, "a")])]),
        ]),
    );

    let report = pipeline(&ws, Variant::Canonical).run().unwrap();
    let corpus = read_output(&ws);

    let positions: Vec<_> = corpus.names().map(|n| position_of(n).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(!corpus.contains("Tobit"));

    for b in &corpus {
        assert!(b.chapters.windows(2).all(|w| w[0].number < w[1].number));
        for c in &b.chapters {
            assert!(c.verses.windows(2).all(|w| w[0].number < w[1].number));
        }
    }

    let extras: Vec<_> = report.diagnostics.of_kind(DiagnosticKind::NonCanonical).collect();
    assert!(extras.iter().any(|d| d.message.contains("Tobit")));
}

#[test]
fn invariant_repeated_numbers_collapse_to_strictly_ascending() {
    let ws = workspace();
    write_json(
        &ws.input,
        "ruth.json",
        &json!({"book": "Ruth", "chapters": [
            {"chapter": 1, "verses": [{"verse": 1, "text": "a"}, {"verse": 1, "text": "b"}]},
            {"chapter": 1, "verses": [{"verse": 2, "text": "c"}, {"verse": 1, "text": "d"}, {"verse": 1, "text": "e"}]}
        ]}),
    );

    let report = pipeline(&ws, Variant::Canonical).run().unwrap();
    let ruth = read_output(&ws).get("Ruth").cloned().unwrap();

    assert_eq!(ruth.chapters.len(), 1);
    let verses: Vec<_> = ruth.chapters[0].verses.iter().map(|v| (v.number, v.text.as_str())).collect();
    assert_eq!(verses, vec![(1, "e"), (2, "c")]);

    let repeats: Vec<_> = report
        .diagnostics
        .of_kind(DiagnosticKind::MalformedUnit)
        .filter(|d| d.message.contains("Duplicate"))
        .collect();
    assert_eq!(repeats.len(), 3);
    assert!(repeats.iter().all(|d| d.context.book.as_deref() == Some("Ruth")));
    assert!(repeats.iter().all(|d| d.context.chapter.as_deref() == Some("1")));
}

#[test]
fn invariant_unreadable_file_reported_others_converted() {
    let ws = workspace();
    write_json(&ws.input, "a.json", &book("Genesis", &[(1, &[(1, "a")])]));
    fs::write(ws.input.join("bad.json"), b"\xff\xfe\x7b").unwrap();
    write_json(&ws.input, "c.json", &book("Exodus", &[(1, &[(1, "b")])]));

    let report = pipeline(&ws, Variant::Consolidated).run().unwrap();
    assert_eq!(report.books_written, 2);
    assert_eq!(read_output(&ws).names().collect::<Vec<_>>(), vec!["Genesis", "Exodus"]);

    let io: Vec<_> = report.diagnostics.of_kind(DiagnosticKind::IoFailure).collect();
    assert_eq!(io.len(), 1);
    assert!(io[0].message.contains("bad.json"));
    assert_eq!(io[0].context.file.as_deref(), Some(ws.input.join("bad.json").as_path()));
}

#[test]
fn invariant_consolidated_variant_keeps_raw_order() {
    let ws = workspace();
    write_json(
        &ws.input,
        "a.json",
        &json!([
            book("Revelation", &[(2, &[(2, "b"), (1, "a")]), (1, &[(1, "a")])]),
            book("Genesis", &[(1, &[(1, "a")])]),
        ]),
    );

    pipeline(&ws, Variant::Consolidated).run().unwrap();
    let corpus = read_output(&ws);
    assert_eq!(corpus.names().collect::<Vec<_>>(), vec!["Revelation", "Genesis"]);
    let rev = corpus.get("Revelation").unwrap();
    assert_eq!(rev.chapters[0].number, 2);
    assert_eq!(rev.chapters[0].verses[0].number, 2);
}

#[test]
fn invariant_round_trip_matches_built_corpus() {
    let ws = workspace();
    write_json(
        &ws.input,
        "a.json",
        &json!([
            book("Luke", &[(1, &[(1, "Forasmuch as many</script> have taken")])]),
            book("Matthew", &[(1, &[(1, "Βίβλος γενέσεως")])]),
        ]),
    );

    let p = pipeline(&ws, Variant::Canonical);
    let mut diags = bible_embed_core::Diagnostics::new();
    let (built, _) = p.build_corpus(&mut diags);
    p.run().unwrap();

    let html = fs::read_to_string(&ws.output).unwrap();
    assert!(html.contains("Βίβλος γενέσεως"));
    assert_eq!(read_output(&ws), built);
}

#[test]
fn invariant_extras_append_policy() {
    let ws = workspace();
    write_json(
        &ws.input,
        "a.json",
        &json!([book("Tobit", &[(1, &[(1, "x")])]), book("Genesis", &[(1, &[(1, "a")])])]),
    );
    let mut config = PipelineConfig::new(&ws.input, &ws.output, Variant::Canonical);
    config.extras = ExtrasPolicy::Append;

    ConversionPipeline::new(config).unwrap().run().unwrap();
    assert_eq!(read_output(&ws).names().collect::<Vec<_>>(), vec!["Genesis", "Tobit"]);
}

#[test]
fn invariant_write_failure_surfaces_path() {
    let ws = workspace();
    write_json(&ws.input, "a.json", &book("Genesis", &[(1, &[(1, "a")])]));
    let target = ws.input.join("no-such-dir").join("out.html");
    let config = PipelineConfig::new(&ws.input, &target, Variant::Canonical);

    let err = ConversionPipeline::new(config).unwrap().run().unwrap_err();
    assert!(matches!(err, PipelineError::Write { .. }));
    assert!(err.to_string().contains("out.html"));
}

#[test]
fn invariant_non_json_files_ignored() {
    let ws = workspace();
    write_json(&ws.input, "a.json", &book("Genesis", &[(1, &[(1, "a")])]));
    fs::write(ws.input.join("README.txt"), "not a book").unwrap();
    fs::write(ws.input.join("broken.json"), "{").unwrap();

    let report = pipeline(&ws, Variant::Consolidated).run().unwrap();
    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.books_written, 1);
    assert_eq!(report.diagnostics.of_kind(DiagnosticKind::ParseFailure).count(), 1);
}

#[test]
fn invariant_canon_is_66_books() {
    assert_eq!(canonical_order().count(), 66);
}
