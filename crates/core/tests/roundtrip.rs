use std::path::Path;

use librarian_core::{
    build_command, render_option, render_visibility, Category, FieldSchema, FilterMode, FormView,
    Submission,
};

#[test]
fn every_mode_survives_a_round_trip() {
    let schema = FieldSchema::librarian();
    for field in schema.fields().filter(|f| !f.is_forced_exact()) {
        for mode in FilterMode::ALL {
            let submission = Submission::from_pairs([
                (field.id(), mode.wire_value().to_string()),
                (field.exact_id(), "abc".to_string()),
            ]);
            let descriptor = submission.decode_field(field);
            assert_eq!(render_option(&descriptor), mode, "{}", field.id());
            assert_eq!(
                render_visibility(&descriptor),
                mode == FilterMode::ExactText,
                "{}",
                field.id()
            );

            let form = FormView::build(&schema, &submission.decode_all(&schema)).unwrap();
            let view = form.field(&field.id()).unwrap();
            assert_eq!(view.submitted_mode(), Some(mode.wire_value()));
            assert_eq!(view.exact_text, "abc");
        }
    }
}

#[test]
fn none_sentinel_renders_empty_for_every_field() {
    let schema = FieldSchema::librarian();
    let submission = Submission::from_pairs(
        schema
            .fields()
            .map(|field| (field.exact_id(), "None".to_string())),
    );
    let form = FormView::build(&schema, &submission.decode_all(&schema)).unwrap();
    assert_eq!(form.fields().count(), schema.field_count());
    assert!(form.fields().all(|view| view.exact_text.is_empty()));
}

#[test]
fn exact_none_encodes_as_empty_token() {
    let schema = FieldSchema::librarian();
    let submission = Submission::from_pairs([
        ("test_command", "Exact"),
        ("test_command_exact", "None"),
    ]);
    let descriptors = submission.decode_all(&schema);
    let argv = build_command(Path::new("/srv/tools"), "lookup.py", &descriptors);
    assert_eq!(argv[8], "");

    let form = FormView::build(&schema, &descriptors).unwrap();
    let again = form.resubmission().decode_all(&schema);
    assert_eq!(again, descriptors);
}

#[test]
fn decode_render_decode_is_stable() {
    let schema = FieldSchema::librarian();
    let submission = Submission::from_pairs([
        ("profile_user", "Exact"),
        ("profile_user_exact", "awesome"),
        ("build_commit", "None"),
        ("test_packets", "True"),
        ("test_packets_exact", "hidden but kept"),
        ("variables_independent", "False"),
        ("variables_independent_exact", "packets"),
        ("variables_dependent_exact", "total"),
        ("update", "Graph Result"),
    ]);
    let first = submission.decode_all(&schema);
    let form = FormView::build(&schema, &first).unwrap();
    let second = form.resubmission().decode_all(&schema);
    assert_eq!(first, second);
    assert_eq!(
        form.field("test_packets").unwrap().exact_text,
        "hidden but kept"
    );
}

#[test]
fn exact_token_replaces_mode_name() {
    let schema = FieldSchema::new(vec![Category::new("test", ["command"])]).unwrap();
    let exact = Submission::from_pairs([("test_command", "Exact"), ("test_command_exact", "foo")]);
    let argv = build_command(Path::new(""), "lookup.py", &exact.decode_all(&schema));
    assert_eq!(argv, vec!["lookup.py", "foo"]);

    let independent = Submission::from_pairs([("test_command", "True")]);
    let descriptors = independent.decode_all(&schema);
    let argv = build_command(Path::new(""), "lookup.py", &descriptors);
    assert_eq!(argv, vec!["lookup.py", "True"]);
    let form = FormView::build(&schema, &descriptors).unwrap();
    let view = form.field("test_command").unwrap();
    assert_eq!(view.exact_text, "");
    assert!(!view.exact_visible);
}

#[test]
fn variables_always_encode_their_text() {
    let schema = FieldSchema::librarian();
    for mode in ["False", "None", "True", "Exact", "garbage"] {
        let submission = Submission::from_pairs([
            ("variables_independent", mode),
            ("variables_independent_exact", "rules"),
            ("variables_dependent", mode),
            ("variables_dependent_exact", "system"),
        ]);
        let argv = build_command(Path::new("/srv"), "lookup.py", &submission.decode_all(&schema));
        assert_eq!(&argv[argv.len() - 2..], &["rules", "system"]);
    }
}
