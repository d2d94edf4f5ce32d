use codegen::canonical::{Line, LineKind, order};
use codegen::canonicalize;
use codegen::persist::read_state;
use codegen::sanitize::{sanitize_name, sanitize_process_name, unique_process_name};
use codegen::{ScopeResolver, Snapshot};

#[test]
fn definitions_move_to_the_front() {
    let raw = "a'<b>\nP = 0\nQ(x) = x'<x>\n(0 | 0)";
    assert_eq!(canonicalize(raw), "P = 0\n\nQ(x) = x'<x>\n\na'<b>\n(0 | 0)");
}

#[test]
fn layout_without_one_group() {
    assert_eq!(canonicalize("P = 0\nQ = 0"), "P = 0\n\nQ = 0");
    assert_eq!(canonicalize("0\n$x. 0"), "0\n$x. 0");
    assert_eq!(canonicalize(""), "");
}

#[test]
fn structural_lines_ignore_their_text() {
    // An `=` inside a guard does not make a program line a definition.
    let lines = vec![
        Line::new("[a = b] 0".to_string(), LineKind::Program),
        Line::new("P = 0".to_string(), LineKind::Definition),
    ];
    assert_eq!(order(&lines), "P = 0\n\n[a = b] 0");
    assert_eq!(Line::classify("[a = b] 0").kind, LineKind::Definition);
}

#[test]
fn name_sanitizing() {
    assert_eq!(sanitize_name("9Chan-nel!"), "channel");
    assert_eq!(sanitize_name("_x"), "_x");
    assert_eq!(sanitize_name("123"), "");
    assert_eq!(sanitize_process_name("_1server proc"), "Serverproc");
    assert_eq!(sanitize_process_name("Client"), "Client");
}

#[test]
fn colliding_process_names_get_a_suffix() {
    let mut scopes = ScopeResolver::new();
    scopes.register_process("a", "Server", &[]);
    scopes.exit_scope();
    scopes.register_process("b", "Server0", &[]);
    scopes.exit_scope();
    scopes.commit();

    let snapshot = scopes.committed();
    assert_eq!(unique_process_name("server", "a", snapshot), "Server");
    assert_eq!(unique_process_name("server", "c", snapshot), "Server1");
    assert_eq!(unique_process_name("Client", "c", snapshot), "Client");
    assert_eq!(unique_process_name("x", "c", &Snapshot::default()), "X");
}

#[test]
fn snapshot_defaults_fill_missing_keys() {
    let snapshot = read_state(r#"{"state": {}}"#).unwrap().unwrap();
    assert_eq!(snapshot, Snapshot::default());
}
