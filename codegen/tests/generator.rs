mod common;

use codegen::{ScopeResolver, run_pass_with};
use common::*;

#[test]
fn restriction_followed_by_termination() {
    let roots = vec![main(vec![restrict("x", vec![send("x", "x")]), end()])];
    assert_eq!(text(roots), "$x. x'<x>. 0");

    let roots = vec![main(vec![restrict("x", vec![send("x", "x"), end()])])];
    assert_eq!(text(roots), "$x. x'<x>. 0");
}

#[test]
fn scope_prefixes_are_terminated_before_a_sibling() {
    let roots = vec![main(vec![multi_restrict(&["x", "y"], vec![send("x", "y")]), end()])];
    assert_eq!(text(roots), "$x. $y. x'<y>. 0");

    let roots = vec![
        global("a"),
        global("b"),
        main(vec![guard("a", "=", "b", vec![sync("a")]), end()]),
    ];
    assert_eq!(text(roots), "[a=b] a'<a>. 0");

    let roots = vec![
        global("a"),
        main(vec![multi_receive("a", &["p"], vec![]), end()]),
    ];
    assert_eq!(text(roots), "a(p). 0");

    // An empty prefix adds no separator.
    let roots = vec![main(vec![restrict("", vec![]), end()])];
    assert_eq!(text(roots), "0");
}

#[test]
fn long_statement_chain() {
    let mut body: Vec<_> = (0..300).map(|_| sync("a")).collect();
    body.push(end());
    let text = text(vec![global("a"), main(body)]);
    assert_eq!(text.matches("a'<a>. ").count(), 300);
    assert!(text.ends_with("a'<a>. 0"));
}

#[test]
fn no_program_means_no_text() {
    assert_eq!(text(vec![]), "");
    assert_eq!(text(vec![global("a")]), "");
    // Statements outside a main program or process are never emitted.
    assert_eq!(text(vec![global("a"), restrict("x", vec![end()])]), "");
}

#[test]
fn empty_main() {
    assert_eq!(text(vec![main(vec![])]), "");
    assert_eq!(text(vec![main(vec![end()])]), "0");
}

#[test]
fn terminator_between_actions() {
    let roots = vec![global("a"), main(vec![sync("a"), send("a", "a"), end()])];
    assert_eq!(text(roots), "a'<a>. a'<a>. 0");
}

#[test]
fn unresolved_reference_renders_empty() {
    // `x` is only visible inside the restriction.
    let roots = vec![main(vec![restrict("x", vec![]), send("x", "x")])];
    assert_eq!(text(roots), "$x");

    let roots = vec![main(vec![send("nowhere", "nowhere"), end()])];
    assert_eq!(text(roots), "0");
}

#[test]
fn global_names_are_visible_everywhere() {
    // Global declarations take effect even when placed after the program.
    let roots = vec![main(vec![sync("g")]), global("g")];
    assert_eq!(text(roots), "g'<g>");
}

#[test]
fn shadowed_name_still_resolves() {
    let roots = vec![global("x"), main(vec![restrict("x", vec![send("x", "x")])])];
    assert_eq!(text(roots), "$x. x'<x>");
}

#[test]
fn fork_with_single_branch_is_unwrapped() {
    let roots = vec![main(vec![parallel(vec![vec![], vec![end()]])])];
    assert_eq!(text(roots), "0");

    let roots = vec![main(vec![restrict("x", vec![choice(vec![vec![send("x", "x")], vec![]])])])];
    assert_eq!(text(roots), "$x. x'<x>");
}

#[test]
fn fork_with_no_branches_is_empty() {
    assert_eq!(text(vec![main(vec![parallel(vec![vec![], vec![]])])]), "");
    assert_eq!(text(vec![main(vec![choice(vec![])])]), "");
}

#[test]
fn top_level_fork_has_no_parentheses() {
    let roots = vec![global("a"), main(vec![parallel(vec![vec![sync("a")], vec![end()]])])];
    assert_eq!(text(roots), "a'<a> | 0");

    let roots = vec![main(vec![choice(vec![vec![end()], vec![end()], vec![end()]])])];
    assert_eq!(text(roots), "0 + 0 + 0");
}

#[test]
fn nested_fork_is_parenthesized() {
    let roots = vec![main(vec![restrict(
        "x",
        vec![parallel(vec![vec![send("x", "x")], vec![], vec![end()]])],
    )])];
    assert_eq!(text(roots), "$x. (x'<x> | 0)");
}

#[test]
fn forks_nest() {
    let roots = vec![main(vec![parallel(vec![
        vec![choice(vec![vec![end()], vec![end()]])],
        vec![end()],
    ])])];
    assert_eq!(text(roots), "(0 + 0) | 0");
}

#[test]
fn receive_binds_its_name() {
    let roots = vec![global("a"), main(vec![receive("a", "y", vec![send("y", "y")])])];
    assert_eq!(text(roots), "a(y). y'<y>");

    let roots = vec![global("a"), main(vec![receive("a", "y", vec![]), end()])];
    assert_eq!(text(roots), "a(y). 0");
}

#[test]
fn receive_on_unknown_channel_is_empty() {
    let roots = vec![main(vec![receive("a", "y", vec![end()])])];
    assert_eq!(text(roots), "");
}

#[test]
fn guard_condition() {
    let roots = vec![global("a"), global("b"), main(vec![guard("a", "=", "b", vec![end()])])];
    assert_eq!(text(roots), "[a=b] 0");

    let roots = vec![global("a"), global("b"), main(vec![guard("a", "!=", "b", vec![])])];
    assert_eq!(text(roots), "[a!=b]");
}

#[test]
fn multi_restriction_declares_every_name() {
    let roots = vec![main(vec![multi_restrict(&["x", "y"], vec![send("x", "y")])])];
    assert_eq!(text(roots), "$x. $y. x'<y>");

    let roots = vec![main(vec![multi_restrict(&[], vec![end()])])];
    assert_eq!(text(roots), "");
}

#[test]
fn multi_receive_and_multi_send() {
    let roots = vec![
        global("a"),
        main(vec![multi_receive("a", &["p", "q"], vec![multi_send("p", &["q", "a"])])]),
    ];
    assert_eq!(text(roots), "a(p). a(q). p'<q>. p'<a>");
}

#[test]
fn process_definition_and_call() {
    let roots = vec![
        global("a"),
        main(vec![call("Echo", vec![name("a")])]),
        process("echo", "Echo", &["x"], vec![send("x", "x")]),
    ];
    assert_eq!(text(roots), "Echo(x) = x'<x>\n\nEcho(a)");
}

#[test]
fn raw_output_keeps_traversal_order() {
    let tree = tree(vec![
        global("a"),
        main(vec![call("Echo", vec![name("a")])]),
        process("echo", "Echo", &["x"], vec![send("x", "x")]),
    ]);
    let mut scopes = ScopeResolver::new();
    let generation = run_pass_with(&tree, &mut scopes, false);
    assert_eq!(generation.text, "Echo(a)\nEcho(x) = x'<x>");
}

#[test]
fn process_without_parameters() {
    let roots = vec![process("p", "Stop", &[], vec![end()])];
    assert_eq!(text(roots), "Stop = 0");

    // No call arguments means no parentheses either.
    let roots = vec![process("p", "Stop", &[], vec![end()]), main(vec![call("Stop", vec![])])];
    assert_eq!(text(roots), "Stop = 0\n\nStop");
}

#[test]
fn process_with_empty_body_is_omitted() {
    let roots = vec![process("p", "Idle", &["x"], vec![]), main(vec![end()])];
    assert_eq!(text(roots), "0");
}

#[test]
fn parameters_are_local_to_the_process() {
    let roots = vec![
        process("p", "Fwd", &["x"], vec![end()]),
        main(vec![send("x", "x")]),
    ];
    assert_eq!(text(roots), "Fwd(x) = 0");
}

#[test]
fn call_with_too_few_arguments_still_emits() {
    let (_, _, generation) = run(vec![
        global("a"),
        process("p", "Pair", &["x", "y"], vec![end()]),
        main(vec![call("Pair", vec![name("a")])]),
    ]);
    assert_eq!(generation.text, "Pair(x, y) = 0\n\nPair(a)");
    assert_eq!(generation.warnings.len(), 1);
    assert_eq!(generation.warnings[0].to_string(), "expected 2 arguments, but got 1");
}
