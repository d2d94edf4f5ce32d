#![allow(dead_code)]

use codegen::{Generation, ScopeResolver, run_pass};
use vispi::{BlockKind, BlockSpec, BlockTree, field, slot};

pub fn name(n: &str) -> BlockSpec {
    BlockSpec::new(BlockKind::NameAccess).with_field(field::NAME, n)
}

pub fn end() -> BlockSpec {
    BlockSpec::new(BlockKind::Termination)
}

pub fn global(n: &str) -> BlockSpec {
    BlockSpec::new(BlockKind::GlobalName).with_field(field::NEW, n)
}

pub fn main(body: Vec<BlockSpec>) -> BlockSpec {
    BlockSpec::new(BlockKind::Main)
        .with_id("main")
        .with_statements(slot::MAIN, body)
}

pub fn restrict(n: &str, body: Vec<BlockSpec>) -> BlockSpec {
    BlockSpec::new(BlockKind::Restrict)
        .with_field(field::NEW, n)
        .with_statements(slot::SCOPE, body)
}

pub fn multi_restrict(names: &[&str], body: Vec<BlockSpec>) -> BlockSpec {
    let names = names
        .iter()
        .map(|n| BlockSpec::new(BlockKind::RestrictName).with_field(field::NEW, *n))
        .collect();
    BlockSpec::new(BlockKind::MultiRestrict)
        .with_statements(slot::NAMES, names)
        .with_statements(slot::SCOPE, body)
}

pub fn send(on: &str, message: &str) -> BlockSpec {
    BlockSpec::new(BlockKind::Send)
        .with_value(slot::ON, name(on))
        .with_value(slot::MESSAGE, name(message))
}

pub fn multi_send(on: &str, messages: &[&str]) -> BlockSpec {
    let messages = messages
        .iter()
        .map(|m| BlockSpec::new(BlockKind::SendName).with_value(slot::MESSAGE, name(m)))
        .collect();
    BlockSpec::new(BlockKind::MultiSend)
        .with_value(slot::ON, name(on))
        .with_statements(slot::MESSAGES, messages)
}

pub fn sync(on: &str) -> BlockSpec {
    BlockSpec::new(BlockKind::Sync).with_value(slot::ON, name(on))
}

pub fn receive(on: &str, n: &str, body: Vec<BlockSpec>) -> BlockSpec {
    BlockSpec::new(BlockKind::Receive)
        .with_field(field::NEW, n)
        .with_value(slot::ON, name(on))
        .with_statements(slot::SCOPE, body)
}

pub fn multi_receive(on: &str, names: &[&str], body: Vec<BlockSpec>) -> BlockSpec {
    let names = names
        .iter()
        .map(|n| BlockSpec::new(BlockKind::ReceiveName).with_field(field::NEW, *n))
        .collect();
    BlockSpec::new(BlockKind::MultiReceive)
        .with_value(slot::ON, name(on))
        .with_statements(slot::NAMES, names)
        .with_statements(slot::SCOPE, body)
}

pub fn guard(left: &str, operator: &str, right: &str, body: Vec<BlockSpec>) -> BlockSpec {
    BlockSpec::new(BlockKind::Guard)
        .with_value(slot::FIRST, name(left))
        .with_field(field::OPERATION, operator)
        .with_value(slot::SECOND, name(right))
        .with_statements(slot::SCOPE, body)
}

fn fork(fork: BlockKind, branch: BlockKind, slot_name: &str, branches: Vec<Vec<BlockSpec>>) -> BlockSpec {
    let branches = branches
        .into_iter()
        .map(|body| BlockSpec::new(branch).with_statements(slot::SCOPE, body))
        .collect();
    BlockSpec::new(fork).with_statements(slot_name, branches)
}

pub fn parallel(branches: Vec<Vec<BlockSpec>>) -> BlockSpec {
    fork(BlockKind::ParallelFork, BlockKind::ParallelBranch, slot::PARALLEL, branches)
}

pub fn choice(branches: Vec<Vec<BlockSpec>>) -> BlockSpec {
    fork(BlockKind::ChoiceFork, BlockKind::ChoiceBranch, slot::CHOICE, branches)
}

pub fn process(id: &str, process_name: &str, params: &[&str], body: Vec<BlockSpec>) -> BlockSpec {
    let params = params
        .iter()
        .map(|p| BlockSpec::new(BlockKind::ProcessParam).with_field(field::NEW, *p))
        .collect();
    BlockSpec::new(BlockKind::Process)
        .with_id(id)
        .with_field(field::PROCESS, process_name)
        .with_statements(slot::PARAMS, params)
        .with_statements(slot::BODY, body)
}

pub fn call(process_name: &str, args: Vec<BlockSpec>) -> BlockSpec {
    let args = args
        .into_iter()
        .map(|value| BlockSpec::new(BlockKind::ProcessArg).with_value(slot::ARG, value))
        .collect();
    BlockSpec::new(BlockKind::ProcessCall)
        .with_field(field::PROCESS_NAME, process_name)
        .with_statements(slot::ARGS, args)
}

pub fn tree(roots: Vec<BlockSpec>) -> BlockTree {
    BlockTree::from_specs(&roots).expect("valid block specs")
}

pub fn run(roots: Vec<BlockSpec>) -> (BlockTree, ScopeResolver, Generation) {
    let tree = tree(roots);
    let mut scopes = ScopeResolver::new();
    let generation = run_pass(&tree, &mut scopes);
    (tree, scopes, generation)
}

pub fn text(roots: Vec<BlockSpec>) -> String {
    run(roots).2.text
}
