//! Quad tree demo
//!
//! Builds quad trees with unshared and shared leaves under each allocation
//! policy, then counts and times repeated traversals.
//!
//! ```text
//! RUST_LOG=info cargo run --example quadtree -- 6 20
//! ```
//! Arguments are the tree depth (default 5) and traversal count (default 10).

use anyhow::{Context, Result};
use scenecore::config::{AllocatorKind, ObjectConfig};
use scenecore::prelude::*;

fn main() -> Result<()> {
    scenecore::init_logging();

    let mut args = std::env::args().skip(1);
    let levels: u32 = match args.next() {
        Some(arg) => arg.parse().with_context(|| format!("invalid depth `{arg}`"))?,
        None => 5,
    };
    let traversals: usize = match args.next() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid traversal count `{arg}`"))?,
        None => 10,
    };

    let base = ObjectConfig::from_env().context("reading SCENECORE_* configuration")?;
    log::info!("quad tree depth {levels}, {traversals} traversals per run");

    for kind in [AllocatorKind::Heap, AllocatorKind::Tracking] {
        let config = base.clone().with_allocator(kind);
        for shared in [false, true] {
            run(&config, levels, traversals, shared);
        }
    }

    Ok(())
}

fn run(config: &ObjectConfig, levels: u32, traversals: usize, shared: bool) {
    let allocator = config.build_allocator();
    let mut monitor = config.build_monitor();

    let shared_leaf = shared.then(|| allocator.create(Leaf::new()).upcast());
    let tree = QuadGroup::build_tree(levels, shared_leaf.as_ref(), &allocator);

    let mut unique = CountObjects::unique();
    tree.accept(&mut unique);

    for _ in 0..traversals {
        monitor.measure(|| {
            let mut counter = CountObjects::new();
            tree.accept(&mut counter);
            counter.total()
        });
    }
    monitor.update_allocation_stats(&allocator);

    println!(
        "[{} allocator, {} leaves] {} quad groups, {} distinct leaves",
        allocator.policy_name(),
        if shared { "shared" } else { "unshared" },
        unique.count("QuadGroup"),
        unique.count("Leaf"),
    );
    println!("    {}", monitor.get_metrics());

    drop(tree);
    drop(shared_leaf);
    if let Some(stats) = allocator.stats() {
        log::info!("after release: {} live objects", stats.live_objects);
    }
}
