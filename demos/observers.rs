//! Observer demo
//!
//! A child keeps a back-reference to its parent through an observer, named
//! values are attached to both, and the observer reports the parent gone
//! once the last owning handle is dropped.

use anyhow::{bail, Result};
use scenecore::prelude::*;

fn main() -> Result<()> {
    scenecore::init_logging();

    let allocator = Allocator::tracking();

    let child = allocator.create(Leaf::new());
    child.set_value("name", "wheel".to_string());

    let mut parent = Group::new();
    parent.add_child(child.clone().upcast());
    let parent = allocator.create(parent);
    parent.set_value("name", "car".to_string());
    parent.set_value("wheel_count", 4u32);

    let back_reference = ObserverPtr::new(&parent);
    child.set_object("parent_name", RefPtr::new(Value::new("car".to_string())).upcast());

    let mut printer = PrintTree::new();
    parent.accept(&mut printer);
    print!("{}", printer.output());

    match back_reference.lock() {
        Some(parent) => println!(
            "parent alive: {} with {} wheels (refcount {})",
            parent.require_value::<String>("name")?,
            parent.require_value::<u32>("wheel_count")?,
            parent.ref_count()
        ),
        None => bail!("parent released while still owned"),
    }

    if let Err(err) = parent.require_value::<String>("wheel_count") {
        println!("expected lookup failure: {err}");
    }

    drop(parent);
    println!(
        "after dropping the parent: observer valid = {}, lock = {:?}",
        back_reference.is_valid(),
        back_reference.lock().map(|parent| parent.ref_count())
    );
    println!(
        "child still owned: refcount {}, parent name value {:?}",
        child.ref_count(),
        child.get_value::<String>("parent_name")
    );

    drop(child);
    if let Some(stats) = allocator.stats() {
        println!("live objects at exit: {}", stats.live_objects);
    }
    Ok(())
}
