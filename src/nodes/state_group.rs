//! Group node carrying state commands

use crate::model::{Object, ObjectCore, RefPtr};
use crate::visit::Visitor;

/// Named piece of render state bound to a slot
///
/// Stands in for pipeline and descriptor bindings, which belong to the
/// renderer rather than the object model.
#[derive(Debug)]
pub struct StateCommand {
    core: ObjectCore,
    pub slot: u32,
    pub label: String,
}

impl StateCommand {
    pub fn new(slot: u32, label: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(),
            slot,
            label: label.into(),
        }
    }
}

impl Object for StateCommand {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn class_name(&self) -> &'static str {
        "StateCommand"
    }
}

/// Group whose state commands apply to all of its children
///
/// Traversal visits the state commands first, then the children, each in
/// insertion order.
#[derive(Debug, Default)]
pub struct StateGroup {
    core: ObjectCore,
    state_commands: Vec<RefPtr<dyn Object>>,
    children: Vec<RefPtr<dyn Object>>,
}

impl StateGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state_command(&mut self, command: RefPtr<dyn Object>) {
        self.state_commands.push(command);
    }

    pub fn add_child(&mut self, child: RefPtr<dyn Object>) {
        self.children.push(child);
    }

    pub fn state_commands(&self) -> &[RefPtr<dyn Object>] {
        &self.state_commands
    }

    pub fn children(&self) -> &[RefPtr<dyn Object>] {
        &self.children
    }

    /// Commands of type [`StateCommand`] bound to `slot`
    pub fn commands_for_slot(&self, slot: u32) -> impl Iterator<Item = &StateCommand> + '_ {
        self.state_commands
            .iter()
            .filter_map(|command| command.as_any().downcast_ref::<StateCommand>())
            .filter(move |command| command.slot == slot)
    }
}

impl Object for StateGroup {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn class_name(&self) -> &'static str {
        "StateGroup"
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.apply_state_group(self);
    }

    fn traverse(&self, visitor: &mut dyn Visitor) {
        for command in &self.state_commands {
            command.accept(visitor);
        }
        for child in &self.children {
            child.accept(visitor);
        }
    }
}
