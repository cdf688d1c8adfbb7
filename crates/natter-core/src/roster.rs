//! User registry.
//!
//! Fixed-size slot table indexed by the server's own user numbering. The
//! client never assigns ids: the server announces `+[id]name` and `-[id]`,
//! and the roster mirrors that.

use tracing::debug;

use crate::sink::DisplaySink;

/// Number of slots. Ids outside `0..CAPACITY` are ignored.
pub const CAPACITY: usize = 256;

/// One roster slot. The name of an inactive slot is stale and never rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSlot {
    name: String,
    active: bool,
}

impl UserSlot {
    /// Name last stored in this slot.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the slot is occupied.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Slot table of present users.
#[derive(Debug, Clone)]
pub struct Roster {
    slots: Vec<UserSlot>,
}

impl Roster {
    /// Create a roster with every slot inactive.
    pub fn new() -> Self {
        Self { slots: vec![UserSlot::default(); CAPACITY] }
    }

    /// Occupy slot `id` with `name`, then refresh the sink's user list.
    ///
    /// Returns `false` and does nothing if `id` is out of range.
    pub fn set_active<S>(&mut self, id: i64, name: &str, sink: &mut S) -> bool
    where
        S: DisplaySink + ?Sized,
    {
        let Some(index) = slot_index(id) else {
            debug!(id, "ignoring join for out-of-range slot");
            return false;
        };

        let slot = &mut self.slots[index];
        slot.name.clear();
        slot.name.push_str(name);
        slot.active = true;

        self.render(sink);
        true
    }

    /// Free slot `id`, then refresh the sink's user list.
    ///
    /// Returns `false` and does nothing if `id` is out of range.
    pub fn set_inactive<S>(&mut self, id: i64, sink: &mut S) -> bool
    where
        S: DisplaySink + ?Sized,
    {
        let Some(index) = slot_index(id) else {
            debug!(id, "ignoring leave for out-of-range slot");
            return false;
        };

        self.slots[index].active = false;

        self.render(sink);
        true
    }

    /// Mark every slot inactive. Emits nothing.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
    }

    /// Replace the sink's user list with the active slots in ascending id
    /// order.
    pub fn render<S>(&self, sink: &mut S)
    where
        S: DisplaySink + ?Sized,
    {
        sink.clear_user_list();
        for (id, name) in self.active() {
            sink.append_user(id, name);
        }
    }

    /// Name in slot `id`, if that slot is active.
    pub fn get(&self, id: usize) -> Option<&str> {
        self.slots.get(id).filter(|slot| slot.active).map(UserSlot::name)
    }

    /// Raw slot `id`, active or not.
    pub fn slot(&self, id: usize) -> Option<&UserSlot> {
        self.slots.get(id)
    }

    /// Active slots in ascending id order.
    pub fn active(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(id, slot)| (id, slot.name.as_str()))
    }

    /// Number of active slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    /// Whether no slot is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

fn slot_index(id: i64) -> Option<usize> {
    usize::try_from(id).ok().filter(|&index| index < CAPACITY)
}
