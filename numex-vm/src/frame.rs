use numex_compute::Value;

/// The slots of a running function: its parameters, followed by the locals of its scoping
/// constructs.
#[derive(Debug)]
pub struct Frame {
    /// The value of each slot, or [`None`] if the slot was never assigned.
    pub slots: Vec<Option<Value>>,
}

impl Frame {
    /// Creates a new [`Frame`] with the given number of slots, the first of which are set to the
    /// given arguments.
    pub fn new(slots: usize, arguments: Vec<Value>) -> Self {
        let mut frame = Self { slots: vec![None; slots.max(arguments.len())] };
        for (slot, argument) in arguments.into_iter().enumerate() {
            frame.slots[slot] = Some(argument);
        }
        frame
    }

    /// Gets the value of a slot.
    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Sets the value of a slot.
    pub fn set(&mut self, slot: usize, value: Value) {
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, None);
        }
        self.slots[slot] = Some(value);
    }

    /// Marks a slot as never assigned.
    pub fn clear(&mut self, slot: usize) {
        if let Some(value) = self.slots.get_mut(slot) {
            *value = None;
        }
    }
}
