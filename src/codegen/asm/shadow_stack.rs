//! Compile-time model of the runtime stack (spec.md §4.5).
//!
//! Every `push`/`pop` the emitter performs against the real `rsp` is mirrored here so rbp-relative
//! offsets of named values can be computed purely from this model, without ever reading back
//! emitted instructions. `align`/`unalign` track the 16-byte-call-alignment padding as a stack of
//! pending amounts so they nest correctly around calls made while evaluating call arguments.

#[derive(Debug, Clone)]
struct Slot {
    name: Option<String>,
    size: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ShadowStack {
    slots: Vec<Slot>,
    pad_stack: Vec<i64>,
}

impl ShadowStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte distance from `rsp` to the frame's saved `rbp`, matching the invariant in spec.md
    /// §4.5: "`stack.size` equals the byte distance from `rsp` to the stored `rbp`".
    pub fn size(&self) -> i64 {
        self.slots.iter().map(|s| s.size).sum()
    }

    pub fn push(&mut self, size: i64) {
        self.slots.push(Slot { name: None, size });
    }

    pub fn push_named(&mut self, name: impl Into<String>, size: i64) {
        self.slots.push(Slot {
            name: Some(name.into()),
            size,
        });
    }

    pub fn pop(&mut self) -> i64 {
        self.slots.pop().expect("shadow stack underflow").size
    }

    /// Remove exactly `amount` bytes from the top of the model, trimming (rather than fully
    /// popping) the topmost slot when it is larger than `amount`. Used where codegen frees part
    /// of an aggregate value already sitting in a single slot (e.g. projecting one field out of
    /// a struct, or discarding a value's trailing bytes).
    pub fn pop_bytes(&mut self, mut amount: i64) {
        while amount > 0 {
            let top = self.slots.last_mut().expect("shadow stack underflow");
            if top.size <= amount {
                amount -= top.size;
                self.slots.pop();
            } else {
                top.size -= amount;
                amount = 0;
            }
        }
    }

    /// Pop `count` top slots and push one combined slot of `new_size` bytes, optionally named --
    /// used after an array literal's data-pointer+length pushes are reclassified as one Array
    /// value (spec.md §4.5, "Array literal").
    pub fn recharacterize(&mut self, count: usize, new_size: i64, name: Option<String>) {
        for _ in 0..count {
            self.slots.pop();
        }
        self.slots.push(Slot { name, size: new_size });
    }

    /// Attach a name to the most recently pushed (topmost) slot, used when a `let` binds the
    /// value an expression just pushed.
    pub fn add_lvalue(&mut self, name: impl Into<String>) {
        if let Some(top) = self.slots.last_mut() {
            top.name = Some(name.into());
        }
    }

    /// `rbp`-relative byte offset of a named slot (negative: locals live below the saved `rbp`).
    pub fn offset_of(&self, name: &str) -> Option<i64> {
        let mut offset = 0i64;
        for slot in self.slots.iter().rev() {
            offset += slot.size;
            if slot.name.as_deref() == Some(name) {
                return Some(-offset);
            }
        }
        None
    }

    /// Add `extra` bytes' worth of padding, if needed, so that `size() + extra` becomes a
    /// multiple of 16 -- the invariant every `call` site must establish. Returns the padding
    /// pushed (0 or 8).
    pub fn align(&mut self, extra: i64) -> i64 {
        let total = self.size() + extra;
        let pad = if total % 16 == 0 { 0 } else { 8 };
        self.pad_stack.push(pad);
        if pad > 0 {
            self.push(pad);
        }
        pad
    }

    /// Pop whatever padding the matching `align` pushed.
    pub fn unalign(&mut self) {
        let pad = self.pad_stack.pop().expect("unalign without matching align");
        if pad > 0 {
            self.pop();
        }
    }

    /// Reset to an empty frame -- called on entering each user function.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.pad_stack.clear();
    }
}
