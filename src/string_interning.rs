//! Interned identifier/literal text.
//!
//! Grounded on the teacher's `string_interning.rs`: a `Vec<Box<str>>` owns the
//! text, a reverse `FxHashMap` maps slices back to IDs. Pushing into the `Vec`
//! never moves the heap buffer a `Box<str>` points to, so it is sound to widen
//! the borrow to `'static` for the reverse map's key.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

impl StringId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

#[derive(Default)]
pub struct StringTable {
    strings: Vec<Box<str>>,
    ids: FxHashMap<&'static str, StringId>,
}

impl StringTable {
    pub fn new() -> Self {
        StringTable::default()
    }

    pub fn intern(&mut self, text: &str) -> StringId {
        if let Some(id) = self.ids.get(text) {
            return *id;
        }

        let boxed: Box<str> = Box::from(text);
        let id = StringId(self.strings.len() as u32);

        // Safety: `boxed`'s heap allocation outlives the table (it is moved
        // into `self.strings` below and never removed or reallocated in
        // place), so widening this borrow to `'static` is sound as long as
        // the slice is never read after the table itself is dropped.
        let static_str: &'static str = unsafe { std::mem::transmute(&*boxed) };

        self.strings.push(boxed);
        self.ids.insert(static_str, id);
        id
    }

    pub fn resolve(&self, id: StringId) -> &str {
        &self.strings[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut table = StringTable::new();
        let a = table.intern("foo");
        let b = table.intern("foo");
        let c = table.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.resolve(a), "foo");
        assert_eq!(table.resolve(c), "bar");
    }

    #[test]
    fn survives_growth_past_several_reallocations() {
        let mut table = StringTable::new();
        let mut ids = Vec::new();
        for i in 0..256 {
            ids.push(table.intern(&format!("sym_{i}")));
        }
        for (i, id) in ids.into_iter().enumerate() {
            assert_eq!(table.resolve(id), format!("sym_{i}"));
        }
    }
}
