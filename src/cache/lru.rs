//! LRU List Module
//!
//! Recency order for cache eviction, kept as a doubly-linked list threaded
//! through a slab so that touch, insert and evict are all O(1).

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
}

// == LRU List ==
/// Intrusive recency list.
///
/// - Head = most recently used
/// - Tail = least recently used
///
/// Each pushed value gets a stable slot index, valid until that value is
/// popped or removed. The owner keeps the index next to its map entry.
#[derive(Debug)]
pub struct LruList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts `value` as most recently used and returns its slot index.
    pub fn push_front(&mut self, value: T) -> usize {
        let slot = Slot {
            value: Some(value),
            prev: NIL,
            next: NIL,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = slot;
                index
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        self.link_front(index);
        self.len += 1;
        index
    }

    // == Touch ==
    /// Marks the value at `index` as most recently used.
    pub fn touch(&mut self, index: usize) {
        if self.head == index || !self.is_live(index) {
            return;
        }
        self.unlink(index);
        self.link_front(index);
    }

    // == Pop Back ==
    /// Removes and returns the least recently used value.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.tail == NIL {
            return None;
        }
        self.remove(self.tail)
    }

    // == Remove ==
    /// Removes the value at `index`, freeing its slot.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if !self.is_live(index) {
            return None;
        }
        self.unlink(index);
        self.len -= 1;
        self.free.push(index);
        self.slots[index].value.take()
    }

    // == Peek Back ==
    /// Returns the least recently used value without removing it.
    pub fn peek_back(&self) -> Option<&T> {
        self.slots.get(self.tail).and_then(|slot| slot.value.as_ref())
    }

    // == Iteration ==
    /// Values from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let slot = self.slots.get(cursor)?;
            cursor = slot.next;
            slot.value.as_ref()
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    fn is_live(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .is_some_and(|slot| slot.value.is_some())
    }

    fn link_front(&mut self, index: usize) {
        self.slots[index].prev = NIL;
        self.slots[index].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = index;
        }
        self.head = index;
        if self.tail == NIL {
            self.tail = index;
        }
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = (self.slots[index].prev, self.slots[index].next);
        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.slots[index].prev = NIL;
        self.slots[index].next = NIL;
    }
}
