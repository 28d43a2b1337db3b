//! Entity trait: records identified by a stable key rather than their contents.

/// Anything stored by key in an upsert-by-id collection.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Replace the entry with the same id in place, or append when unseen.
///
/// Returns `true` when an existing entry was replaced.
pub fn upsert_by_id<E: Entity>(items: &mut Vec<E>, item: E) -> bool {
    match items.iter().position(|existing| existing.id() == item.id()) {
        Some(index) => {
            items[index] = item;
            true
        }
        None => {
            items.push(item);
            false
        }
    }
}
