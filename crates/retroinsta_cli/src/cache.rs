use bson::oid::ObjectId;
use retroinsta_common::models::User;
use std::collections::HashMap;

/**
 * Bounded id -> User cache consulted before any user fetch. Entries are
 * inserted in arrival order and the oldest entry is evicted once the
 * capacity is reached; mutation results overwrite their entry in place so
 * views never render a stale social graph from cache.
 */
pub struct UserCache {
    capacity: usize,
    entries: HashMap<ObjectId, User>,
    order: Vec<ObjectId>, // oldest first
}

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

impl UserCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn get(&self, id: &ObjectId) -> Option<&User> {
        self.entries.get(id)
    }

    /// Insert or refresh an entry, evicting the oldest when full
    pub fn put(&mut self, user: User) {
        let Some(id) = user.id else { return };
        if self.entries.insert(id, user).is_some() {
            // refresh recency on overwrite
            self.order.retain(|existing| existing != &id);
        } else if self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.first().copied() {
                self.entries.remove(&oldest);
                self.order.remove(0);
            }
        }
        self.order.push(id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for UserCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn user(name: &str) -> User {
        let mut user = User::new(format!("g-{}", name), String::from(name), None);
        user.id = Some(ObjectId::new());
        user
    }

    #[test]
    fn evicts_the_oldest_entry_at_capacity() {
        let mut cache = UserCache::new(2);
        let first = user("first");
        let first_id = first.id.unwrap();
        let second = user("second");
        let third = user("third");

        cache.put(first);
        cache.put(second);
        cache.put(third);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&first_id).is_none());
    }

    #[test]
    fn overwrite_refreshes_instead_of_evicting() {
        let mut cache = UserCache::new(2);
        let mut alice = user("alice");
        let alice_id = alice.id.unwrap();
        let bob = user("bob");
        let bob_id = bob.id.unwrap();

        cache.put(alice.clone());
        cache.put(bob);
        // mutation result carries an updated entity for an existing entry
        alice.bio = Some(String::from("updated"));
        cache.put(alice);

        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get(&alice_id).and_then(|u| u.bio.as_deref()),
            Some("updated")
        );
        // alice was refreshed, so bob is now the eviction candidate
        cache.put(user("carol"));
        assert!(cache.get(&bob_id).is_none());
        assert!(cache.get(&alice_id).is_some());
    }

    #[test]
    fn users_without_an_id_are_not_cached() {
        let mut cache = UserCache::new(4);
        cache.put(User::new(String::from("g"), String::from("ghost"), None));
        assert!(cache.is_empty());
    }
}
