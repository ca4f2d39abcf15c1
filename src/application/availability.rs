use std::collections::HashSet;

/// The customer or visitor the checkout is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actor {
    /// `None` for guests.
    pub user_id: Option<u64>,
}

impl Actor {
    pub fn guest() -> Self {
        Self { user_id: None }
    }

    pub fn user(user_id: u64) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

/// Decides whether the gateway is offered to an actor.
pub type AvailabilityPolicy = Box<dyn Fn(&Actor) -> bool + Send + Sync>;

/// Offers the gateway only to the listed users. An empty list allows everyone.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    users: HashSet<u64>,
}

impl AllowList {
    pub fn new(users: impl IntoIterator<Item = u64>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }

    pub fn allows(&self, actor: &Actor) -> bool {
        if self.users.is_empty() {
            return true;
        }
        actor.user_id.is_some_and(|id| self.users.contains(&id))
    }

    pub fn into_policy(self) -> AvailabilityPolicy {
        Box::new(move |actor| self.allows(actor))
    }
}

pub fn allow_all() -> AvailabilityPolicy {
    Box::new(|_| true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allow_list_is_open() {
        let list = AllowList::default();
        assert!(list.allows(&Actor::guest()));
        assert!(list.allows(&Actor::user(42)));
    }

    #[test]
    fn test_allow_list_restricts() {
        let policy = AllowList::new([1]).into_policy();
        assert!(policy(&Actor::user(1)));
        assert!(!policy(&Actor::user(2)));
        assert!(!policy(&Actor::guest()));
    }
}
