use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

/// Tag published after task records
/// change.
pub const TASKS_TAG: &str = "tasks";

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct Invalidation {
  pub tag:      String,
  pub sequence: u64
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash,
)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&Invalidation)>;

struct Subscriber {
  id:       SubscriptionId,
  tag:      String,
  listener: Listener
}

#[derive(Default)]
struct BusState {
  next_id:     u64,
  sequence:    u64,
  subscribers: Vec<Subscriber>
}

/// Named-tag invalidation channel.
///
/// Publishers announce that data under a
/// tag is stale; caches subscribe to the
/// tags they hold. Single-threaded: the
/// handle is cheap to clone and every
/// clone shares the same subscribers.
#[derive(Clone, Default)]
pub struct InvalidationBus {
  state: Rc<RefCell<BusState>>
}

impl InvalidationBus {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn subscribe<F>(
    &self,
    tag: impl Into<String>,
    listener: F
  ) -> SubscriptionId
  where
    F: Fn(&Invalidation) + 'static
  {
    let mut state = self.state.borrow_mut();
    state.next_id += 1;
    let id = SubscriptionId(state.next_id);
    let tag = tag.into();
    debug!(tag = %tag, id = id.0, "subscribed to invalidations");
    state.subscribers.push(Subscriber {
      id,
      tag,
      listener: Rc::new(listener)
    });
    id
  }

  pub fn unsubscribe(
    &self,
    id: SubscriptionId
  ) -> bool {
    let mut state = self.state.borrow_mut();
    let before = state.subscribers.len();
    state
      .subscribers
      .retain(|s| s.id != id);
    state.subscribers.len() != before
  }

  /// Notifies every subscriber of `tag`
  /// and returns how many were called.
  ///
  /// Listeners run after the internal
  /// borrow is released, so they may
  /// subscribe or publish themselves.
  pub fn publish(&self, tag: &str) -> usize {
    let (event, listeners) = {
      let mut state =
        self.state.borrow_mut();
      state.sequence += 1;
      let event = Invalidation {
        tag:      tag.to_string(),
        sequence: state.sequence
      };
      let listeners: Vec<Listener> = state
        .subscribers
        .iter()
        .filter(|s| s.tag == tag)
        .map(|s| Rc::clone(&s.listener))
        .collect();
      (event, listeners)
    };

    debug!(
      tag,
      sequence = event.sequence,
      listeners = listeners.len(),
      "publishing invalidation"
    );
    for listener in &listeners {
      listener(&event);
    }
    listeners.len()
  }

  pub fn subscriber_count(
    &self,
    tag: &str
  ) -> usize {
    self
      .state
      .borrow()
      .subscribers
      .iter()
      .filter(|s| s.tag == tag)
      .count()
  }

  /// Number of publications so far, on
  /// any tag.
  pub fn published(&self) -> u64 {
    self.state.borrow().sequence
  }
}

impl PartialEq for InvalidationBus {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.state, &other.state)
  }
}

impl fmt::Debug for InvalidationBus {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    let state = self.state.borrow();
    f.debug_struct("InvalidationBus")
      .field(
        "subscribers",
        &state.subscribers.len()
      )
      .field("sequence", &state.sequence)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::rc::Rc;

  use super::{
    InvalidationBus,
    TASKS_TAG
  };

  #[test]
  fn delivers_only_matching_tags() {
    let bus = InvalidationBus::new();
    let seen = Rc::new(RefCell::new(vec![]));
    {
      let seen = Rc::clone(&seen);
      bus.subscribe(TASKS_TAG, move |ev| {
        seen.borrow_mut().push(ev.clone());
      });
    }
    bus.subscribe("reviewers", |_| {
      panic!("wrong tag delivered");
    });

    assert_eq!(bus.publish(TASKS_TAG), 1);
    assert_eq!(bus.publish(TASKS_TAG), 1);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].sequence, 1);
    assert_eq!(seen[1].sequence, 2);
  }

  #[test]
  fn unsubscribe_stops_delivery() {
    let bus = InvalidationBus::new();
    let id = bus.subscribe(TASKS_TAG, |_| {});
    assert_eq!(bus.subscriber_count(TASKS_TAG), 1);
    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
    assert_eq!(bus.publish(TASKS_TAG), 0);
    assert_eq!(bus.published(), 1);
  }

  #[test]
  fn listeners_may_publish_reentrantly() {
    let bus = InvalidationBus::new();
    let inner = bus.clone();
    bus.subscribe(TASKS_TAG, move |_| {
      inner.publish("dashboard");
    });
    assert_eq!(bus.publish(TASKS_TAG), 1);
    assert_eq!(bus.published(), 2);
  }
}
