//! Watch-channel adapter over the listener protocol.
//!
//! [`Place::watch`] bridges the callback-based listener protocol into a
//! `tokio::sync::watch` channel carrying `Option<Value>`: create and change
//! transitions publish `Some(value)`, remove publishes `None`. A watch channel
//! retains the latest value, so every new subscriber (a cloned receiver, or
//! one calling `borrow` after the fact) observes the last known state
//! immediately, matching the replay guarantee the listener protocol gives to
//! late registrations.

use std::rc::Rc;

use tokio::sync::watch;

use crate::{
    Result, Value,
    place::{Listener, Place},
};

impl Place {
    /// Observe the place under `path` as a latest-value watch channel.
    ///
    /// The channel is seeded from the current state before this returns
    /// (when the place is idle; if a pass is in flight the registration and
    /// seed happen as soon as it unwinds). The underlying listener stays
    /// registered for the lifetime of the place; dropping every receiver
    /// only stops the updates from being observed.
    ///
    /// ```
    /// use placetree::Place;
    /// use serde_json::json;
    ///
    /// let root = Place::root();
    /// let names = root.watch(Some("user.name")).unwrap();
    /// assert_eq!(*names.borrow(), None);
    ///
    /// root.replicate(json!({ "user": { "name": "Alice" } }));
    /// assert_eq!(*names.borrow(), Some(json!("Alice")));
    /// ```
    pub fn watch(&self, watch_path: Option<&str>) -> Result<watch::Receiver<Option<Value>>> {
        let (sender, receiver) = watch::channel(None);
        let sender = Rc::new(sender);

        let listener = Listener::builder()
            .on_create({
                let sender = Rc::clone(&sender);
                move |created: &Value, _place: &Place| {
                    let _ = sender.send(Some(created.clone()));
                }
            })
            .on_change({
                let sender = Rc::clone(&sender);
                move |after: &Value, _before: &Value, _place: &Place| {
                    let _ = sender.send(Some(after.clone()));
                }
            })
            .on_remove(move |_removed: Option<&Value>, _place: &Place| {
                let _ = sender.send(None);
            })
            .build()?;

        self.listen(&listener, watch_path);
        Ok(receiver)
    }
}
