//! View lifecycle.

use futures_util::future::LocalBoxFuture;

/// A routed page.
///
/// `render` builds the page into the app container and wires its events;
/// `destroy` is called when the router replaces the view and must tear down
/// anything `render` attached (dropping a [`crate::dom::Listeners`] handles
/// event closures; realtime subscriptions end when their handle drops).
pub trait View {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>>;

    fn destroy(&mut self) {}
}

pub type BoxedView = Box<dyn View>;
