//! Signed-in pages.

pub(crate) mod conversations;

mod listing_edit;
mod messages;
mod my_listings;
mod profile;

pub use listing_edit::ListingEditPage;
pub use messages::MessagesPage;
pub use my_listings::MyListingsPage;
pub use profile::ProfilePage;
