//! Conversation grouping.
//!
//! The backend stores flat message rows; the inbox shows one entry per
//! `(listing, counterpart)` pair. Grouping is a single pass over the user's
//! messages, keeping the newest message per conversation and counting unread
//! incoming ones.

use std::collections::HashMap;

use uuid::Uuid;

use crate::types::Message;

#[derive(Debug, Clone)]
pub struct Conversation {
    pub listing_id: Uuid,
    pub other_user_id: Uuid,
    /// Newest message in the conversation.
    pub last: Message,
    /// Messages addressed to `me` that are still unread.
    pub unread: usize,
}

/// Group a user's messages into conversations, newest first.
pub fn group(messages: &[Message], me: Uuid) -> Vec<Conversation> {
    let mut by_key: HashMap<(Uuid, Uuid), Conversation> = HashMap::new();

    for message in messages {
        let other = if message.sender_id == me {
            message.recipient_id
        } else {
            message.sender_id
        };
        let unread_here = usize::from(message.recipient_id == me && !message.read);

        match by_key.entry((message.listing_id, other)) {
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                let conversation = entry.get_mut();
                conversation.unread += unread_here;
                if message.created_at > conversation.last.created_at {
                    conversation.last = message.clone();
                }
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(Conversation {
                    listing_id: message.listing_id,
                    other_user_id: other,
                    last: message.clone(),
                    unread: unread_here,
                });
            }
        }
    }

    let mut conversations: Vec<Conversation> = by_key.into_values().collect();
    conversations.sort_by(|a, b| b.last.created_at.cmp(&a.last.created_at));
    conversations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn msg(
        listing: u128,
        sender: u128,
        recipient: u128,
        read: bool,
        at: i64,
    ) -> Message {
        Message {
            id: Uuid::from_u128(at as u128 + 1000),
            listing_id: Uuid::from_u128(listing),
            sender_id: Uuid::from_u128(sender),
            recipient_id: Uuid::from_u128(recipient),
            body: format!("message at {at}"),
            read,
            created_at: Utc.timestamp_opt(at, 0).unwrap(),
        }
    }

    const ME: u128 = 1;

    #[test]
    fn one_conversation_per_listing_and_counterpart() {
        let me = Uuid::from_u128(ME);
        let messages = vec![
            msg(10, 2, ME, true, 100),
            msg(10, ME, 2, true, 200),
            msg(10, 3, ME, true, 150), // same listing, different counterpart
            msg(11, 2, ME, true, 120), // same counterpart, different listing
        ];
        let conversations = group(&messages, me);
        assert_eq!(conversations.len(), 3);
    }

    #[test]
    fn newest_message_wins_and_orders_the_inbox() {
        let me = Uuid::from_u128(ME);
        let messages = vec![
            msg(10, 2, ME, true, 100),
            msg(10, ME, 2, true, 300),
            msg(11, 3, ME, true, 200),
        ];
        let conversations = group(&messages, me);
        assert_eq!(conversations[0].listing_id, Uuid::from_u128(10));
        assert_eq!(conversations[0].last.created_at.timestamp(), 300);
        assert_eq!(conversations[1].listing_id, Uuid::from_u128(11));
    }

    #[test]
    fn unread_counts_only_incoming_unread_messages() {
        let me = Uuid::from_u128(ME);
        let messages = vec![
            msg(10, 2, ME, false, 100),
            msg(10, 2, ME, false, 110),
            msg(10, 2, ME, true, 120),
            msg(10, ME, 2, false, 130), // outgoing, never counts
        ];
        let conversations = group(&messages, me);
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].unread, 2);
    }

    #[test]
    fn counterpart_is_the_non_me_side_regardless_of_direction() {
        let me = Uuid::from_u128(ME);
        let messages = vec![msg(10, ME, 7, false, 100), msg(10, 7, ME, false, 110)];
        let conversations = group(&messages, me);
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].other_user_id, Uuid::from_u128(7));
    }

    #[test]
    fn empty_input_groups_to_nothing() {
        assert!(group(&[], Uuid::from_u128(ME)).is_empty());
    }
}
