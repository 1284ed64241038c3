//! Message relay logic.
//!
//! Pure functions deciding what the bot does with an inbound message. When
//! the bot is mentioned it echoes the message back with its own mentions
//! removed and shows itself as playing with the author:
//!
//! ```text
//! "<@42> hello there"  ──▶  PostMessage("hello there")
//!                           PresenceUpdate("with alice")
//! ```

use crate::foundation::action::{OutboundAction, Presence};
use crate::foundation::model::{Identity, Message};

/// Decides the actions for one message.
///
/// Returns nothing while the session identity is unknown, when the bot is
/// not among the message's mentions, or when the bot wrote the message
/// itself. Otherwise returns exactly `[PostMessage, PresenceUpdate]`, in
/// that order.
///
/// Both the plain `<@id>` and the nickname `<@!id>` markers are stripped.
pub fn relay(message: &Message, identity: Option<&Identity>) -> Vec<OutboundAction> {
    let Some(identity) = identity else {
        return Vec::new();
    };
    if !message.mentions_user(&identity.id) || message.author.id == identity.id {
        return Vec::new();
    }

    let content = strip_mention(&message.content, &identity.mention_token());
    let content = strip_mention(&content, &identity.nickname_mention_token());

    vec![
        OutboundAction::PostMessage {
            channel_id: message.channel_id.clone(),
            content,
        },
        OutboundAction::PresenceUpdate(Presence::playing_with(&message.author.username)),
    ]
}

/// Removes every occurrence of `token` from `content`.
///
/// Runs in two phases. The first removes `token` together with one
/// following space until no such pair is left; only then does the second
/// remove the remaining bare tokens (end of content, before punctuation,
/// back-to-back tokens). Each phase removes the leftmost match and searches
/// again from the start, so occurrences that form only after a removal are
/// caught as well.
pub fn strip_mention(content: &str, token: &str) -> String {
    if token.is_empty() {
        return content.to_string();
    }

    let mut cleaned = content.to_string();
    remove_all(&mut cleaned, &format!("{token} "));
    remove_all(&mut cleaned, token);
    cleaned
}

fn remove_all(haystack: &mut String, needle: &str) {
    while let Some(pos) = haystack.find(needle) {
        haystack.replace_range(pos..pos + needle.len(), "");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::action::Activity;
    use crate::foundation::model::{Author, Mention};

    const TOKEN: &str = "<@42>";

    fn bot() -> Identity {
        Identity::new("42", "ferrite")
    }

    fn message(content: &str, mentions: &[&str]) -> Message {
        Message {
            id: "1000".into(),
            channel_id: "9".into(),
            content: content.into(),
            author: Author {
                id: "7".into(),
                username: "alice".into(),
            },
            mentions: mentions
                .iter()
                .map(|id| Mention { id: id.to_string() })
                .collect(),
        }
    }

    // ---------------------------------------------------------------------
    // strip_mention
    // ---------------------------------------------------------------------

    #[test]
    fn test_strip_leading_mention() {
        assert_eq!(strip_mention("<@42> hi", TOKEN), "hi");
    }

    #[test]
    fn test_strip_trailing_mention_keeps_space() {
        assert_eq!(strip_mention("hi <@42>", TOKEN), "hi ");
    }

    #[test]
    fn test_strip_repeated_mentions() {
        assert_eq!(strip_mention("<@42> <@42> done", TOKEN), "done");
    }

    #[test]
    fn test_strip_adjacent_mentions_without_space() {
        assert_eq!(strip_mention("<@42><@42>!", TOKEN), "!");
    }

    #[test]
    fn test_strip_mention_before_punctuation() {
        assert_eq!(strip_mention("hey <@42>, you there?", TOKEN), "hey , you there?");
    }

    #[test]
    fn test_strip_middle_mention() {
        assert_eq!(strip_mention("ask <@42> about it", TOKEN), "ask about it");
    }

    #[test]
    fn test_strip_removes_only_one_following_space() {
        assert_eq!(strip_mention("<@42>  two spaces", TOKEN), " two spaces");
    }

    #[test]
    fn test_strip_occurrence_formed_by_removal() {
        // Removing the inner "<@42> " leaves a fresh "<@42> " behind.
        assert_eq!(strip_mention("<@4<@42> 2> hi", TOKEN), "hi");
        // Same for bare tokens in phase two.
        assert_eq!(strip_mention("<@4<@42>2>!", TOKEN), "!");
    }

    #[test]
    fn test_strip_leaves_other_users_alone() {
        assert_eq!(strip_mention("<@7> <@42> hi <@420>", TOKEN), "<@7> hi <@420>");
    }

    #[test]
    fn test_strip_only_mention() {
        assert_eq!(strip_mention("<@42>", TOKEN), "");
        assert_eq!(strip_mention("<@42> ", TOKEN), "");
    }

    #[test]
    fn test_strip_is_idempotent_on_clean_content() {
        for content in ["", "hi", "hi ", "<@7> hello", "a < @42 > b", "!"] {
            assert_eq!(strip_mention(content, TOKEN), content);
            let once = strip_mention(content, TOKEN);
            assert_eq!(strip_mention(&once, TOKEN), once);
        }
    }

    #[test]
    fn test_strip_handles_multibyte_content() {
        assert_eq!(strip_mention("<@42> héllo <@42>🦀", TOKEN), "héllo 🦀");
    }

    #[test]
    fn test_strip_with_empty_token_is_identity() {
        assert_eq!(strip_mention("anything", ""), "anything");
    }

    // ---------------------------------------------------------------------
    // relay
    // ---------------------------------------------------------------------

    #[test]
    fn test_relay_without_identity_is_empty() {
        let msg = message("<@42> hi", &["42"]);
        assert!(relay(&msg, None).is_empty());
    }

    #[test]
    fn test_relay_not_mentioned_is_empty() {
        let identity = bot();
        for mentions in [&[][..], &["7"][..], &["420", "4"][..]] {
            let msg = message("<@42> hi", mentions);
            assert!(relay(&msg, Some(&identity)).is_empty());
        }
    }

    #[test]
    fn test_relay_mentioned_produces_post_then_presence() {
        let identity = bot();
        let msg = message("<@42> hello there", &["7", "42"]);

        let actions = relay(&msg, Some(&identity));
        assert_eq!(
            actions,
            vec![
                OutboundAction::PostMessage {
                    channel_id: "9".into(),
                    content: "hello there".into(),
                },
                OutboundAction::PresenceUpdate(Presence {
                    status: "online".into(),
                    activity: Activity {
                        name: "with alice".into(),
                        kind: 0,
                    },
                    afk: false,
                    since: None,
                }),
            ]
        );
    }

    #[test]
    fn test_relay_strips_nickname_mentions() {
        let identity = bot();
        let msg = message("<@!42> hi <@42>", &["42"]);

        let actions = relay(&msg, Some(&identity));
        assert_eq!(
            actions[0],
            OutboundAction::PostMessage {
                channel_id: "9".into(),
                content: "hi ".into(),
            }
        );
    }

    #[test]
    fn test_relay_ignores_own_messages() {
        let identity = bot();
        let mut msg = message("<@!42> hi", &["42"]);
        msg.author.id = "42".into();
        msg.author.username = "ferrite".into();

        assert!(relay(&msg, Some(&identity)).is_empty());
    }

    #[test]
    fn test_relay_mention_via_list_only() {
        // Listed as mentioned (e.g. a reply ping) but no token in the text.
        let identity = bot();
        let msg = message("plain text", &["42"]);

        let actions = relay(&msg, Some(&identity));
        assert_eq!(actions.len(), 2);
        assert_eq!(
            actions[0],
            OutboundAction::PostMessage {
                channel_id: "9".into(),
                content: "plain text".into(),
            }
        );
    }
}
