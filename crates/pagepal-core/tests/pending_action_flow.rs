//! Integration tests for the offer → confirm → search flow.
//!
//! Mirrors how the side panel uses the helpers: an assistant reply may leave
//! a pending action behind, and the user's next message either confirms it,
//! declines it, or is an ordinary message that clears it.

use pagepal_core::{
    PendingAction, detect_pending_action, is_affirmative, is_negative, resolve_search_query,
};

/// What the host should do with the user's next message.
#[derive(Debug, PartialEq, Eq)]
enum Next {
    Search(String),
    Declined,
    SendToModel,
}

fn route(pending: Option<&PendingAction>, user_text: &str, last_user: Option<&str>) -> Next {
    match pending {
        Some(PendingAction::SearchWeb { query }) if is_affirmative(user_text) => {
            Next::Search(resolve_search_query(query, last_user))
        }
        Some(_) if is_negative(user_text) => Next::Declined,
        _ => Next::SendToModel,
    }
}

#[test]
fn confirmed_specific_offer_searches_captured_query() {
    let pending = detect_pending_action("Would you like me to search for Rust 2024 release notes?");
    assert_eq!(
        route(pending.as_ref(), "yes please", Some("what changed in rust?")),
        Next::Search("Rust 2024 release notes".to_string())
    );
}

#[test]
fn confirmed_vague_offer_searches_previous_question() {
    let pending = detect_pending_action(
        "I can certainly find that information for you with a quick search if you'd like!",
    );
    assert_eq!(
        route(pending.as_ref(), "Sure", Some("Where is Tesla's headquarters?")),
        Next::Search("Where is Tesla's headquarters?".to_string())
    );
}

#[test]
fn declined_offer() {
    let pending = detect_pending_action("Should I check the release date?");
    assert_eq!(route(pending.as_ref(), "no thanks", None), Next::Declined);
}

#[test]
fn unrelated_reply_goes_to_model() {
    let pending = detect_pending_action("Should I check the release date?");
    assert_eq!(
        route(pending.as_ref(), "actually, summarise the page", None),
        Next::SendToModel
    );
}

#[test]
fn no_offer_means_no_interception() {
    let pending = detect_pending_action("Here is a summary of the article.");
    assert!(pending.is_none());
    assert_eq!(route(pending.as_ref(), "yes", None), Next::SendToModel);
}

#[test]
fn pending_action_serializes_with_type_tag() {
    let action = PendingAction::SearchWeb {
        query: "tesla".to_string(),
    };
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["type"], "search_web");
    assert_eq!(json["params"]["query"], "tesla");
}
