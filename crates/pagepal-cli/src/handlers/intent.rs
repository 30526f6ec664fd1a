//! `pagepal intent`: pending-action detection for assistant replies.

use pagepal_core::{PendingAction, detect_pending_action, is_affirmative, is_negative, resolve_search_query};

/// What the host would do with the user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No offer in the reply.
    NoAction,
    /// Offer found, user has not answered yet.
    Pending(PendingAction),
    /// User accepted; run this search.
    Search(String),
    /// User declined.
    Declined,
    /// The answer was neither yes nor no; it goes to the model as a normal
    /// message.
    Forward,
}

pub fn evaluate(reply: &str, answer: Option<&str>, last_user: Option<&str>) -> Outcome {
    let Some(action) = detect_pending_action(reply) else {
        return Outcome::NoAction;
    };
    let Some(answer) = answer else {
        return Outcome::Pending(action);
    };

    if is_affirmative(answer) {
        let PendingAction::SearchWeb { query } = action;
        Outcome::Search(resolve_search_query(&query, last_user))
    } else if is_negative(answer) {
        Outcome::Declined
    } else {
        Outcome::Forward
    }
}

pub fn execute(text: &str, reply: Option<&str>, last_user: Option<&str>) {
    match evaluate(text, reply, last_user) {
        Outcome::NoAction => println!("No pending action."),
        Outcome::Pending(PendingAction::SearchWeb { query }) => {
            println!("Pending web search: {query}");
        }
        Outcome::Search(query) => println!("Searching the web for: {query}"),
        Outcome::Declined => println!("Declined."),
        Outcome::Forward => println!("Not a yes/no answer; sending to the assistant."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFER: &str = "I don't have that. Would you like me to search for rust async runtimes?";

    #[test]
    fn no_offer() {
        assert_eq!(evaluate("Here is the answer.", Some("yes"), None), Outcome::NoAction);
    }

    #[test]
    fn offer_without_answer_is_pending() {
        assert!(matches!(evaluate(OFFER, None, None), Outcome::Pending(_)));
    }

    #[test]
    fn answers() {
        assert_eq!(
            evaluate(OFFER, Some("yes please"), None),
            Outcome::Search("rust async runtimes".to_string())
        );
        assert_eq!(evaluate(OFFER, Some("no thanks"), None), Outcome::Declined);
        assert_eq!(evaluate(OFFER, Some("what about tokio?"), None), Outcome::Forward);
    }
}
