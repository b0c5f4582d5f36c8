// src/poll.rs
use crate::models::PollOption;

/// Sorts options so the most voted come first. Ties keep their id order.
pub fn sort_by_votes(options: &mut [PollOption]) {
    options.sort_by(|a, b| b.votes_count.cmp(&a.votes_count));
}

/// Every option sharing the highest vote count. Empty input has no winners.
pub fn winners(options: &[PollOption]) -> Vec<&PollOption> {
    let Some(max) = options.iter().map(|o| o.votes_count).max() else {
        return Vec::new();
    };

    options.iter().filter(|o| o.votes_count == max).collect()
}

#[cfg(test)]
pub(crate) fn option(id: i64, title: &str, votes: i64) -> PollOption {
    PollOption {
        id,
        option_title: title.to_owned(),
        option_link: format!("https://example.com/{id}"),
        poll_id: 1,
        votes_count: votes,
    }
}
