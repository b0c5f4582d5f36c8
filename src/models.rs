// models.rs

/// A question users can vote on. Titles are unique by convention only.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Poll {
    pub id: i64,
    pub title: String,
    pub message: String,
}

/// One selectable answer of a [`Poll`], carrying its running vote tally.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PollOption {
    pub id: i64,
    pub option_title: String,
    pub option_link: String,
    pub poll_id: i64,
    pub votes_count: i64,
}
