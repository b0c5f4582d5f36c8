//! Data-access layer.
//!
//! [`SqlDao`] is the only place that builds SQL. Every operation borrows the
//! connection bound to the current request, so the caller decides how long a
//! connection lives and nothing is read from ambient state.
//!
//! The `*_if_absent` inserts are a lookup followed by an insert. Two callers
//! racing on the same title can both miss the lookup and both insert.
use sqlx::AnyConnection;

use crate::error::DaoError;
use crate::models::{Poll, PollOption};

const POLLS_SELECT_ALL: &str = "SELECT id, title, message FROM polls ORDER BY id";
const POLLS_SELECT_BY_ID: &str = "SELECT id, title, message FROM polls WHERE id = $1";
const POLLS_SELECT_BY_TITLE: &str = "SELECT id, title, message FROM polls WHERE title = $1";
const POLLS_INSERT: &str = "INSERT INTO polls (title, message) VALUES ($1, $2) RETURNING id";

const OPTIONS_COLUMNS: &str = "id, option_title, option_link, poll_id, votes_count";
const OPTIONS_INSERT: &str = "INSERT INTO poll_options (option_title, option_link, poll_id, votes_count)
     VALUES ($1, $2, $3, $4) RETURNING id";
const OPTIONS_ADD_VOTES: &str = "UPDATE poll_options SET votes_count = votes_count + $1 WHERE id = $2";

type DaoResult<T> = Result<T, DaoError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlDao;

impl SqlDao {
    pub fn new() -> Self {
        Self
    }

    /// All polls, ordered by id.
    pub async fn list_polls(&self, conn: &mut AnyConnection) -> DaoResult<Vec<Poll>> {
        sqlx::query_as::<_, Poll>(POLLS_SELECT_ALL)
            .fetch_all(&mut *conn)
            .await
            .map_err(DaoError::storage("Exception occurred while listing polls."))
    }

    /// `None` when no poll has this id; negative ids never match.
    pub async fn get_poll(&self, conn: &mut AnyConnection, id: i64) -> DaoResult<Option<Poll>> {
        if id < 0 {
            return Ok(None);
        }

        sqlx::query_as::<_, Poll>(POLLS_SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(DaoError::storage(format!(
                "Exception occurred while getting a poll with id={id}."
            )))
    }

    pub async fn get_poll_by_title(
        &self,
        conn: &mut AnyConnection,
        title: &str,
    ) -> DaoResult<Option<Poll>> {
        sqlx::query_as::<_, Poll>(POLLS_SELECT_BY_TITLE)
            .bind(title)
            .fetch_optional(&mut *conn)
            .await
            .map_err(DaoError::storage(format!(
                "Exception occurred while getting a poll with title={title}."
            )))
    }

    /// Inserts a poll and returns the id the database assigned to it.
    pub async fn add_poll(&self, conn: &mut AnyConnection, title: &str, message: &str) -> DaoResult<i64> {
        sqlx::query_scalar::<_, i64>(POLLS_INSERT)
            .bind(title)
            .bind(message)
            .fetch_one(&mut *conn)
            .await
            .map_err(DaoError::storage("Exception occurred while inserting a new poll."))
    }

    /// Returns the id of the poll titled `title`, inserting it first if needed.
    pub async fn add_poll_if_absent(
        &self,
        conn: &mut AnyConnection,
        title: &str,
        message: &str,
    ) -> DaoResult<i64> {
        match self.get_poll_by_title(conn, title).await? {
            Some(poll) => Ok(poll.id),
            None => self.add_poll(conn, title, message).await,
        }
    }

    /// All options of all polls, ordered by id.
    pub async fn list_poll_options(&self, conn: &mut AnyConnection) -> DaoResult<Vec<PollOption>> {
        sqlx::query_as::<_, PollOption>(&format!(
            "SELECT {OPTIONS_COLUMNS} FROM poll_options ORDER BY id"
        ))
        .fetch_all(&mut *conn)
        .await
        .map_err(DaoError::storage("Exception occurred while listing poll options."))
    }

    pub async fn get_poll_option(
        &self,
        conn: &mut AnyConnection,
        id: i64,
    ) -> DaoResult<Option<PollOption>> {
        if id < 0 {
            return Ok(None);
        }

        sqlx::query_as::<_, PollOption>(&format!(
            "SELECT {OPTIONS_COLUMNS} FROM poll_options WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DaoError::storage(format!(
            "Exception occurred while getting a poll option with id={id}."
        )))
    }

    pub async fn get_poll_option_by_title(
        &self,
        conn: &mut AnyConnection,
        option_title: &str,
    ) -> DaoResult<Option<PollOption>> {
        sqlx::query_as::<_, PollOption>(&format!(
            "SELECT {OPTIONS_COLUMNS} FROM poll_options WHERE option_title = $1"
        ))
        .bind(option_title)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DaoError::storage(format!(
            "Exception occurred while getting a poll option with title={option_title}."
        )))
    }

    /// Options belonging to `poll_id`, ordered by id.
    ///
    /// A negative `poll_id` yields `None`. A valid id without options yields
    /// `Some` of an empty vector, so the two cases stay distinguishable.
    pub async fn get_poll_options_by_poll(
        &self,
        conn: &mut AnyConnection,
        poll_id: i64,
    ) -> DaoResult<Option<Vec<PollOption>>> {
        if poll_id < 0 {
            return Ok(None);
        }

        sqlx::query_as::<_, PollOption>(&format!(
            "SELECT {OPTIONS_COLUMNS} FROM poll_options WHERE poll_id = $1 ORDER BY id"
        ))
        .bind(poll_id)
        .fetch_all(&mut *conn)
        .await
        .map(Some)
        .map_err(DaoError::storage(format!(
            "Exception occurred while getting poll options with pollID={poll_id}."
        )))
    }

    pub async fn add_poll_option(
        &self,
        conn: &mut AnyConnection,
        option_title: &str,
        option_link: &str,
        poll_id: i64,
        votes_count: i64,
    ) -> DaoResult<i64> {
        check_option_args(poll_id, votes_count)?;

        sqlx::query_scalar::<_, i64>(OPTIONS_INSERT)
            .bind(option_title)
            .bind(option_link)
            .bind(poll_id)
            .bind(votes_count)
            .fetch_one(&mut *conn)
            .await
            .map_err(DaoError::storage("Exception occurred while inserting a new poll option."))
    }

    /// Same lookup-then-insert as [`SqlDao::add_poll_if_absent`], keyed by option title.
    pub async fn add_poll_option_if_absent(
        &self,
        conn: &mut AnyConnection,
        option_title: &str,
        option_link: &str,
        poll_id: i64,
        votes_count: i64,
    ) -> DaoResult<i64> {
        check_option_args(poll_id, votes_count)?;

        match self.get_poll_option_by_title(conn, option_title).await? {
            Some(option) => Ok(option.id),
            None => {
                self.add_poll_option(conn, option_title, option_link, poll_id, votes_count)
                    .await
            }
        }
    }

    /// Adds `amount` votes to option `id` and returns the number of rows touched.
    ///
    /// Zero means no option has that id.
    pub async fn increment_votes(&self, conn: &mut AnyConnection, id: i64, amount: i64) -> DaoResult<u64> {
        if amount < 0 {
            return Err(DaoError::InvalidArgument("votes amount must not be negative"));
        }

        sqlx::query(OPTIONS_ADD_VOTES)
            .bind(amount)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map(|done| done.rows_affected())
            .map_err(DaoError::storage(format!(
                "Exception occurred while updating votes of poll option id={id}."
            )))
    }

    /// Records a single vote.
    pub async fn add_vote(&self, conn: &mut AnyConnection, id: i64) -> DaoResult<u64> {
        self.increment_votes(conn, id, 1).await
    }
}

fn check_option_args(poll_id: i64, votes_count: i64) -> DaoResult<()> {
    if poll_id < 0 {
        return Err(DaoError::InvalidArgument("poll id must not be negative"));
    }
    if votes_count < 0 {
        return Err(DaoError::InvalidArgument("votes count must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::memory_connection;

    const DAO: SqlDao = SqlDao;

    #[tokio::test]
    async fn added_poll_reads_back_by_id_and_title() {
        let mut conn = memory_connection().await;

        let id = DAO
            .add_poll(&mut conn, "Favorite color", "Pick one")
            .await
            .unwrap();

        let expected = Poll {
            id,
            title: "Favorite color".to_owned(),
            message: "Pick one".to_owned(),
        };
        assert_eq!(DAO.get_poll(&mut conn, id).await.unwrap(), Some(expected.clone()));
        assert_eq!(
            DAO.get_poll_by_title(&mut conn, "Favorite color").await.unwrap(),
            Some(expected)
        );
    }

    #[tokio::test]
    async fn missing_and_negative_poll_ids_are_absent() {
        let mut conn = memory_connection().await;

        assert_eq!(DAO.get_poll(&mut conn, 42).await.unwrap(), None);
        assert_eq!(DAO.get_poll(&mut conn, -1).await.unwrap(), None);
        assert_eq!(DAO.get_poll_by_title(&mut conn, "nope").await.unwrap(), None);
        assert_eq!(DAO.get_poll_option(&mut conn, -3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn polls_are_listed_by_id() {
        let mut conn = memory_connection().await;
        assert!(DAO.list_polls(&mut conn).await.unwrap().is_empty());

        let first = DAO.add_poll(&mut conn, "B", "second title, first id").await.unwrap();
        let second = DAO.add_poll(&mut conn, "A", "first title, second id").await.unwrap();

        let ids: Vec<i64> = DAO
            .list_polls(&mut conn)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn add_poll_if_absent_reuses_existing_id() {
        let mut conn = memory_connection().await;

        let first = DAO.add_poll_if_absent(&mut conn, "Bands", "Vote!").await.unwrap();
        let again = DAO
            .add_poll_if_absent(&mut conn, "Bands", "Different message")
            .await
            .unwrap();

        assert_eq!(first, again);
        assert_eq!(DAO.list_polls(&mut conn).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn options_by_poll_distinguishes_negative_from_empty() {
        let mut conn = memory_connection().await;
        let poll = DAO.add_poll(&mut conn, "Empty", "").await.unwrap();

        assert_eq!(DAO.get_poll_options_by_poll(&mut conn, -1).await.unwrap(), None);
        assert_eq!(
            DAO.get_poll_options_by_poll(&mut conn, poll).await.unwrap(),
            Some(Vec::new())
        );
        assert_eq!(
            DAO.get_poll_options_by_poll(&mut conn, poll + 100).await.unwrap(),
            Some(Vec::new())
        );
    }

    #[tokio::test]
    async fn options_are_grouped_by_poll() {
        let mut conn = memory_connection().await;
        let colors = DAO.add_poll(&mut conn, "Colors", "").await.unwrap();
        let pets = DAO.add_poll(&mut conn, "Pets", "").await.unwrap();

        let red = DAO.add_poll_option(&mut conn, "Red", "http://red", colors, 0).await.unwrap();
        DAO.add_poll_option(&mut conn, "Cat", "http://cat", pets, 4).await.unwrap();
        let blue = DAO.add_poll_option(&mut conn, "Blue", "http://blue", colors, 2).await.unwrap();

        let options = DAO
            .get_poll_options_by_poll(&mut conn, colors)
            .await
            .unwrap()
            .unwrap();
        let ids: Vec<i64> = options.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![red, blue]);
        assert_eq!(options[1].votes_count, 2);
        assert_eq!(options[1].option_link, "http://blue");

        assert_eq!(DAO.list_poll_options(&mut conn).await.unwrap().len(), 3);
        let cat = DAO.get_poll_option_by_title(&mut conn, "Cat").await.unwrap().unwrap();
        assert_eq!(cat.poll_id, pets);
        assert_eq!(DAO.get_poll_option(&mut conn, cat.id).await.unwrap(), Some(cat));
    }

    #[tokio::test]
    async fn add_poll_option_rejects_negative_arguments() {
        let mut conn = memory_connection().await;
        let poll = DAO.add_poll(&mut conn, "P", "").await.unwrap();

        let err = DAO.add_poll_option(&mut conn, "x", "y", -1, 0).await.unwrap_err();
        assert!(matches!(err, DaoError::InvalidArgument(_)));

        let err = DAO
            .add_poll_option_if_absent(&mut conn, "x", "y", poll, -5)
            .await
            .unwrap_err();
        assert!(matches!(err, DaoError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn option_for_unknown_poll_is_a_storage_error() {
        let mut conn = memory_connection().await;

        let err = DAO.add_poll_option(&mut conn, "Orphan", "x", 999, 0).await.unwrap_err();
        assert!(matches!(err, DaoError::Storage { .. }));
    }

    #[tokio::test]
    async fn add_poll_option_if_absent_reuses_existing_id() {
        let mut conn = memory_connection().await;
        let poll = DAO.add_poll(&mut conn, "P", "").await.unwrap();

        let first = DAO
            .add_poll_option_if_absent(&mut conn, "Opt", "link", poll, 0)
            .await
            .unwrap();
        let again = DAO
            .add_poll_option_if_absent(&mut conn, "Opt", "other link", poll, 3)
            .await
            .unwrap();

        assert_eq!(first, again);
        let stored = DAO.get_poll_option(&mut conn, first).await.unwrap().unwrap();
        assert_eq!(stored.option_link, "link");
        assert_eq!(stored.votes_count, 0);
    }

    #[tokio::test]
    async fn increment_votes_adds_to_the_tally() {
        let mut conn = memory_connection().await;
        let poll = DAO.add_poll(&mut conn, "P", "").await.unwrap();
        let option = DAO.add_poll_option(&mut conn, "Opt", "link", poll, 7).await.unwrap();

        for amount in [0, 1, 5] {
            let before = DAO.get_poll_option(&mut conn, option).await.unwrap().unwrap().votes_count;
            assert_eq!(DAO.increment_votes(&mut conn, option, amount).await.unwrap(), 1);
            let after = DAO.get_poll_option(&mut conn, option).await.unwrap().unwrap().votes_count;
            assert_eq!(after, before + amount);
        }

        assert_eq!(DAO.add_vote(&mut conn, option).await.unwrap(), 1);
        let stored = DAO.get_poll_option(&mut conn, option).await.unwrap().unwrap();
        assert_eq!(stored.votes_count, 14);
    }

    #[tokio::test]
    async fn increment_votes_reports_unknown_ids_and_rejects_negative_amounts() {
        let mut conn = memory_connection().await;

        assert_eq!(DAO.increment_votes(&mut conn, 12345, 1).await.unwrap(), 0);

        let err = DAO.increment_votes(&mut conn, 1, -1).await.unwrap_err();
        assert!(matches!(err, DaoError::InvalidArgument(_)));
    }
}
