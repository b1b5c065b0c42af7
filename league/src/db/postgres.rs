//! PostgreSQL implementation of the league repository.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::sync::Arc;

use super::errors::RepositoryResult;
use super::repository::{LeagueRepository, RegistrationUnit};
use crate::pagination::{Page, PageRequest};
use crate::team::{NewTeam, Team, TeamId};
use crate::tournament::{NewTournament, Tournament, TournamentId, TournamentPatch, TournamentSummary};

const TOURNAMENT_COLUMNS: &str = "t.id, t.name, t.address, t.team_limit, t.register_deadline, \
     t.event_date, t.is_finished, t.is_cancelled, t.winner_team_id, t.runner_up_team_id, \
     t.created_at";

/// Repository backed by a `PgPool`
#[derive(Clone)]
pub struct PgLeagueRepository {
    pool: Arc<PgPool>,
}

impl PgLeagueRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Unit of work over one PostgreSQL transaction
pub struct PgRegistrationUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LeagueRepository for PgLeagueRepository {
    type Unit = PgRegistrationUnit;

    async fn begin(&self) -> RepositoryResult<Self::Unit> {
        let tx = self.pool.begin().await?;
        Ok(PgRegistrationUnit { tx })
    }

    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }

    async fn insert_tournament(&self, new: &NewTournament) -> RepositoryResult<Tournament> {
        let row = sqlx::query(
            r#"
            INSERT INTO tournaments AS t (name, address, team_limit, register_deadline, event_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING t.id, t.name, t.address, t.team_limit, t.register_deadline, t.event_date,
                      t.is_finished, t.is_cancelled, t.winner_team_id, t.runner_up_team_id,
                      t.created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.address)
        .bind(new.team_limit)
        .bind(new.register_deadline)
        .bind(new.event_date)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(tournament_from_row(&row, Vec::new())?)
    }

    async fn find_tournament(&self, id: TournamentId) -> RepositoryResult<Option<Tournament>> {
        let mut conn = self.pool.acquire().await?;
        fetch_tournament(&mut conn, id).await
    }

    async fn list_tournaments(
        &self,
        page: PageRequest,
    ) -> RepositoryResult<Page<TournamentSummary>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM tournaments")
            .fetch_one(self.pool.as_ref())
            .await?
            .try_get("total")?;

        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.team_limit, t.register_deadline, t.event_date,
                   t.is_finished, t.is_cancelled, COUNT(tt.team_id) AS registered_count
            FROM tournaments t
            LEFT JOIN tournament_teams tt ON tt.tournament_id = t.id
            GROUP BY t.id
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool.as_ref())
        .await?;

        let items = rows
            .iter()
            .map(|row| -> Result<TournamentSummary, sqlx::Error> {
                let registered_count: i64 = row.try_get("registered_count")?;
                Ok(TournamentSummary {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    team_limit: row.try_get("team_limit")?,
                    registered_count: usize::try_from(registered_count).unwrap_or(0),
                    register_deadline: row.try_get("register_deadline")?,
                    event_date: row.try_get("event_date")?,
                    is_finished: row.try_get("is_finished")?,
                    is_cancelled: row.try_get("is_cancelled")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, page, total))
    }

    async fn find_open_tournaments(&self) -> RepositoryResult<Vec<Tournament>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TOURNAMENT_COLUMNS},
                   COALESCE(
                       ARRAY_AGG(tt.team_id ORDER BY tt.registered_at, tt.team_id)
                           FILTER (WHERE tt.team_id IS NOT NULL),
                       '{{}}'::BIGINT[]
                   ) AS team_ids
            FROM tournaments t
            LEFT JOIN tournament_teams tt ON tt.tournament_id = t.id
            WHERE t.is_finished = FALSE AND t.is_cancelled = FALSE
            GROUP BY t.id
            ORDER BY t.id
            "#
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut tournaments = Vec::with_capacity(rows.len());
        for row in rows {
            let team_ids: Vec<TeamId> = row.try_get("team_ids")?;
            tournaments.push(tournament_from_row(&row, team_ids)?);
        }
        Ok(tournaments)
    }

    async fn tournament_teams(&self, id: TournamentId) -> RepositoryResult<Vec<Team>> {
        let rows = sqlx::query(
            r#"
            SELECT tm.id, tm.name, tm.description, tm.created_at
            FROM tournament_teams tt
            JOIN teams tm ON tm.id = tt.team_id
            WHERE tt.tournament_id = $1
            ORDER BY tt.registered_at, tt.team_id
            "#,
        )
        .bind(id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .iter()
            .map(team_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn insert_team(&self, new: &NewTeam) -> RepositoryResult<Team> {
        let row = sqlx::query(
            "INSERT INTO teams (name, description) VALUES ($1, $2)
             RETURNING id, name, description, created_at",
        )
        .bind(&new.name)
        .bind(&new.description)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(team_from_row(&row)?)
    }

    async fn find_team(&self, id: TeamId) -> RepositoryResult<Option<Team>> {
        let mut conn = self.pool.acquire().await?;
        fetch_team(&mut conn, id).await
    }

    async fn list_teams(&self, page: PageRequest) -> RepositoryResult<Page<Team>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM teams")
            .fetch_one(self.pool.as_ref())
            .await?
            .try_get("total")?;

        let rows = sqlx::query(
            "SELECT id, name, description, created_at FROM teams ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool.as_ref())
        .await?;

        let items = rows
            .iter()
            .map(team_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }
}

#[async_trait]
impl RegistrationUnit for PgRegistrationUnit {
    async fn lock_tournament(&mut self, id: TournamentId) -> RepositoryResult<Option<Tournament>> {
        // FOR UPDATE cannot be combined with GROUP BY, so lock the row first
        // and read the join table separately while the lock is held.
        let row = sqlx::query(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments t WHERE t.id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let team_ids = fetch_team_ids(&mut self.tx, id).await?;
        Ok(Some(tournament_from_row(&row, team_ids)?))
    }

    async fn load_tournament(&mut self, id: TournamentId) -> RepositoryResult<Option<Tournament>> {
        fetch_tournament(&mut self.tx, id).await
    }

    async fn find_team(&mut self, id: TeamId) -> RepositoryResult<Option<Team>> {
        fetch_team(&mut self.tx, id).await
    }

    async fn add_team(
        &mut self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> RepositoryResult<()> {
        sqlx::query("INSERT INTO tournament_teams (tournament_id, team_id) VALUES ($1, $2)")
            .bind(tournament_id)
            .bind(team_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn remove_team(
        &mut self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM tournament_teams WHERE tournament_id = $1 AND team_id = $2")
            .bind(tournament_id)
            .bind(team_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn save_finished(
        &mut self,
        tournament_id: TournamentId,
        finished: bool,
    ) -> RepositoryResult<()> {
        sqlx::query("UPDATE tournaments SET is_finished = $1, updated_at = NOW() WHERE id = $2")
            .bind(finished)
            .bind(tournament_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn update_tournament(
        &mut self,
        tournament_id: TournamentId,
        patch: &TournamentPatch,
    ) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            UPDATE tournaments
            SET name = COALESCE($1, name),
                team_limit = COALESCE($2, team_limit),
                register_deadline = COALESCE($3, register_deadline),
                event_date = COALESCE($4, event_date),
                updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(&patch.name)
        .bind(patch.team_limit)
        .bind(patch.register_deadline)
        .bind(patch.event_date)
        .bind(tournament_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn save_result(
        &mut self,
        tournament_id: TournamentId,
        winner: TeamId,
        runner_up: TeamId,
    ) -> RepositoryResult<()> {
        sqlx::query(
            "UPDATE tournaments
             SET winner_team_id = $1, runner_up_team_id = $2, updated_at = NOW()
             WHERE id = $3",
        )
        .bind(winner)
        .bind(runner_up)
        .bind(tournament_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self) -> RepositoryResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

async fn fetch_tournament(
    conn: &mut PgConnection,
    id: TournamentId,
) -> RepositoryResult<Option<Tournament>> {
    let row = sqlx::query(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments t WHERE t.id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let team_ids = fetch_team_ids(conn, id).await?;
            Ok(Some(tournament_from_row(&row, team_ids)?))
        }
        None => Ok(None),
    }
}

async fn fetch_team_ids(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> RepositoryResult<Vec<TeamId>> {
    let rows = sqlx::query(
        "SELECT team_id FROM tournament_teams WHERE tournament_id = $1
         ORDER BY registered_at, team_id",
    )
    .bind(tournament_id)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .iter()
        .map(|row| row.try_get("team_id"))
        .collect::<Result<Vec<_>, _>>()?)
}

async fn fetch_team(conn: &mut PgConnection, id: TeamId) -> RepositoryResult<Option<Team>> {
    let row = sqlx::query("SELECT id, name, description, created_at FROM teams WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(row.as_ref().map(team_from_row).transpose()?)
}

fn tournament_from_row(row: &PgRow, teams: Vec<TeamId>) -> Result<Tournament, sqlx::Error> {
    Ok(Tournament {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        team_limit: row.try_get("team_limit")?,
        register_deadline: row.try_get("register_deadline")?,
        event_date: row.try_get("event_date")?,
        is_finished: row.try_get("is_finished")?,
        is_cancelled: row.try_get("is_cancelled")?,
        winner_team_id: row.try_get("winner_team_id")?,
        runner_up_team_id: row.try_get("runner_up_team_id")?,
        teams,
        created_at: row.try_get("created_at")?,
    })
}

fn team_from_row(row: &PgRow) -> Result<Team, sqlx::Error> {
    Ok(Team {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}
