//! [`SqliteStore`] — the SQLite implementation of [`PrincipalStore`].

use std::path::Path;

use meetbot_core::{
  principal::{NewPrincipal, Principal, Profile},
  store::PrincipalStore,
  token::TokenGrant,
};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{Error, Result, schema::SCHEMA};

// ─── Queries ─────────────────────────────────────────────────────────────────

const SELECT_BY_SUBJECT: &str = "
SELECT id, subject, email, access_token, refresh_token, expires_at
  FROM principals
 WHERE subject = ?1";

const SELECT_BY_EMAIL: &str = "
SELECT id, subject, email, access_token, refresh_token, expires_at
  FROM principals
 WHERE email = ?1";

const INSERT: &str = "
INSERT INTO principals (subject, email, access_token, refresh_token, expires_at)
VALUES (?1, ?2, ?3, ?4, ?5)";

/// Writes back every mutable column. Which of them actually changed is
/// decided by the merge methods on [`Principal`].
const UPDATE: &str = "
UPDATE principals
   SET email = ?2, access_token = ?3, refresh_token = ?4, expires_at = ?5
 WHERE id = ?1";

fn principal_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Principal> {
  Ok(Principal {
    id:            row.get(0)?,
    subject:       row.get(1)?,
    email:         row.get(2)?,
    access_token:  row.get(3)?,
    refresh_token: row.get(4)?,
    expires_at:    row.get(5)?,
  })
}

fn write_back(conn: &rusqlite::Connection, p: &Principal) -> rusqlite::Result<()> {
  conn.execute(
    UPDATE,
    rusqlite::params![p.id, p.email, p.access_token, p.refresh_token, p.expires_at],
  )?;
  Ok(())
}

fn is_constraint_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _))
      if failure.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A principal store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_one(&self, query: &'static str, key: String) -> Result<Option<Principal>> {
    let found = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(query, rusqlite::params![key], principal_from_row).optional()?)
      })
      .await?;
    Ok(found)
  }
}

// ─── PrincipalStore impl ─────────────────────────────────────────────────────

impl PrincipalStore for SqliteStore {
  type Error = Error;

  async fn find_by_subject(&self, subject: &str) -> Result<Option<Principal>> {
    self.find_one(SELECT_BY_SUBJECT, subject.to_owned()).await
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<Principal>> {
    self.find_one(SELECT_BY_EMAIL, email.to_owned()).await
  }

  async fn upsert(&self, profile: Profile, grant: TokenGrant) -> Result<Principal> {
    let email = profile.email.clone();

    let principal = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing = tx
          .query_row(SELECT_BY_SUBJECT, rusqlite::params![profile.subject], principal_from_row)
          .optional()?;

        let principal = match existing {
          Some(mut principal) => {
            principal.apply_login(&profile, &grant);
            write_back(&tx, &principal)?;
            principal
          }
          None => {
            let new = NewPrincipal::from_login(profile, grant);
            tx.execute(
              INSERT,
              rusqlite::params![
                new.subject,
                new.email,
                new.access_token,
                new.refresh_token,
                new.expires_at,
              ],
            )?;
            let id = tx.last_insert_rowid();
            new.with_id(id)
          }
        };

        tx.commit()?;
        Ok(principal)
      })
      .await
      .map_err(|e| {
        if is_constraint_violation(&e) {
          Error::EmailConflict(email)
        } else {
          Error::Database(e)
        }
      })?;

    debug!(id = principal.id, subject = %principal.subject, "principal upserted");
    Ok(principal)
  }

  async fn update_token(&self, subject: &str, grant: TokenGrant) -> Result<Option<Principal>> {
    let subject = subject.to_owned();

    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(mut principal) = tx
          .query_row(SELECT_BY_SUBJECT, rusqlite::params![subject], principal_from_row)
          .optional()?
        else {
          return Ok(None);
        };

        principal.apply_refresh(&grant);
        write_back(&tx, &principal)?;
        tx.commit()?;
        Ok(Some(principal))
      })
      .await?;

    if let Some(principal) = &updated {
      debug!(id = principal.id, subject = %principal.subject, "access token updated");
    }
    Ok(updated)
  }
}
