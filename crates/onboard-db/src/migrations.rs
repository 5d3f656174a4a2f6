use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, onboarding_config)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                email           TEXT NOT NULL COLLATE NOCASE UNIQUE,
                password        TEXT NOT NULL,
                about_me        TEXT NOT NULL DEFAULT '',
                street_address  TEXT NOT NULL DEFAULT '',
                city            TEXT NOT NULL DEFAULT '',
                state           TEXT NOT NULL DEFAULT '',
                zip             TEXT NOT NULL DEFAULT '',
                birthdate       TEXT NOT NULL DEFAULT '',
                current_step    INTEGER NOT NULL DEFAULT 1
                                CHECK (current_step BETWEEN 1 AND 4),
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_users_created ON users(created_at DESC);

            -- Append-only: the row with the highest id is the active one
            CREATE TABLE onboarding_config (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                page_2_components   TEXT NOT NULL,
                page_3_components   TEXT NOT NULL,
                created_at          TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
