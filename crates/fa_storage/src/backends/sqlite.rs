use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use fa_core::{Error, NewArticle, NewsStore, Result, SavedArticle, Timestamp, TokenizedText};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use tracing::debug;

use crate::StorageBackend;

const DEFAULT_DB_PATH: &str = "fa_news.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS tickers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        symbol TEXT NOT NULL UNIQUE,
        company_name TEXT NOT NULL,
        market TEXT NOT NULL DEFAULT 'B3'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS news (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker_id INTEGER NOT NULL REFERENCES tickers(id),
        url TEXT NOT NULL UNIQUE,
        published_at TEXT,
        author TEXT,
        source_type TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS text_sections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        news_id INTEGER NOT NULL REFERENCES news(id),
        position INTEGER NOT NULL,
        kind TEXT NOT NULL,
        raw_text TEXT NOT NULL,
        tokens TEXT NOT NULL,
        stems TEXT NOT NULL,
        lemmas TEXT NOT NULL,
        UNIQUE (news_id, kind)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_news_ticker_published ON news (ticker_id, published_at)",
];

/// UTC with a `Z` suffix so stored timestamps compare correctly as text.
fn to_db_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Database(format!("{}: {}", context, e))
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be writable at ./fa_news.db or the path given with --db"
    }
}

impl SQLiteStorage {
    pub async fn new() -> Result<Self> {
        Self::new_with_path(Path::new(DEFAULT_DB_PATH)).await
    }

    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }
        debug!(path = %db_path.display(), "SQLite storage ready");

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl NewsStore for SQLiteStorage {
    async fn upsert_ticker(&self, symbol: &str, company_name: &str) -> Result<i64> {
        sqlx::query("INSERT INTO tickers (symbol, company_name) VALUES (?, ?) ON CONFLICT(symbol) DO NOTHING")
            .bind(symbol)
            .bind(company_name)
            .execute(&*self.pool)
            .await
            .map_err(db_error("Failed to save ticker"))?;

        let row = sqlx::query("SELECT id FROM tickers WHERE symbol = ?")
            .bind(symbol)
            .fetch_one(&*self.pool)
            .await
            .map_err(db_error("Failed to read ticker"))?;
        Ok(row.get("id"))
    }

    async fn company_name(&self, symbol: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT company_name FROM tickers WHERE symbol = ?")
            .bind(symbol)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to read ticker"))?;
        Ok(row.map(|row| row.get("company_name")))
    }

    async fn save_article(&self, article: &NewArticle) -> Result<SavedArticle> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to open transaction"))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO news (ticker_id, url, published_at, author, source_type)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(article.ticker_id)
        .bind(&article.url)
        .bind(article.published_at.map(to_db_timestamp))
        .bind(article.author.as_deref())
        .bind(article.source_type.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to store article"))?;

        if inserted.rows_affected() == 0 {
            let row = sqlx::query("SELECT id FROM news WHERE url = ?")
                .bind(&article.url)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("Failed to read article"))?;
            tx.commit().await.map_err(db_error("Failed to commit"))?;
            return Ok(SavedArticle {
                article_id: row.get("id"),
                is_new: false,
            });
        }

        let article_id = inserted.last_insert_rowid();
        let sections: [(&str, &str, &TokenizedText); 3] = [
            ("TITLE", &article.sections.title, &article.tokens.title),
            ("SUBHEADLINE", &article.sections.subheadline, &article.tokens.subheadline),
            ("BODY", &article.sections.body, &article.tokens.body),
        ];
        for (position, (kind, raw_text, tokens)) in sections.into_iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO text_sections (news_id, position, kind, raw_text, tokens, stems, lemmas)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(article_id)
            .bind(position as i64)
            .bind(kind)
            .bind(raw_text)
            .bind(tokens.tokens.join(" "))
            .bind(tokens.stems.join(" "))
            .bind(tokens.lemmas.join(" "))
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to store text section"))?;
        }

        tx.commit().await.map_err(db_error("Failed to commit"))?;
        Ok(SavedArticle { article_id, is_new: true })
    }

    async fn recent_texts(&self, symbol: &str, since: Timestamp) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT s.raw_text
            FROM text_sections s
            JOIN news n ON s.news_id = n.id
            JOIN tickers t ON n.ticker_id = t.id
            WHERE t.symbol = ?
              AND (n.published_at IS NULL OR n.published_at >= ?)
              AND TRIM(s.raw_text) != ''
            ORDER BY n.published_at IS NULL, n.published_at DESC, n.id, s.position
            "#,
        )
        .bind(symbol)
        .bind(to_db_timestamp(since))
        .fetch_all(&*self.pool)
        .await
        .map_err(db_error("Failed to read recent texts"))?;

        Ok(rows.into_iter().map(|row| row.get("raw_text")).collect())
    }
}
