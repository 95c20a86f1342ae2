use crate::error::ApiError;
use crate::config::DatabaseConfig;
use crate::models::{FlashCard, Subject, User};
use crate::store::{flashcard_not_found, subject_not_found, user_not_found, Store};
use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, Runtime, Object};
use postgres_native_tls::MakeTlsConnector;
use native_tls::TlsConnector;
use tokio_postgres::Row;
use tracing::{error, info, warn};

const USER_COLUMNS: &str = "id, username, password_hash, created_at";
const SUBJECT_COLUMNS: &str = "id, user_id, name, created_at";
const FLASHCARD_COLUMNS: &str = "f.id, f.subject_id, f.card, f.definition, f.created_at";

/// PostgreSQL への接続プールを握るリポジトリ層。
/// Deadpool の `Pool` を内部に保持し、`Store` トレイトの各操作を SQL で実装する。
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// 接続プールを構築し、起動時に疎通確認まで実施する。
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Creating PostgreSQL connection pool for host: {}:{}", config.host, config.port);

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    /// Deadpool 用の `Config` を組み立ててプールを生成する内部関数。
    /// SSL モードは `match` で切り替え、TLS コネクタは `native_tls` で差し込む。
    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);

        match config.ssl_mode.as_str() {
            "disable" => {
                pg_config.ssl_mode = Some(deadpool_postgres::SslMode::Disable);
            }
            "prefer" => {
                pg_config.ssl_mode = Some(deadpool_postgres::SslMode::Prefer);
            }
            "require" => {
                pg_config.ssl_mode = Some(deadpool_postgres::SslMode::Require);
            }
            _ => {
                warn!("Unknown SSL mode '{}', defaulting to 'prefer'", config.ssl_mode);
                pg_config.ssl_mode = Some(deadpool_postgres::SslMode::Prefer);
            }
        }

        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        let mut pool_config = deadpool_postgres::PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pool_config.timeouts.create = Some(config.connection_timeout);
        pool_config.timeouts.recycle = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        let tls_connector = TlsConnector::builder()
            .build()
            .map_err(|e| {
                error!("Failed to create TLS connector: {}", e);
                ApiError::Database(format!("TLS connector creation failed: {}", e))
            })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                ApiError::Database(format!("Connection pool creation failed: {}", e))
            })
    }

    /// プールから接続を借りる小さなラッパー。
    /// `PoolError` は `From` 実装で `ApiError` に変換される。
    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// `SELECT 1` で、プール全体が機能するかを `Database::new` 直後に確認する。
    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database connection test failed: {}", e);
                ApiError::Database(format!("Connection test failed: {}", e))
            })?;

        info!("Database connection test successful");
        Ok(())
    }

    /// アプリ起動時にテーブル群を CREATE する簡易マイグレーター。
    /// 何度実行しても同じ結果になるよう `IF NOT EXISTS` を付けている。
    pub async fn migrate(&self) -> Result<(), ApiError> {
        info!("Running database migrations");

        let client = self.get_connection().await?;

        let statements: [(&str, &str); 5] = [
            (
                "users table",
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id SERIAL PRIMARY KEY,
                    username VARCHAR(150) UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "subjects table",
                r#"
                CREATE TABLE IF NOT EXISTS subjects (
                    id SERIAL PRIMARY KEY,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    name VARCHAR(200) NOT NULL CHECK (btrim(name) <> ''),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "subjects user_id index",
                "CREATE INDEX IF NOT EXISTS idx_subjects_user_id ON subjects(user_id)",
            ),
            (
                "flashcards table",
                r#"
                CREATE TABLE IF NOT EXISTS flashcards (
                    id SERIAL PRIMARY KEY,
                    subject_id INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
                    card VARCHAR(500) NOT NULL CHECK (btrim(card) <> ''),
                    definition VARCHAR(2000) NOT NULL CHECK (btrim(definition) <> ''),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "flashcards subject_id index",
                "CREATE INDEX IF NOT EXISTS idx_flashcards_subject_id ON flashcards(subject_id)",
            ),
        ];

        for (label, sql) in statements {
            client.execute(sql, &[])
                .await
                .map_err(|e| {
                    error!("Failed to create {}: {}", label, e);
                    ApiError::Database(format!("Migration step '{}' failed: {}", label, e))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }
}

// Row mapping

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get(0),
        username: row.get(1),
        password_hash: row.get(2),
        created_at: row.get(3),
    }
}

fn subject_from_row(row: &Row) -> Subject {
    Subject {
        id: row.get(0),
        user_id: row.get(1),
        name: row.get(2),
        created_at: row.get(3),
    }
}

fn flashcard_from_row(row: &Row) -> FlashCard {
    FlashCard {
        id: row.get(0),
        subject_id: row.get(1),
        card: row.get(2),
        definition: row.get(3),
        created_at: row.get(4),
    }
}

#[async_trait]
impl Store for Database {
    /// `SELECT 1` を投げて DB が生きているか確認する。
    async fn health_check(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database health check failed: {}", e);
                ApiError::Database(format!("Health check failed: {}", e))
            })?;

        Ok(())
    }

    /// ユーザー作成。ユーザー名の重複は UNIQUE 制約違反として `Conflict` に変換される。
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, ApiError> {
        let client = self.get_connection().await?;

        let query = format!(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        );

        let row = client.query_one(&query, &[&username, &password_hash])
            .await
            .map_err(ApiError::from)?;

        let user = user_from_row(&row);
        info!("Created user with id: {}", user.id);
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: i32) -> Result<User, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = client.query_opt(&query, &[&user_id])
            .await
            .map_err(ApiError::from)?;

        row.as_ref().map(user_from_row).ok_or_else(|| user_not_found(user_id))
    }

    /// ログイン用の検索。存在しない場合はエラーではなく `Ok(None)` を返す。
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);

        let row = client.query_opt(&query, &[&username])
            .await
            .map_err(ApiError::from)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_subject(&self, user_id: i32, name: &str) -> Result<Subject, ApiError> {
        let client = self.get_connection().await?;
        let query = format!(
            "INSERT INTO subjects (user_id, name) VALUES ($1, $2) RETURNING {}",
            SUBJECT_COLUMNS
        );

        let row = client.query_one(&query, &[&user_id, &name])
            .await
            .map_err(ApiError::from)?;

        let subject = subject_from_row(&row);
        info!("Created subject with id: {}", subject.id);
        Ok(subject)
    }

    async fn list_subjects(&self, user_id: i32) -> Result<Vec<Subject>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM subjects WHERE user_id = $1 ORDER BY id", SUBJECT_COLUMNS);

        let rows = client.query(&query, &[&user_id])
            .await
            .map_err(ApiError::from)?;

        Ok(rows.iter().map(subject_from_row).collect())
    }

    /// `WHERE id = $1 AND user_id = $2` で所有者チェックを SQL 側に寄せている。
    /// 他人の科目は「存在しない」と同じ扱いになる。
    async fn get_subject(&self, user_id: i32, subject_id: i32) -> Result<Subject, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM subjects WHERE id = $1 AND user_id = $2", SUBJECT_COLUMNS);

        let row = client.query_opt(&query, &[&subject_id, &user_id])
            .await
            .map_err(ApiError::from)?;

        row.as_ref().map(subject_from_row).ok_or_else(subject_not_found)
    }

    async fn rename_subject(&self, user_id: i32, subject_id: i32, name: &str) -> Result<Subject, ApiError> {
        let client = self.get_connection().await?;
        let query = format!(
            "UPDATE subjects SET name = $1 WHERE id = $2 AND user_id = $3 RETURNING {}",
            SUBJECT_COLUMNS
        );

        let row = client.query_opt(&query, &[&name, &subject_id, &user_id])
            .await
            .map_err(ApiError::from)?;

        row.as_ref().map(subject_from_row).ok_or_else(subject_not_found)
    }

    /// 1 リクエスト 1 コミット。カードを先に消してから科目を消し、まとめてコミットする。
    /// 外部キーの `ON DELETE CASCADE` と同じ結果だが、削除件数をログに残すため明示的に消している。
    async fn delete_subject(&self, user_id: i32, subject_id: i32) -> Result<u64, ApiError> {
        let mut client = self.get_connection().await?;
        let transaction = client.transaction().await.map_err(ApiError::from)?;

        let owned = transaction
            .query_opt("SELECT id FROM subjects WHERE id = $1 AND user_id = $2 FOR UPDATE", &[&subject_id, &user_id])
            .await
            .map_err(ApiError::from)?;
        if owned.is_none() {
            return Err(subject_not_found());
        }

        let removed = transaction
            .execute("DELETE FROM flashcards WHERE subject_id = $1", &[&subject_id])
            .await
            .map_err(ApiError::from)?;

        transaction
            .execute("DELETE FROM subjects WHERE id = $1", &[&subject_id])
            .await
            .map_err(ApiError::from)?;

        transaction.commit().await.map_err(ApiError::from)?;

        info!("Deleted subject with id: {} (cascade deleted {} flashcards)", subject_id, removed);
        Ok(removed)
    }

    /// `INSERT ... SELECT` で、科目が要求ユーザーのものである場合だけ行を作る。
    /// 0 行なら所有者違いか存在しない科目なので `NotFound`。
    async fn create_flashcard(
        &self,
        user_id: i32,
        subject_id: i32,
        card: &str,
        definition: &str,
    ) -> Result<FlashCard, ApiError> {
        let client = self.get_connection().await?;
        let query = r#"
            INSERT INTO flashcards (subject_id, card, definition)
            SELECT s.id, $3, $4 FROM subjects s WHERE s.id = $1 AND s.user_id = $2
            RETURNING id, subject_id, card, definition, created_at
        "#;

        let row = client.query_opt(query, &[&subject_id, &user_id, &card, &definition])
            .await
            .map_err(ApiError::from)?;

        let flashcard = row.as_ref().map(flashcard_from_row).ok_or_else(subject_not_found)?;
        info!("Created flashcard with id: {}", flashcard.id);
        Ok(flashcard)
    }

    async fn list_flashcards(&self, user_id: i32, subject_id: i32) -> Result<Vec<FlashCard>, ApiError> {
        // Distinguish "no such subject" from "subject without cards"
        self.get_subject(user_id, subject_id).await?;

        let client = self.get_connection().await?;
        let query = format!(
            "SELECT {} FROM flashcards f WHERE f.subject_id = $1 ORDER BY f.id",
            FLASHCARD_COLUMNS
        );

        let rows = client.query(&query, &[&subject_id])
            .await
            .map_err(ApiError::from)?;

        Ok(rows.iter().map(flashcard_from_row).collect())
    }

    async fn get_flashcard(&self, user_id: i32, flashcard_id: i32) -> Result<FlashCard, ApiError> {
        let client = self.get_connection().await?;
        let query = format!(
            "SELECT {} FROM flashcards f JOIN subjects s ON s.id = f.subject_id WHERE f.id = $1 AND s.user_id = $2",
            FLASHCARD_COLUMNS
        );

        let row = client.query_opt(&query, &[&flashcard_id, &user_id])
            .await
            .map_err(ApiError::from)?;

        row.as_ref().map(flashcard_from_row).ok_or_else(flashcard_not_found)
    }

    /// `COALESCE($n, column)` で、`None` の項目は現在値のまま残す。
    async fn update_flashcard(
        &self,
        user_id: i32,
        flashcard_id: i32,
        card: Option<&str>,
        definition: Option<&str>,
    ) -> Result<FlashCard, ApiError> {
        let client = self.get_connection().await?;
        let query = r#"
            UPDATE flashcards f
            SET card = COALESCE($3, f.card),
                definition = COALESCE($4, f.definition)
            FROM subjects s
            WHERE f.id = $1 AND s.id = f.subject_id AND s.user_id = $2
            RETURNING f.id, f.subject_id, f.card, f.definition, f.created_at
        "#;

        let row = client.query_opt(query, &[&flashcard_id, &user_id, &card, &definition])
            .await
            .map_err(ApiError::from)?;

        row.as_ref().map(flashcard_from_row).ok_or_else(flashcard_not_found)
    }

    async fn delete_flashcard(&self, user_id: i32, flashcard_id: i32) -> Result<FlashCard, ApiError> {
        let client = self.get_connection().await?;
        let query = r#"
            DELETE FROM flashcards f
            USING subjects s
            WHERE f.id = $1 AND s.id = f.subject_id AND s.user_id = $2
            RETURNING f.id, f.subject_id, f.card, f.definition, f.created_at
        "#;

        let row = client.query_opt(query, &[&flashcard_id, &user_id])
            .await
            .map_err(ApiError::from)?;

        let flashcard = row.as_ref().map(flashcard_from_row).ok_or_else(flashcard_not_found)?;
        info!("Deleted flashcard with id: {}", flashcard.id);
        Ok(flashcard)
    }
}
