//! SQLite custom-script store

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use trivia_core::{CustomScript, CustomScriptStore, Snowflake, StoreResult, UpsertOutcome};

use crate::map_query_error;

/// Persists guild-supplied command scripts in the `CustomScripts` table
#[derive(Debug, Clone)]
pub struct SqliteScriptStore {
    pool: SqlitePool,
}

impl SqliteScriptStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, guild_id: Snowflake, command_name: &str) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM CustomScripts WHERE GuildID = ? AND CommandName = ?)",
        )
        .bind(guild_id.to_string())
        .bind(command_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_query_error)?;

        let exists: i64 = row.try_get(0).map_err(map_query_error)?;
        Ok(exists == 1)
    }
}

#[async_trait]
impl CustomScriptStore for SqliteScriptStore {
    async fn load_all(&self) -> StoreResult<Vec<CustomScript>> {
        let rows = sqlx::query("SELECT GuildID, CommandName, Script FROM CustomScripts")
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)?;

        let mut scripts = Vec::with_capacity(rows.len());
        for row in rows {
            let guild_id: String = row.try_get("GuildID").map_err(map_query_error)?;
            let Ok(guild_id) = guild_id.parse::<Snowflake>() else {
                tracing::warn!(guild_id = %guild_id, "Skipping script row with malformed guild ID");
                continue;
            };
            scripts.push(CustomScript {
                guild_id,
                command_name: row.try_get("CommandName").map_err(map_query_error)?,
                script: row.try_get("Script").map_err(map_query_error)?,
            });
        }
        Ok(scripts)
    }

    async fn get(
        &self,
        guild_id: Snowflake,
        command_name: &str,
    ) -> StoreResult<Option<CustomScript>> {
        let row = sqlx::query(
            "SELECT Script FROM CustomScripts WHERE GuildID = ? AND CommandName = ?",
        )
        .bind(guild_id.to_string())
        .bind(command_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_query_error)?;

        Ok(match row {
            Some(row) => Some(CustomScript {
                guild_id,
                command_name: command_name.to_string(),
                script: row.try_get("Script").map_err(map_query_error)?,
            }),
            None => None,
        })
    }

    async fn upsert(&self, script: &CustomScript) -> StoreResult<UpsertOutcome> {
        if self.exists(script.guild_id, &script.command_name).await? {
            sqlx::query(
                "UPDATE CustomScripts SET Script = ? WHERE GuildID = ? AND CommandName = ?",
            )
            .bind(&script.script)
            .bind(script.guild_id.to_string())
            .bind(&script.command_name)
            .execute(&self.pool)
            .await
            .map_err(map_query_error)?;
            Ok(UpsertOutcome::Updated)
        } else {
            sqlx::query(
                "INSERT INTO CustomScripts (GuildID, CommandName, Script) VALUES (?, ?, ?)",
            )
            .bind(script.guild_id.to_string())
            .bind(&script.command_name)
            .bind(&script.script)
            .execute(&self.pool)
            .await
            .map_err(map_query_error)?;
            Ok(UpsertOutcome::Inserted)
        }
    }
}
