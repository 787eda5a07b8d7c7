use anyhow::{bail, Context};
use dotenv::dotenv;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wordflow_server::db::{DbOperations, Phrase};
use wordflow_server::gamification::{CefrLevel, DEFAULT_ACHIEVEMENTS};
use wordflow_server::Settings;

const DEFAULT_PHRASES_PATH: &str = "english.json";

#[derive(Debug, Deserialize)]
struct PhraseEntry {
    english: String,
    georgian: String,
    level: String,
    category: String,
}

/// Phrase files map numeric ids to entries: `{"1": {"english": ..., ...}}`.
fn parse_phrases(raw: &str) -> anyhow::Result<Vec<Phrase>> {
    let entries: BTreeMap<String, PhraseEntry> =
        serde_json::from_str(raw).context("phrase file is not valid JSON")?;

    let mut phrases = Vec::with_capacity(entries.len());
    for (id, entry) in entries {
        let id: i32 = id
            .parse()
            .with_context(|| format!("phrase id {:?} is not a number", id))?;
        let level: CefrLevel = entry
            .level
            .parse()
            .with_context(|| format!("phrase {} has an unknown level", id))?;
        if entry.english.trim().is_empty() || entry.georgian.trim().is_empty() {
            bail!("phrase {} is missing text", id);
        }

        phrases.push(Phrase {
            id,
            english: entry.english.trim().to_string(),
            georgian: entry.georgian.trim().to_string(),
            level: level.as_str().to_string(),
            category: entry.category.trim().to_string(),
        });
    }
    phrases.sort_by_key(|p| p.id);
    Ok(phrases)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PHRASES_PATH.to_string());
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let phrases = parse_phrases(&raw)?;

    let config = Settings::new().context("loading configuration")?;
    let db = DbOperations::new_with_options(
        &config.database.url,
        config.database.max_connections,
        Duration::from_secs(5),
    )
    .await
    .context("connecting to database")?;
    sqlx::migrate!("./migrations")
        .run(db.pool())
        .await
        .context("running migrations")?;

    info!("Inserting {} phrases from {}", phrases.len(), path);
    let mut inserted = 0;
    for phrase in &phrases {
        if db.insert_phrase_if_missing(phrase).await? {
            inserted += 1;
        }
    }
    db.sync_phrase_id_sequence().await?;
    if inserted < phrases.len() {
        warn!("{} phrases already existed", phrases.len() - inserted);
    }
    info!("Inserted {} new phrases", inserted);

    for def in DEFAULT_ACHIEVEMENTS.iter() {
        db.upsert_achievement(def).await?;
    }
    info!("Installed {} achievements", DEFAULT_ACHIEVEMENTS.len());

    Ok(())
}
