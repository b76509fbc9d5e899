//! CSV import and export of categories and questions.
//!
//! This is how categories get seeded: the API never creates them.

use std::path::Path;

use anyhow::{bail, Context};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries::categories::{get_all_categories, upsert_category};
use crate::db::queries::questions::{get_all_questions, upsert_question, DIFFICULTIES};
use crate::db::{Category, Question};

pub const CATEGORIES_FILE: &str = "categories.csv";
pub const QUESTIONS_FILE: &str = "questions.csv";

fn write_to(path: &Path, data: &[impl Serialize]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record.with_context(|| format!("Malformed row in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

fn ensure_unique_ids(kind: &str, ids: impl Iterator<Item = i64>) -> anyhow::Result<()> {
    let duplicates: Vec<i64> = ids.duplicates().collect();
    if !duplicates.is_empty() {
        bail!("Duplicate {kind} ids in import: {duplicates:?}");
    }
    Ok(())
}

fn ensure_valid_difficulties(questions: &[Question]) -> anyhow::Result<()> {
    let invalid: Vec<i64> = questions
        .iter()
        .filter(|q| !DIFFICULTIES.contains(&q.difficulty))
        .map(|q| q.id)
        .collect();
    if !invalid.is_empty() {
        bail!("Questions with difficulty outside {DIFFICULTIES:?}: {invalid:?}");
    }
    Ok(())
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?
    }
    write_to(&dir.join(CATEGORIES_FILE), &categories)?;
    write_to(&dir.join(QUESTIONS_FILE), &questions)?;
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Exported to {}",
        dir.display()
    );
    Ok(())
}

/// Upserts every category and question found in `dir` in one transaction.
pub async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&dir.join(QUESTIONS_FILE))?;
    ensure_unique_ids("category", categories.iter().map(|c| c.id))?;
    ensure_unique_ids("question", questions.iter().map(|q| q.id))?;
    ensure_valid_difficulties(&questions)?;

    let mut tx = pool.begin().await?;
    for category in &categories {
        upsert_category(&mut tx, category)
            .await
            .with_context(|| format!("Cannot import category {}", category.id))?;
    }
    for question in &questions {
        upsert_question(&mut tx, question)
            .await
            .with_context(|| format!("Cannot import question {}", question.id))?;
    }
    tx.commit().await?;

    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Imported from {}",
        dir.display()
    );
    Ok(())
}
