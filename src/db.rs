//! Reaction store schema and operations

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::models::{Ingredient, Reaction, ReactionBook};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per derived material
        CREATE TABLE IF NOT EXISTS reactions (
            output TEXT PRIMARY KEY,
            batch_size INTEGER NOT NULL CHECK (batch_size > 0),
            source TEXT
        );

        -- Inputs consumed per batch, in the order they were listed
        CREATE TABLE IF NOT EXISTS reaction_inputs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            output TEXT NOT NULL REFERENCES reactions(output) ON DELETE CASCADE,
            material TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            position INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_reaction_inputs_output ON reaction_inputs(output);
        CREATE INDEX IF NOT EXISTS idx_reaction_inputs_material ON reaction_inputs(material);
        "#,
    )?;
    Ok(())
}

/// Clear all stored reactions (for re-import)
pub fn clear_reactions(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM reaction_inputs;
        DELETE FROM reactions;
        "#,
    )?;
    Ok(())
}

fn to_sql(value: u64) -> Result<i64> {
    i64::try_from(value).with_context(|| format!("{} is too large to store", value))
}

fn from_sql(value: i64) -> Result<u64> {
    u64::try_from(value).with_context(|| format!("stored quantity {} is negative", value))
}

/// Insert or replace a reaction and its inputs
pub fn upsert_reaction(conn: &Connection, reaction: &Reaction, source: Option<&str>) -> Result<()> {
    conn.execute(
        "DELETE FROM reaction_inputs WHERE output = ?1",
        [&reaction.output],
    )?;
    conn.execute(
        "INSERT OR REPLACE INTO reactions (output, batch_size, source) VALUES (?1, ?2, ?3)",
        (&reaction.output, to_sql(reaction.batch_size)?, source),
    )?;

    for (position, input) in reaction.inputs.iter().enumerate() {
        conn.execute(
            "INSERT INTO reaction_inputs (output, material, quantity, position)
             VALUES (?1, ?2, ?3, ?4)",
            (
                &reaction.output,
                &input.material,
                to_sql(input.quantity)?,
                position as i64,
            ),
        )?;
    }
    Ok(())
}

/// Store every reaction of a book in one transaction
pub fn store_book(conn: &mut Connection, book: &ReactionBook, source: Option<&str>) -> Result<usize> {
    write_book(conn, book, source, false)
}

/// Clear the store and write `book` in one transaction; a failed write
/// leaves the previous reactions in place
pub fn replace_book(conn: &mut Connection, book: &ReactionBook, source: Option<&str>) -> Result<usize> {
    write_book(conn, book, source, true)
}

fn write_book(
    conn: &mut Connection,
    book: &ReactionBook,
    source: Option<&str>,
    clear: bool,
) -> Result<usize> {
    let tx = conn.transaction()?;
    if clear {
        clear_reactions(&tx)?;
    }
    for reaction in book.reactions() {
        upsert_reaction(&tx, reaction, source)?;
    }
    tx.commit()?;

    info!(reactions = book.len(), source = source.unwrap_or("-"), clear, "stored reactions");
    Ok(book.len())
}

/// List all stored reactions, ordered by output
pub fn list_reactions(conn: &Connection) -> Result<Vec<Reaction>> {
    let mut stmt = conn.prepare("SELECT output, batch_size FROM reactions ORDER BY output")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

    let mut heads = Vec::new();
    for row in rows {
        heads.push(row?);
    }

    let mut inputs_stmt = conn.prepare(
        "SELECT material, quantity FROM reaction_inputs WHERE output = ?1 ORDER BY position",
    )?;

    let mut results = Vec::new();
    for (output, batch_size) in heads {
        let rows = inputs_stmt.query_map([&output], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut inputs = Vec::new();
        for row in rows {
            let (material, quantity) = row?;
            inputs.push(Ingredient {
                material,
                quantity: from_sql(quantity)?,
            });
        }

        results.push(Reaction {
            output,
            batch_size: from_sql(batch_size)?,
            inputs,
        });
    }
    Ok(results)
}

/// Load and validate the stored reactions as a book rooted at `base`
pub fn load_book(conn: &Connection, base: &str) -> Result<ReactionBook> {
    let reactions = list_reactions(conn)?;
    ReactionBook::new(base, reactions).context("Stored reactions are inconsistent")
}

/// List every material mentioned by a stored reaction, as input or output
pub fn list_materials(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT output FROM reactions
         UNION
         SELECT material FROM reaction_inputs
         ORDER BY 1",
    )?;

    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}
