//! Queries that span tables: place relations and cascades.

use rusqlite::{Connection, OptionalExtension};

use crate::Result;
use crate::models::{ReviewRow, now};
use crate::repository::Record;

fn collect_ids(conn: &Connection, sql: &str, key: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map([key], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(ids)
}

// -- Place reviews --

/// Review ids for a place, oldest first.
pub fn review_ids_for_place(conn: &Connection, place_id: &str) -> Result<Vec<String>> {
    collect_ids(
        conn,
        "SELECT id FROM reviews WHERE place_id = ?1 ORDER BY rowid",
        place_id,
    )
}

pub fn reviews_for_place(conn: &Connection, place_id: &str) -> Result<Vec<ReviewRow>> {
    let sql = format!(
        "SELECT {} FROM reviews WHERE place_id = ?1 ORDER BY rowid",
        ReviewRow::COLUMNS.join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([place_id], ReviewRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn review_by_user_for_place(
    conn: &Connection,
    user_id: &str,
    place_id: &str,
) -> Result<Option<ReviewRow>> {
    let sql = format!(
        "SELECT {} FROM reviews WHERE user_id = ?1 AND place_id = ?2",
        ReviewRow::COLUMNS.join(", ")
    );
    let row = conn
        .query_row(&sql, [user_id, place_id], ReviewRow::from_row)
        .optional()?;
    Ok(row)
}

pub fn delete_reviews_for_place(conn: &Connection, place_id: &str) -> Result<usize> {
    let removed = conn.execute("DELETE FROM reviews WHERE place_id = ?1", [place_id])?;
    Ok(removed)
}

pub fn delete_reviews_by_user(conn: &Connection, user_id: &str) -> Result<usize> {
    let removed = conn.execute("DELETE FROM reviews WHERE user_id = ?1", [user_id])?;
    Ok(removed)
}

// -- Place amenities --

/// Amenity ids linked to a place, in attachment order.
pub fn amenity_ids_for_place(conn: &Connection, place_id: &str) -> Result<Vec<String>> {
    collect_ids(
        conn,
        "SELECT amenity_id FROM place_amenities WHERE place_id = ?1 ORDER BY rowid",
        place_id,
    )
}

/// Links an amenity to a place. Returns false if the link already existed.
pub fn link_amenity(conn: &Connection, place_id: &str, amenity_id: &str) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO place_amenities (place_id, amenity_id, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![place_id, amenity_id, now()],
    )?;
    Ok(inserted > 0)
}

pub fn unlink_place_amenities(conn: &Connection, place_id: &str) -> Result<usize> {
    let removed = conn.execute("DELETE FROM place_amenities WHERE place_id = ?1", [place_id])?;
    Ok(removed)
}

pub fn unlink_amenity(conn: &Connection, amenity_id: &str) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM place_amenities WHERE amenity_id = ?1",
        [amenity_id],
    )?;
    Ok(removed)
}

// -- Ownership --

pub fn place_ids_for_owner(conn: &Connection, owner_id: &str) -> Result<Vec<String>> {
    collect_ids(
        conn,
        "SELECT id FROM places WHERE owner_id = ?1 ORDER BY rowid",
        owner_id,
    )
}
