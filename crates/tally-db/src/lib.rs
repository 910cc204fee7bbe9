// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod validation;

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tally_app::{
    DEFAULT_DISPLAY_OFFSET, Entry, EntryCategory, LogEntry, LogId, RecordId, RegistrationInput,
    SubmissionForm, UserSummary, format_local, parse_timestamp, to_rfc3339,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::validation::{
    ValidationError, parse_category, parse_reason, parse_required_int, require_nonzero,
    resolve_amount,
};

pub const APP_NAME: &str = "tally";
pub const LOG_RETENTION_DAYS: i64 = 7;

pub const ADJUST_URL: &str = "/admin/adjust";
pub const RECORD_UPDATE_URL: &str = tally_app::RECORD_UPDATE_ACTION;
pub const RECORD_DELETE_URL: &str = tally_app::RECORD_DELETE_ACTION;

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("users", &["account", "name", "password_hash", "points"]),
    ("admins", &["account"]),
    (
        "records",
        &["id", "user_account", "time", "type", "amount", "reason"],
    ),
    ("logs", &["id", "user_account", "time", "url", "log"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_records_user_account",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_records_user_account ON records (user_account);",
    },
    RequiredIndex {
        name: "idx_records_time",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_records_time ON records (time);",
    },
    RequiredIndex {
        name: "idx_logs_time",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_logs_time ON logs (time);",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointAdjustment {
    pub account: String,
    pub category: EntryCategory,
    pub amount: i64,
    pub reason: String,
}

/// Raw field values of a submitted record-update form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordUpdateRequest {
    pub account: String,
    pub id: String,
    pub category: String,
    pub amount: String,
    pub reason: String,
}

impl RecordUpdateRequest {
    pub fn from_form(form: &SubmissionForm) -> Self {
        let field = |name: &str| form.value(name).unwrap_or_default().to_owned();
        Self {
            account: field("account"),
            id: field("id"),
            category: field("category"),
            amount: field("amount"),
            reason: field("reason"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordDeleteRequest {
    pub account: String,
    pub id: String,
}

impl RecordDeleteRequest {
    pub fn from_form(form: &SubmissionForm) -> Self {
        let field = |name: &str| form.value(name).unwrap_or_default().to_owned();
        Self {
            account: field("account"),
            id: field("id"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UnknownAccount,
    InvalidId,
    InvalidField(ValidationError),
    RecordNotFound,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAccount => f.write_str("account not found"),
            Self::InvalidId => f.write_str("record id is not a number"),
            Self::InvalidField(error) => write!(f, "{error}"),
            Self::RecordNotFound => f.write_str("record not found for this account"),
        }
    }
}

impl From<ValidationError> for Rejection {
    fn from(error: ValidationError) -> Self {
        Self::InvalidField(error)
    }
}

/// A request the store refused is a value, not an error; errors are
/// reserved for the database itself failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Applied(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Applied(_) => None,
            Self::Rejected(rejection) => Some(*rejection),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub id: RecordId,
    pub account: String,
    pub old_amount: i64,
    pub new_amount: i64,
    pub old_reason: String,
    pub new_reason: String,
}

impl RecordChange {
    pub fn is_noop(&self) -> bool {
        self.old_amount == self.new_amount && self.old_reason == self.new_reason
    }

    pub fn log_message(&self) -> String {
        let mut message = format!("Updated record {} for {} ( ", self.id.get(), self.account);
        if self.is_noop() {
            message.push_str("NO changes ");
        }
        if self.old_amount != self.new_amount {
            message.push_str(&format!(
                "amount: {} -> {} ; ",
                self.old_amount, self.new_amount
            ));
        }
        if self.old_reason != self.new_reason {
            message.push_str(&format!(
                "reason: {} -> {} ; ",
                self.old_reason, self.new_reason
            ));
        }
        message.push(')');
        message
    }
}

/// Audit line for a removed record; the time is shown at the display
/// offset.
pub fn removal_log_message(entry: &Entry) -> String {
    format!(
        "Delete record {} for {} with ( time = {} ; type = {} ; amount = {} ; reason = {} )",
        entry.id.get(),
        entry.account,
        format_local(entry.time, DEFAULT_DISPLAY_OFFSET),
        entry.category.as_str(),
        entry.amount,
        entry.reason
    )
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
            info!("created ledger schema");
        }

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    pub fn create_user(&self, input: &RegistrationInput) -> Result<()> {
        input
            .validate()
            .with_context(|| format!("register account {:?}", input.account.trim()))?;
        let account = input.account.trim();
        if self.user_exists(account)? {
            bail!("account {account} is already registered -- pick another account");
        }

        self.conn
            .execute(
                "
                INSERT INTO users (account, name, password_hash, points, created_at)
                VALUES (?, ?, ?, 0, ?)
                ",
                params![
                    account,
                    input.name.trim(),
                    password_hash(account, &input.password),
                    now_rfc3339(),
                ],
            )
            .with_context(|| format!("insert user {account}"))?;
        debug!(account, "user registered");
        Ok(())
    }

    pub fn user_exists(&self, account: &str) -> Result<bool> {
        let exists = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE account = ?)",
                params![account],
                |row| row.get::<_, i64>(0),
            )
            .with_context(|| format!("check user {account}"))?;
        Ok(exists == 1)
    }

    pub fn user_name(&self, account: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT name FROM users WHERE account = ?",
                params![account],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("load user {account}"))
    }

    /// Stored running balance, as maintained by adjustments and updates.
    pub fn user_points(&self, account: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT points FROM users WHERE account = ?",
                params![account],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("load points for {account}"))
    }

    pub fn grant_admin(&self, account: &str) -> Result<()> {
        if !self.user_exists(account)? {
            bail!("account {account} not found -- register it before granting admin");
        }
        self.conn
            .execute(
                "INSERT OR IGNORE INTO admins (account) VALUES (?)",
                params![account],
            )
            .with_context(|| format!("grant admin to {account}"))?;
        Ok(())
    }

    pub fn is_admin(&self, account: &str) -> Result<bool> {
        let exists = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM admins WHERE account = ?)",
                params![account],
                |row| row.get::<_, i64>(0),
            )
            .with_context(|| format!("check admin {account}"))?;
        Ok(exists == 1)
    }

    pub fn adjust_points(
        &self,
        actor: Option<&str>,
        adjustment: &PointAdjustment,
    ) -> Result<Outcome<RecordId>> {
        self.adjust_points_at(actor, adjustment, OffsetDateTime::now_utc())
    }

    pub fn adjust_points_at(
        &self,
        actor: Option<&str>,
        adjustment: &PointAdjustment,
        at: OffsetDateTime,
    ) -> Result<Outcome<RecordId>> {
        let Some(name) = self.user_name(&adjustment.account)? else {
            return Ok(Outcome::Rejected(Rejection::UnknownAccount));
        };
        let amount = match require_nonzero(adjustment.amount)
            .and_then(|amount| resolve_amount(adjustment.category, &amount.to_string()))
        {
            Ok(amount) => amount,
            Err(error) => return Ok(Outcome::Rejected(error.into())),
        };
        let reason = match parse_reason(&adjustment.reason) {
            Ok(reason) => reason,
            Err(error) => return Ok(Outcome::Rejected(error.into())),
        };
        let category = EntryCategory::for_amount(amount);

        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin adjustment")?;
        tx.execute(
            "
            INSERT INTO records (user_account, time, type, amount, reason)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                adjustment.account,
                to_rfc3339(at),
                category.as_str(),
                amount,
                reason
            ],
        )
        .context("insert record")?;
        let record_id = RecordId::new(tx.last_insert_rowid());
        tx.execute(
            "UPDATE users SET points = points + ? WHERE account = ?",
            params![amount, adjustment.account],
        )
        .context("update user points")?;
        tx.commit().context("commit adjustment")?;

        if let Some(actor) = actor {
            let (verb, preposition) = match category {
                EntryCategory::Add => ("Add", "from"),
                EntryCategory::Remove => ("Remove", "to"),
            };
            self.append_log(
                actor,
                ADJUST_URL,
                &format!(
                    "{verb} {} points {preposition} {} {name} for the reason [ {reason} ]",
                    amount.abs(),
                    adjustment.account
                ),
            )?;
        }
        info!(
            account = adjustment.account.as_str(),
            amount,
            record = record_id.get(),
            "points adjusted"
        );
        Ok(Outcome::Applied(record_id))
    }

    /// Applies a submitted record edit: the amount's sign follows the
    /// submitted category, it is clamped to the per-update bounds, and the
    /// owner's balance moves by the difference.
    pub fn update_record(
        &self,
        actor: Option<&str>,
        request: &RecordUpdateRequest,
    ) -> Result<Outcome<RecordChange>> {
        let account = request.account.trim();
        if !self.user_exists(account)? {
            return Ok(Outcome::Rejected(Rejection::UnknownAccount));
        }
        let Ok(id) = parse_required_int(&request.id) else {
            return Ok(Outcome::Rejected(Rejection::InvalidId));
        };
        if let Err(error) = parse_required_int(&request.amount) {
            return Ok(Outcome::Rejected(error.into()));
        }
        let category = match parse_category(&request.category) {
            Ok(category) => category,
            Err(error) => return Ok(Outcome::Rejected(error.into())),
        };
        let reason = match parse_reason(&request.reason) {
            Ok(reason) => reason,
            Err(error) => return Ok(Outcome::Rejected(error.into())),
        };
        let amount = match resolve_amount(category, &request.amount) {
            Ok(amount) => amount,
            Err(error) => return Ok(Outcome::Rejected(error.into())),
        };

        let existing = self
            .conn
            .query_row(
                "SELECT amount, reason FROM records WHERE id = ? AND user_account = ?",
                params![id, account],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .with_context(|| format!("load record {id}"))?;
        let Some((old_amount, old_reason)) = existing else {
            return Ok(Outcome::Rejected(Rejection::RecordNotFound));
        };

        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin record update")?;
        tx.execute(
            "UPDATE users SET points = points - ? + ? WHERE account = ?",
            params![old_amount, amount, account],
        )
        .context("update user points")?;
        tx.execute(
            "UPDATE records SET type = ?, amount = ?, reason = ? WHERE id = ?",
            params![
                EntryCategory::for_amount(amount).as_str(),
                amount,
                reason,
                id
            ],
        )
        .with_context(|| format!("update record {id}"))?;
        tx.commit().context("commit record update")?;

        let change = RecordChange {
            id: RecordId::new(id),
            account: account.to_owned(),
            old_amount,
            new_amount: amount,
            old_reason,
            new_reason: reason,
        };
        if let Some(actor) = actor {
            self.append_log(actor, RECORD_UPDATE_URL, &change.log_message())?;
        }
        info!(
            record = id,
            account,
            old_amount,
            new_amount = amount,
            "record updated"
        );
        Ok(Outcome::Applied(change))
    }

    /// Removes one record and takes its amount back out of the owner's
    /// balance.
    pub fn delete_record(
        &self,
        actor: Option<&str>,
        request: &RecordDeleteRequest,
    ) -> Result<Outcome<Entry>> {
        let account = request.account.trim();
        if !self.user_exists(account)? {
            return Ok(Outcome::Rejected(Rejection::UnknownAccount));
        }
        let Ok(id) = parse_required_int(&request.id) else {
            return Ok(Outcome::Rejected(Rejection::InvalidId));
        };
        let Some(entry) = self.load_entry(id, account)? else {
            return Ok(Outcome::Rejected(Rejection::RecordNotFound));
        };

        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin record delete")?;
        tx.execute(
            "UPDATE users SET points = points - ? WHERE account = ?",
            params![entry.amount, account],
        )
        .context("update user points")?;
        tx.execute("DELETE FROM records WHERE id = ?", params![id])
            .with_context(|| format!("delete record {id}"))?;
        tx.commit().context("commit record delete")?;

        if let Some(actor) = actor {
            self.append_log(actor, RECORD_DELETE_URL, &removal_log_message(&entry))?;
        }
        info!(record = id, account, amount = entry.amount, "record deleted");
        Ok(Outcome::Applied(entry))
    }

    fn load_entry(&self, id: i64, account: &str) -> Result<Option<Entry>> {
        let row = self
            .conn
            .query_row(
                "
                SELECT id, user_account, time, type, amount, reason
                FROM records
                WHERE id = ? AND user_account = ?
                ",
                params![id, account],
                entry_columns,
            )
            .optional()
            .with_context(|| format!("load record {id}"))?;
        row.map(entry_from_columns).transpose()
    }

    /// Entries newest first; `target` narrows to one account.
    pub fn list_entries(&self, target: Option<&str>) -> Result<Vec<Entry>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, user_account, time, type, amount, reason
                FROM records
                WHERE (?1 IS NULL OR user_account = ?1)
                ORDER BY time DESC, id DESC
                ",
            )
            .context("prepare entries query")?;
        let rows = stmt
            .query_map(params![target], entry_columns)
            .context("query entries")?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(entry_from_columns(row.context("read entry row")?)?);
        }
        Ok(entries)
    }

    /// Users with their ledger totals, ordered by account.
    pub fn list_user_summaries(&self) -> Result<Vec<UserSummary>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT u.account, u.name, COALESCE(SUM(r.amount), 0), COUNT(r.id)
                FROM users u
                LEFT JOIN records r ON r.user_account = u.account
                GROUP BY u.account, u.name
                ORDER BY u.account ASC
                ",
            )
            .context("prepare user summaries query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(UserSummary {
                    account: row.get(0)?,
                    name: row.get(1)?,
                    points: row.get(2)?,
                    record_count: row.get(3)?,
                })
            })
            .context("query user summaries")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect user summaries")
    }

    pub fn append_log(&self, actor: &str, url: &str, message: &str) -> Result<LogId> {
        self.conn
            .execute(
                "INSERT INTO logs (user_account, time, url, log) VALUES (?, ?, ?, ?)",
                params![actor, now_rfc3339(), url, message],
            )
            .with_context(|| {
                format!("write audit log for {actor}; the operator must be a registered account")
            })?;
        Ok(LogId::new(self.conn.last_insert_rowid()))
    }

    /// Newest first; `query` is a case-insensitive substring of the message.
    pub fn list_logs(&self, query: Option<&str>, limit: usize) -> Result<Vec<LogEntry>> {
        let pattern = query
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| format!("%{value}%"));
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, user_account, time, url, log
                FROM logs
                WHERE (?1 IS NULL OR log LIKE ?1)
                ORDER BY time DESC, id DESC
                LIMIT ?2
                ",
            )
            .context("prepare logs query")?;
        let rows = stmt
            .query_map(params![pattern, limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .context("query logs")?;

        let mut logs = Vec::new();
        for row in rows {
            let (id, account, time, url, message) = row.context("read log row")?;
            logs.push(LogEntry {
                id: LogId::new(id),
                account,
                time: parse_timestamp(&time)
                    .with_context(|| format!("log {id} has an unreadable time"))?,
                url,
                message,
            });
        }
        Ok(logs)
    }

    /// Deletes audit lines older than the retention window.
    pub fn prune_logs(&self, now: OffsetDateTime) -> Result<usize> {
        let cutoff = to_rfc3339(now - Duration::days(LOG_RETENTION_DAYS));
        let removed = self
            .conn
            .execute("DELETE FROM logs WHERE time < ?", params![cutoff])
            .context("prune audit logs")?;
        if removed > 0 {
            info!(removed, %cutoff, "pruned audit logs");
        }
        Ok(removed)
    }
}

type EntryColumns = (i64, String, String, String, i64, String);

fn entry_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntryColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn entry_from_columns(
    (id, account, time, category, amount, reason): EntryColumns,
) -> Result<Entry> {
    let category = EntryCategory::parse(&category)
        .ok_or_else(|| anyhow!("record {id} has unknown type {category:?}"))?;
    Ok(Entry {
        id: RecordId::new(id),
        account,
        time: parse_timestamp(&time)
            .with_context(|| format!("record {id} has an unreadable time"))?,
        category,
        amount,
        reason,
    })
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("TALLY_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set TALLY_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("tally.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; use a tally-compatible database or migrate first"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; run migration before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; run migration before launching",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> String {
    to_rfc3339(OffsetDateTime::now_utc())
}

fn password_hash(account: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(account.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    let mut output = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}
