// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use tally_app::{EntryCategory, RegistrationInput};
use time::{Duration, OffsetDateTime};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const ADD_REASONS: [&str; 10] = [
    "Attendance",
    "Homework on time",
    "Helped a classmate",
    "Quiz bonus",
    "Lab report",
    "Class participation",
    "Project milestone",
    "Volunteer duty",
    "Perfect attendance week",
    "Presentation",
];
const REMOVE_REASONS: [&str; 8] = [
    "Late homework",
    "Absent without notice",
    "Missed lab",
    "Phone in class",
    "Late to class",
    "Incomplete report",
    "Duplicate entry",
    "Correction",
];

/// Account prefix of generated users; the remaining digits are a sequence.
pub const ACCOUNT_PREFIX: &str = "113";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub account: String,
    pub name: String,
    pub password: String,
}

impl User {
    pub fn registration(&self) -> RegistrationInput {
        RegistrationInput {
            account: self.account.clone(),
            name: self.name.clone(),
            password: self.password.clone(),
            confirm: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    pub account: String,
    pub category: EntryCategory,
    pub amount: i64,
    pub reason: String,
    pub time: OffsetDateTime,
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn ratio(&mut self, numerator: u64, denominator: u64) -> bool {
        denominator > 0 && self.next_u64() % denominator < numerator
    }
}

/// Seeded generator of users and ledger adjustments. The same seed always
/// produces the same sequence.
#[derive(Debug, Clone)]
pub struct LedgerFaker {
    rng: DeterministicRng,
    next_account: u32,
}

impl LedgerFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_account: 1,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn user(&mut self) -> User {
        let account = format!("{ACCOUNT_PREFIX}{:06}", self.next_account);
        self.next_account += 1;
        let name = format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES));
        let password = format!("pw-{}", &account[account.len() - 4..]);
        User {
            account,
            name,
            password,
        }
    }

    /// Mostly additions; amounts stay inside the per-update bounds.
    pub fn adjustment(&mut self, account: &str, not_before: OffsetDateTime) -> Adjustment {
        let category = if self.rng.ratio(7, 10) {
            EntryCategory::Add
        } else {
            EntryCategory::Remove
        };
        let magnitude = self.int_range_i64(1, 15);
        let (amount, reason) = match category {
            EntryCategory::Add => (magnitude, self.pick(&ADD_REASONS)),
            EntryCategory::Remove => (-magnitude, self.pick(&REMOVE_REASONS)),
        };
        let time = self.datetime_between(not_before, not_before + Duration::days(60));
        Adjustment {
            account: account.to_owned(),
            category,
            amount,
            reason: reason.to_owned(),
            time,
        }
    }

    pub fn datetime_between(
        &mut self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> OffsetDateTime {
        let start_ts = start.unix_timestamp();
        let end_ts = end.unix_timestamp();
        if end_ts <= start_ts {
            return start;
        }
        let span = (end_ts - start_ts) as u64;
        let offset = self.rng.next_u64() % (span + 1);
        OffsetDateTime::from_unix_timestamp(start_ts + offset as i64).unwrap_or(start)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("tally.db");
    Ok((dir, db_path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

pub fn add_reasons() -> &'static [&'static str] {
    &ADD_REASONS
}

pub fn remove_reasons() -> &'static [&'static str] {
    &REMOVE_REASONS
}
