// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use tally_db::{PointAdjustment, Store};
use tally_testkit::LedgerFaker;
use time::macros::datetime;
use tracing::info;

const DEMO_SEED: u64 = 2026;
const DEMO_STUDENTS: usize = 8;

/// Accounts created by [`seed_demo_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoLedger {
    pub operator: String,
    pub students: Vec<String>,
}

/// Fills an empty store with one admin and a handful of students, each with
/// a few signed adjustments logged under the admin.
pub fn seed_demo_data(store: &Store) -> Result<DemoLedger> {
    let mut faker = LedgerFaker::new(DEMO_SEED);
    let start = datetime!(2026-01-05 00:00:00 UTC);

    let operator = faker.user();
    store
        .create_user(&operator.registration())
        .context("create demo operator")?;
    store.grant_admin(&operator.account)?;

    let mut students = Vec::with_capacity(DEMO_STUDENTS);
    let mut records = 0usize;
    for _ in 0..DEMO_STUDENTS {
        let student = faker.user();
        store
            .create_user(&student.registration())
            .with_context(|| format!("create demo student {}", student.account))?;

        let count = 2 + faker.int_n(6);
        for _ in 0..count {
            let adjustment = faker.adjustment(&student.account, start);
            let outcome = store.adjust_points_at(
                Some(&operator.account),
                &PointAdjustment {
                    account: adjustment.account,
                    category: adjustment.category,
                    amount: adjustment.amount,
                    reason: adjustment.reason,
                },
                adjustment.time,
            )?;
            if outcome.applied().is_some() {
                records += 1;
            }
        }
        students.push(student.account);
    }

    info!(students = students.len(), records, "demo ledger seeded");
    Ok(DemoLedger {
        operator: operator.account,
        students,
    })
}
