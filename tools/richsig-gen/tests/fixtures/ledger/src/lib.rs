// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

pub mod account;

pub struct Ledger {
    pub name: String,
    entries: Vec<i64>,
}

impl Ledger {
    pub fn new(name: String) -> Ledger {
        Ledger {
            name,
            entries: Vec::new(),
        }
    }

    pub fn open(name: &str, capacity: usize) -> Result<Ledger, String> {
        if capacity > 1 << 20 {
            return Err(format!("capacity {capacity} too large"));
        }
        Ok(Ledger {
            name: name.to_string(),
            entries: Vec::with_capacity(capacity),
        })
    }

    pub fn record(&mut self, amount: i64, memo: Option<String>) -> bool {
        if memo.as_deref() == Some("") {
            return false;
        }
        self.entries.push(amount);
        true
    }

    pub fn total(&self) -> i64 {
        self.entries.iter().fold(0i64, |acc, e| acc.wrapping_add(*e))
    }

    pub fn close(self) -> Vec<i64> {
        self.entries
    }
}

pub fn audit(ledger: &Ledger, limit: u32) -> bool {
    ledger.entries.len() <= limit as usize
}
