// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::rc::Rc;

pub struct Account {
    pub id: u32,
    pub owner: String,
}

impl Account {
    pub fn new_shared(id: u32) -> Rc<Account> {
        Rc::new(Account {
            id,
            owner: String::new(),
        })
    }

    pub fn rename(&mut self, owner: &str) {
        self.owner = owner.to_string();
    }

    pub fn describe(&self, account: u8) -> String {
        format!("{}#{}:{}", self.owner, self.id, account)
    }
}
