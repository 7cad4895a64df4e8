// Code generated by richsig-gen. DO NOT EDIT.
// Source crate: ledger
#![allow(unused_mut, unused_variables, clippy::all)]

use super::*;

// These types must implement richsig::Fill (#[derive(richsig::Fill)] on structs):
//   Ledger
//   account::Account

pub fn fuzz_ledger_close(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let name: String = ::richsig::Fill::fill(&mut fuzz_stream);
    let ledger2 = Ledger::new(name);
    let _ = ledger2.close();
    0
}

pub fn fuzz_ledger_new(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let name: String = ::richsig::Fill::fill(&mut fuzz_stream);
    let _ = Ledger::new(name);
    0
}

pub fn fuzz_ledger_open(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let name: String = ::richsig::Fill::fill(&mut fuzz_stream);
    let capacity: usize = ::richsig::Fill::fill(&mut fuzz_stream);
    let _ = Ledger::open(&name, capacity);
    0
}

pub fn fuzz_ledger_record(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let name: String = ::richsig::Fill::fill(&mut fuzz_stream);
    let amount: i64 = ::richsig::Fill::fill(&mut fuzz_stream);
    let memo: Option<String> = ::richsig::Fill::fill(&mut fuzz_stream);
    if memo.is_none() {
        return 0;
    }
    let mut ledger4 = Ledger::new(name);
    let _ = ledger4.record(amount, memo);
    0
}

pub fn fuzz_ledger_total(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let name: String = ::richsig::Fill::fill(&mut fuzz_stream);
    let ledger2 = Ledger::new(name);
    let _ = ledger2.total();
    0
}

pub fn fuzz_account_describe(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let id: u32 = ::richsig::Fill::fill(&mut fuzz_stream);
    let account2: u8 = ::richsig::Fill::fill(&mut fuzz_stream);
    let account3 = account::Account::new_shared(id);
    let _ = account3.describe(account2);
    0
}

pub fn fuzz_account_new_shared(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let id: u32 = ::richsig::Fill::fill(&mut fuzz_stream);
    let _ = account::Account::new_shared(id);
    0
}

pub fn fuzz_account_rename(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let mut account1: account::Account = ::richsig::Fill::fill(&mut fuzz_stream);
    let owner: String = ::richsig::Fill::fill(&mut fuzz_stream);
    account1.rename(&owner);
    0
}

pub fn fuzz_audit(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let ledger1: Ledger = ::richsig::Fill::fill(&mut fuzz_stream);
    let limit: u32 = ::richsig::Fill::fill(&mut fuzz_stream);
    let _ = audit(&ledger1, limit);
    0
}
