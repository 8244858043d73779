// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identifiers for records created while working from local storage.
//!
//! Format: base36 milliseconds followed by 9 random base36 characters.
//! The millisecond part is forced to increase strictly within the process,
//! so two ids minted in the same millisecond still differ and sort in
//! creation order.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

const RANDOM_SUFFIX_LEN: usize = 9;

static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// Generate a process-unique identifier.
pub fn generate_id() -> String {
    let stamp = next_stamp(chrono::Utc::now().timestamp_millis().max(0) as u64);

    let mut rng = rand::thread_rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| char::from_digit(rng.gen_range(0..36), 36).unwrap_or('0'))
        .collect();

    format!("{}{}", to_base36(stamp), suffix)
}

fn next_stamp(now_millis: u64) -> u64 {
    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now_millis.max(last + 1);
        match LAST_STAMP.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(char::from_digit((value % 36) as u32, 36).unwrap_or('0'));
        value /= 36;
    }
    digits.iter().rev().collect()
}
