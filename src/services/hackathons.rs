// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hackathon search. Returns a fixed listing until a real source is wired in.

use serde::{Deserialize, Serialize};

/// Query used when the chat message names none.
pub const DEFAULT_QUERY: &str = "hackathons";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hackathon {
    pub title: String,
    pub date: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HackathonResults {
    pub success: bool,
    pub message: String,
    pub results: Vec<Hackathon>,
}

const LISTINGS: &[(&str, &str, &str)] = &[
    ("Global AI Hackathon", "2026-02-14", "https://globalai.example.com"),
    ("Web3 Builder Jam", "2026-03-01", "https://web3jam.example.com"),
    ("Green Tech Challenge", "2026-04-22", "https://greentech.example.com"),
];

pub fn find_hackathons(query: Option<&str>) -> HackathonResults {
    let query = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(DEFAULT_QUERY);

    tracing::debug!(query, "Hackathon search");

    HackathonResults {
        success: true,
        message: format!("Found hackathons for query: \"{}\"", query),
        results: LISTINGS
            .iter()
            .map(|(title, date, link)| Hackathon {
                title: title.to_string(),
                date: date.to_string(),
                link: link.to_string(),
            })
            .collect(),
    }
}
