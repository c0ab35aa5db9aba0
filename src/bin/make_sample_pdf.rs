// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generates the sample claims-FAQ PDF used to exercise the node locally.
//!
//! Run with: cargo run --bin make_sample_pdf [output-path]

use anyhow::Result;
use fabstir_rag_node::ingest::sample::write_sample_pdf;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/knowledge.pdf"));

    write_sample_pdf(&path)?;
    println!("📄 Sample PDF written to {}", path.display());

    Ok(())
}
