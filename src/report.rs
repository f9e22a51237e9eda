use std::io::{self, Write};

use serde::Serialize;

use crate::blockchain::{Block, Blockchain};
use crate::config::ReportFormat;

/* ---------- JSON Report Models ---------- */

#[derive(Serialize)]
pub struct ChainReport {
    pub length: usize,
    pub difficulty_bits: u32,
    pub blocks: Vec<BlockReport>,
}

#[derive(Serialize)]
pub struct BlockReport {
    pub index: usize,
    pub timestamp: i64,
    pub prev_hash: String,
    pub data: String,
    pub hash: String,
    pub nonce: u64,
}

impl BlockReport {
    fn new(index: usize, block: &Block) -> Self {
        Self {
            index,
            timestamp: block.timestamp(),
            prev_hash: hex::encode(block.prev_digest()),
            data: String::from_utf8_lossy(block.payload()).into_owned(),
            hash: hex::encode(block.digest()),
            nonce: block.nonce(),
        }
    }
}

impl From<&Blockchain> for ChainReport {
    fn from(bc: &Blockchain) -> Self {
        Self {
            length: bc.len(),
            difficulty_bits: bc.difficulty_bits(),
            blocks: bc
                .iter()
                .enumerate()
                .map(|(i, b)| BlockReport::new(i, b))
                .collect(),
        }
    }
}

/// One entry per block, in chain order.
pub fn write_text<W: Write>(bc: &Blockchain, out: &mut W) -> io::Result<()> {
    for block in bc {
        writeln!(out, "Prev. hash: {}", hex::encode(block.prev_digest()))?;
        writeln!(out, "Data: {}", String::from_utf8_lossy(block.payload()))?;
        writeln!(out, "Hash: {}", hex::encode(block.digest()))?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_json<W: Write>(bc: &Blockchain, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &ChainReport::from(bc))?;
    writeln!(out)
}

pub fn write_report<W: Write>(
    bc: &Blockchain,
    format: ReportFormat,
    out: &mut W,
) -> io::Result<()> {
    match format {
        ReportFormat::Text => write_text(bc, out),
        ReportFormat::Json => write_json(bc, out),
    }
}
