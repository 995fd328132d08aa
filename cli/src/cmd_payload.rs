//! `chainlens payload`: decode single payloads or group a batch.

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use chainlens_payload::{PayloadCodec, PayloadGroups, RawPayload};
use std::path::Path;

pub fn decode(payload: &str, framed: bool) -> Result<()> {
    let codec = PayloadCodec::default();
    let block = if framed {
        let buffer = base64_decode(payload)?;
        codec.decode(&buffer)?
    } else {
        codec.decode_base64(payload)?
    };

    let name = block.payload_type().map_or("custom", |t| t.name());
    println!("Type:    {} ({})", name, block.type_id);
    println!("{}", serde_json::to_string_pretty(&block.content)?);
    Ok(())
}

pub fn group(file: &Path, strict: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("read payload file '{}'", file.display()))?;
    let raws: Vec<RawPayload> =
        serde_json::from_str(&content).context("parse payload list JSON")?;

    let codec = PayloadCodec::default();
    let mut groups = PayloadGroups::new();

    if strict {
        for (index, raw) in raws.iter().enumerate() {
            groups
                .ingest(&codec, raw)
                .with_context(|| format!("payload #{index} ({}/{})", raw.asset_id, raw.group_id))?;
        }
    } else {
        let report = groups.ingest_all(&codec, &raws);
        for skipped in &report.skipped {
            eprintln!(
                "  ✗ #{} {}/{}: {}",
                skipped.index, skipped.asset_id, skipped.group_id, skipped.error
            );
        }
        eprintln!(
            "{} payloads grouped, {} skipped",
            report.accepted,
            report.skipped.len()
        );
        if report.accepted == 0 && !raws.is_empty() {
            bail!("no payload could be decoded");
        }
    }

    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}

fn base64_decode(encoded: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(encoded.trim())
        .context("payload is not valid base64")
}
