//! `chainlens amount`: scale a raw amount and format it for display.

use anyhow::{Context, Result};
use chainlens_core::decimal::{format_with, DecimalAmount, FormatOptions};

pub fn run(raw: &str, denomination: u32, normalize: bool, opts: &FormatOptions) -> Result<()> {
    let amount: DecimalAmount = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a number"))?;
    println!("{}", render(&amount, denomination, normalize, opts));
    Ok(())
}

fn render(amount: &DecimalAmount, denomination: u32, normalize: bool, opts: &FormatOptions) -> String {
    format_with(amount, denomination, normalize, opts)
}
