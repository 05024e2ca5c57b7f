//! Edge-pair check

use anyhow::Result;

/// Print whether `first` and `second` are a rising/falling pair on one line
pub fn run(first: &str, second: &str) -> Result<()> {
    println!("{}", seismo_core::are_paired(first, second));
    Ok(())
}
