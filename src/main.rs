//! # iconmatch CLI
//!
//! Command-line interface for the icon matching engine.
//!
//! ## Usage
//! ```bash
//! iconmatch match ./icons/queries ./icons/references
//! iconmatch match ./icons/queries ./icons/references --output json
//! ```

mod cli;

use icon_match::Result;

fn main() -> Result<()> {
    cli::run()
}
