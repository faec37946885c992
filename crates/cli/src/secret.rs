//! Secret-store lookup for the Gemini credential.
//!
//! The key can also arrive via `--api-key` / `GEMINI_API_KEY`; this module
//! is the fallback. Store it once with:
//!
//! ```sh
//! keyring set remates gemini_api_key   # or any keyring front end
//! ```

use anyhow::{Context, Result};
use keyring::Entry;

const KEYRING_SERVICE: &str = "remates";
const KEYRING_USERNAME: &str = "gemini_api_key";

/// Reads the Gemini API key from the system keyring.
pub fn gemini_api_key() -> Result<String> {
    let entry = Entry::new(KEYRING_SERVICE, KEYRING_USERNAME)?;
    entry.get_password().context(
        "no hay API key: pásala con --api-key, GEMINI_API_KEY o guárdala en el llavero del sistema",
    )
}
