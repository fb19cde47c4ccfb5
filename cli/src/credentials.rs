//! API key resolution: `config.env` / environment first, interactive
//! prompt as a fallback.

use crate::input::read_line_hidden;

/// Placeholder value shipped in the sample `config.env`.
pub const PLACEHOLDER_KEY: &str = "your_openai_api_key_here";

/// Environment variable holding the OpenAI API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// A source of an API key. Sources are chained: the first one that
/// yields a usable key wins.
pub trait CredentialProvider {
    /// Returns a usable key, or `None` when this source has nothing.
    fn resolve(&self) -> Option<String>;
}

/// Reads the key from an environment variable, rejecting empty values
/// and the shipped placeholder.
#[derive(Debug)]
pub struct EnvCredential {
    var: &'static str,
}

impl EnvCredential {
    /// Reads from [`API_KEY_VAR`].
    #[must_use]
    pub const fn new() -> Self {
        Self { var: API_KEY_VAR }
    }

    #[cfg(test)]
    const fn from_var(var: &'static str) -> Self {
        Self { var }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvCredential {
    fn resolve(&self) -> Option<String> {
        let value = std::env::var(self.var).ok()?;
        let value = value.trim();
        if value.is_empty() || value == PLACEHOLDER_KEY {
            return None;
        }
        Some(value.to_string())
    }
}

/// Asks for the key interactively. The value is used for this session
/// only and never written to disk.
#[derive(Debug, Default)]
pub struct PromptCredential;

impl CredentialProvider for PromptCredential {
    fn resolve(&self) -> Option<String> {
        println!("OpenAI API key required.");
        println!();
        println!("Add your key to 'config.env':");
        println!("  1. Open config.env");
        println!("  2. Replace '{PLACEHOLDER_KEY}' with your actual API key");
        println!("  3. Save the file and run again");
        println!();
        println!("Get your API key from: https://platform.openai.com/api-keys");
        println!();
        println!("Or enter it now (it will not be saved):");

        let entered = read_line_hidden("API key: ").ok().flatten()?;
        let entered = entered.trim();
        if entered.is_empty() {
            return None;
        }
        println!("API key set for this session.");
        println!("Tip: add it to config.env for permanent storage.");
        Some(entered.to_string())
    }
}

/// Tries each provider in order and returns the first usable key.
pub fn resolve_chain(providers: &[&dyn CredentialProvider]) -> Option<String> {
    providers.iter().find_map(|provider| provider.resolve())
}
