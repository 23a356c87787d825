//! Actionable CLI errors: a summary line, optional detail and a list of
//! commands worth trying. `main` renders them as text or as one JSON object.

use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    fn new(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Some(context.into()),
            suggestions: Vec::new(),
        }
    }

    fn try_this(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn file_not_found(path: &Path) -> Self {
        Self::new(
            format!("File not found: {}", path.display()),
            "Screenshots are read from the local filesystem",
        )
        .try_this(format!("ls -la {}", path.display()))
    }

    pub fn ledger_not_configured(config_path: &Path) -> Self {
        Self::new("No spreadsheet configured", "[ledger].spreadsheet_id is empty")
            .try_this(format!(
                "set spreadsheet_id under [ledger] in {}",
                config_path.display()
            ))
            .try_this("tally run --memory-ledger")
    }

    pub fn missing_token(var: &str) -> Self {
        Self::new(
            "No Google Sheets access token",
            format!("${} is not set", var),
        )
        .try_this(format!("export {}=$(gcloud auth print-access-token)", var))
        .try_this("point [ledger].token_env at another variable")
    }

    pub fn invalid_player_id(raw: &str) -> Self {
        Self::new(
            format!("Invalid player ID: '{}'", raw),
            "Player IDs are chat platform user IDs, e.g. 123456789012345678",
        )
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}", self.message)?;
        if let Some(context) = &self.context {
            write!(f, "\n  {}", context)?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  try: {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Print an error as a single JSON object on stdout.
pub fn print_json_error(err: &anyhow::Error) {
    let value = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::json!({
            "error": helpful.message,
            "context": helpful.context,
            "suggestions": helpful.suggestions,
        }),
        None => serde_json::json!({ "error": format!("{:#}", err) }),
    };
    println!("{}", value);
}
