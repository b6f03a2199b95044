//! Code formatters applied to rendered output before it is written

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::{FormatterConfig, FormatterKind};
use crate::generation::{CodeFormatter, GenerationError, Result};

/// Whitespace normaliser that needs no external tools.
///
/// Strips trailing whitespace and leading blank lines, allows at most two
/// consecutive blank lines and ends non-empty output with one newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFormatter;

impl BuiltinFormatter {
    pub fn format_source(code: &str) -> String {
        let mut formatted = String::with_capacity(code.len());
        let mut blank_run = 0;

        for line in code.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                if formatted.is_empty() {
                    continue;
                }
                blank_run += 1;
                if blank_run > 2 {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            formatted.push_str(line);
            formatted.push('\n');
        }

        while formatted.ends_with("\n\n") {
            formatted.pop();
        }
        formatted
    }
}

#[async_trait]
impl CodeFormatter for BuiltinFormatter {
    async fn format(&self, code: &str) -> Result<String> {
        Ok(Self::format_source(code))
    }
}

/// Pipes source through an external program such as `black -`
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl CodeFormatter for CommandFormatter {
    async fn format(&self, code: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GenerationError::Format(format!("Failed to run {}: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| GenerationError::Format("Formatter stdin unavailable".to_string()))?;
        let input = code.to_string();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| GenerationError::Format(format!("{} failed: {e}", self.program)))?;
        writer
            .await
            .map_err(|e| GenerationError::Format(e.to_string()))?
            .map_err(|e| GenerationError::Format(format!("Failed to write to {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(GenerationError::Format(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| GenerationError::Format(format!("{} produced invalid UTF-8: {e}", self.program)))
    }
}

/// Build the formatter selected in the configuration
pub fn formatter_from_config(config: &FormatterConfig) -> Result<Arc<dyn CodeFormatter>> {
    match config.kind {
        FormatterKind::Builtin => Ok(Arc::new(BuiltinFormatter)),
        FormatterKind::Command => {
            let program = config
                .command
                .as_deref()
                .filter(|command| !command.trim().is_empty())
                .ok_or_else(|| {
                    GenerationError::InvalidConfiguration(
                        "formatter.kind = \"command\" requires formatter.command".to_string(),
                    )
                })?;
            tracing::debug!(command = %program, "Using external formatter");
            Ok(Arc::new(CommandFormatter::new(program, config.args.clone())))
        }
    }
}
