//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the S.A.G.E CLI.

use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the S.A.G.E banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                r#"
   {}
   {}
   {}
   {}
   {}
"#,
                r"  ____    _    ____ _____ ".bright_green().bold(),
                r" / ___|  / \  / ___| ____|".bright_green().bold(),
                r" \___ \ / _ \| |  _|  _|  ".green().bold(),
                r"  ___) / ___ \ |_| | |___ ".cyan().bold(),
                r" |____/_/   \_\____|_____|".cyan().bold(),
            );
            println!(
                "   {} {}\n",
                "Search-Augmented Gemini Endpoint".bright_white().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!(
                r#"
  ____    _    ____ _____
 / ___|  / \  / ___| ____|
 \___ \ / _ \| |  _|  _|
  ___) / ___ \ |_| | |___
 |____/_/   \_\____|_____|

   Search-Augmented Gemini Endpoint v{}
"#,
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a file skipped message
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a subheader
    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// Print completion message with next steps
    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "🚀".green(), message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Print an on/off setting as `enabled` / `disabled`
    pub fn toggle(&self, key: &str, enabled: bool) {
        let label = toggle_label(enabled);
        if !self.colored {
            println!("    {}: {}", key, label);
        } else if enabled {
            println!("    {}: {}", key.dimmed(), label.green());
        } else {
            println!("    {}: {}", key.dimmed(), label.dimmed());
        }
    }

    /// Print the Gemini model chain, primary model first
    pub fn model_chain(&self, models: &[String]) {
        let Some((primary, fallbacks)) = models.split_first() else {
            self.kv("models", "(none)");
            return;
        };

        if self.colored {
            let rest: Vec<String> = fallbacks.iter().map(|m| m.dimmed().to_string()).collect();
            let mut line = primary.bright_green().bold().to_string();
            if !rest.is_empty() {
                line = format!("{} {} {}", line, "→".dimmed(), rest.join(" → "));
            }
            println!("    {}: {}", "models".dimmed(), line);
        } else {
            println!("    models: {}", chain_text(models));
        }
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}

fn toggle_label(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

fn chain_text(models: &[String]) -> String {
    models.join(" -> ")
}
