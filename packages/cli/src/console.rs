use colored::*;
use gateway::{Notification, NotificationLevel, Notifier};

/// Prints notifications to stderr so they never mix with command output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => eprintln!("{} {}", "ℹ".blue(), notification.message),
            NotificationLevel::Warning => {
                eprintln!("{} {}", "⚠".yellow(), notification.message.yellow())
            }
            NotificationLevel::Error => eprintln!("{} {}", "✗".red(), notification.message.red()),
        }
    }
}

pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.green());
}

pub fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to render response: {}", e))?;
    println!("{}", rendered);
    Ok(())
}
