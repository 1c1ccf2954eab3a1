//! Styled terminal output and prompts.

use dialoguer::Confirm;

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for list items
pub static ITEM_PREFIX: &str = "├─";
/// Prefix for the last item of a list
pub static LAST_ITEM_PREFIX: &str = "└─";

/// Something to show the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// A completed action
  Success(&'a str),
  /// Neutral information
  Info(&'a str),
  /// Something the user should look at
  Warning(&'a str),
  /// A failed command
  Error(&'a str),
  /// A titled list
  List(&'a str, &'a [String]),
}

/// How commands talk to the user.
pub trait UserInteraction {
  /// Asks a yes/no question, defaulting to no.
  fn confirm(&self, message: &str) -> Result<bool>;
  /// Shows a message.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

impl UserInteraction for Cli {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      return Ok(true);
    }
    Ok(Confirm::new().with_prompt(message).default(false).wait_for_newline(true).interact()?)
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Success(message) => {
        println!("{} {}", style(SUCCESS_PREFIX).green(), message)
      },
      ResponseContent::Info(message) => println!("{} {}", style(INFO_PREFIX).blue(), message),
      ResponseContent::Warning(message) => {
        println!("{} {}", style(WARNING_PREFIX).yellow(), style(message).yellow())
      },
      ResponseContent::Error(message) => {
        eprintln!("{} {}", style(ERROR_PREFIX).red(), style(message).red())
      },
      ResponseContent::List(title, items) => {
        println!("{} {}", style(INFO_PREFIX).blue(), style(title).bold());
        for (index, item) in items.iter().enumerate() {
          let prefix = if index + 1 == items.len() { LAST_ITEM_PREFIX } else { ITEM_PREFIX };
          println!("   {} {}", style(prefix).dim(), item);
        }
      },
    }
    Ok(())
  }
}
