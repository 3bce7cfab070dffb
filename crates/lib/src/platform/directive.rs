//! The platform directive mini-language.
//!
//! Tokens are applied left to right onto a [`PlatformSet`]:
//!
//! - `+os` adds the catalog defaults for `os`
//! - `-os` removes every platform of `os`
//! - `+os/arch` adds exactly that platform
//! - `-os/arch` removes exactly that platform
//! - `-` as the very first token starts from an empty set instead of the defaults

use thiserror::Error;
use tracing::{debug, warn};

use super::{Os, ParsePlatformError, Platform, PlatformSet};

/// A parsed platform directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
  AddOs(Os),
  RemoveOs(Os),
  AddPlatform(Platform),
  RemovePlatform(Platform),
  ResetToEmpty,
}

/// A token that is not a valid directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
  #[error("invalid platform directive '{token}': expected a leading '+' or '-'")]
  MissingSign { token: String },

  #[error("invalid platform directive '{token}': missing os after '{sign}'")]
  MissingOs { token: String, sign: char },

  #[error("invalid platform directive '{token}': {source}")]
  Platform {
    token: String,
    #[source]
    source: ParsePlatformError,
  },
}

impl Directive {
  /// Parse one token.
  pub fn parse(token: &str) -> Result<Self, DirectiveError> {
    if token == "-" {
      return Ok(Self::ResetToEmpty);
    }

    let mut chars = token.chars();
    let sign = match chars.next() {
      Some(sign @ ('+' | '-')) => sign,
      _ => {
        return Err(DirectiveError::MissingSign {
          token: token.to_string(),
        });
      }
    };
    let rest = chars.as_str();

    if rest.contains('/') {
      let platform: Platform = rest.parse().map_err(|source| DirectiveError::Platform {
        token: token.to_string(),
        source,
      })?;
      return Ok(if sign == '+' {
        Self::AddPlatform(platform)
      } else {
        Self::RemovePlatform(platform)
      });
    }

    if rest.is_empty() {
      return Err(DirectiveError::MissingOs {
        token: token.to_string(),
        sign,
      });
    }

    let os = Os::from(rest);
    Ok(if sign == '+' { Self::AddOs(os) } else { Self::RemoveOs(os) })
  }

  /// Apply this directive to `set`, returning the resulting set.
  fn fold(&self, set: &PlatformSet) -> PlatformSet {
    match self {
      Self::AddOs(os) => set.with_os(os),
      Self::RemoveOs(os) => set.without_os(os),
      Self::AddPlatform(platform) => set.with_platform(platform.clone()),
      Self::RemovePlatform(platform) => set.without_platform(platform),
      Self::ResetToEmpty => set.clone(),
    }
  }
}

/// Split a space-delimited directive list into tokens.
///
/// Runs of whitespace collapse; an empty string yields no tokens.
pub fn split_directives(list: &str) -> Vec<String> {
  list.split_whitespace().map(str::to_string).collect()
}

/// Fold `tokens` onto `initial` in order.
///
/// A reset token only has meaning when it leads the list (see
/// [`resolve_platforms`]); anywhere it reaches this function it is ignored.
///
/// # Errors
///
/// Returns the first malformed token. No partial result is returned.
pub fn apply<S: AsRef<str>>(initial: &PlatformSet, tokens: &[S]) -> Result<PlatformSet, DirectiveError> {
  let directives = tokens
    .iter()
    .map(|token| Directive::parse(token.as_ref()))
    .collect::<Result<Vec<_>, _>>()?;

  let mut set = initial.clone();
  for directive in &directives {
    if *directive == Directive::ResetToEmpty {
      warn!("ignoring '-' platform directive: only valid as the first directive");
      continue;
    }
    set = directive.fold(&set);
  }

  Ok(set)
}

/// Resolve the platform set for a directive list.
///
/// Starts from the catalog defaults, or from an empty set when the first
/// token is `-`, then applies the remaining tokens.
pub fn resolve_platforms<S: AsRef<str>>(tokens: &[S]) -> Result<PlatformSet, DirectiveError> {
  let (initial, rest) = match tokens.split_first() {
    Some((first, rest)) if first.as_ref() == "-" => (PlatformSet::new(), rest),
    _ => (PlatformSet::with_defaults(), tokens),
  };

  let set = apply(&initial, rest)?;
  debug!(platforms = set.len(), "resolved platforms");
  Ok(set)
}
