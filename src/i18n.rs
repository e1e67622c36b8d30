//! Locale handling and verdict message strings.
//!
//! The locale is an explicit value chosen when a session is opened and carried
//! on the session from then on. Nothing in here is process-global; handlers
//! thread the session's locale into message rendering and into the advisor
//! request (as the target natural language for feedback).

use serde::{Deserialize, Serialize};

/// Supported display locales.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
  #[default]
  #[serde(rename = "en-US")]
  EnUs,
  #[serde(rename = "es-ES")]
  EsEs,
}

impl Locale {
  /// Match a BCP-47 tag against the supported locales: exact tag first, then
  /// by language prefix, falling back to en-US.
  pub fn match_tag(tag: &str) -> Locale {
    match tag {
      "en-US" => return Locale::EnUs,
      "es-ES" => return Locale::EsEs,
      _ => {}
    }
    let lang = tag.split('-').next().unwrap_or("");
    match lang {
      "es" => Locale::EsEs,
      _ => Locale::EnUs,
    }
  }

  /// Natural-language name forwarded to the advisor prompt.
  pub fn language_name(self) -> &'static str {
    match self {
      Locale::EnUs => "English",
      Locale::EsEs => "Spanish",
    }
  }

  pub fn msg_evaluating(self) -> &'static str {
    match self {
      Locale::EnUs => "Evaluating your code...",
      Locale::EsEs => "Evaluando tu código...",
    }
  }

  pub fn msg_success(self) -> &'static str {
    match self {
      Locale::EnUs => "Excellent! Lesson complete!",
      Locale::EsEs => "¡Excelente! ¡Lección completada!",
    }
  }

  pub fn msg_not_quite(self) -> &'static str {
    match self {
      Locale::EnUs => "Not quite right. Compare your output with the expected output.",
      Locale::EsEs => "No es del todo correcto. Compara tu salida con la salida esperada.",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exact_tags_match_directly() {
    assert_eq!(Locale::match_tag("en-US"), Locale::EnUs);
    assert_eq!(Locale::match_tag("es-ES"), Locale::EsEs);
  }

  #[test]
  fn language_prefix_falls_back_to_regional_variant() {
    assert_eq!(Locale::match_tag("es-MX"), Locale::EsEs);
    assert_eq!(Locale::match_tag("es"), Locale::EsEs);
    assert_eq!(Locale::match_tag("en-GB"), Locale::EnUs);
  }

  #[test]
  fn unknown_tags_default_to_en_us() {
    assert_eq!(Locale::match_tag("fr-FR"), Locale::EnUs);
    assert_eq!(Locale::match_tag(""), Locale::EnUs);
  }
}
