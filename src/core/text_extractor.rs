//! Cuts the menu body out of a rendered post.
//!
//! This is tied to the feed's rendering order: the post text starts with a
//! fixed number of chrome lines (author, timestamp, follow button) and the body
//! ends where the reactions bar starts ("Gosto", "Todas as reações"). Both the
//! offset and the labels come from [`ExtractConfig`] so another locale or
//! layout only needs new settings.
//!
//! Extraction is not idempotent: a body that was already cleaned has no
//! reactions label left and comes back as [`Placeholder::NoMatch`].

use crate::config::settings::ExtractConfig;
use crate::domain::model::{ExtractedContent, Placeholder};
use crate::utils::error::{BuchaError, Result};
use regex::Regex;

pub struct TextExtractor {
    header_lines: usize,
    boundary: Regex,
}

impl TextExtractor {
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        if config.boundary_tokens.is_empty() {
            return Err(BuchaError::config("extract.boundary_tokens cannot be empty"));
        }

        let alternatives = config
            .boundary_tokens
            .iter()
            .map(|token| regex::escape(token.trim()))
            .collect::<Vec<_>>()
            .join("|");

        // Lazy body up to the first line that starts with a whole boundary label.
        let boundary = Regex::new(&format!(r"(?sm)\A.*?^[ \t]*(?:{})(?:\W|$)", alternatives))
            .map_err(|e| BuchaError::config(format!("Invalid boundary tokens: {}", e)))?;

        Ok(Self {
            header_lines: config.header_lines,
            boundary,
        })
    }

    pub fn extract(&self, raw_text: &str) -> ExtractedContent {
        let remainder = raw_text
            .trim()
            .lines()
            .skip(self.header_lines)
            .collect::<Vec<_>>()
            .join("\n");

        let Some(found) = self.boundary.find(&remainder) else {
            tracing::warn!("No reactions boundary found in post text");
            return ExtractedContent::Failed(Placeholder::NoMatch);
        };

        let lines: Vec<&str> = found.as_str().trim().lines().collect();
        if lines.len() < 2 {
            tracing::info!("Post has no body before the reactions bar");
            return ExtractedContent::Failed(Placeholder::NotYetPosted);
        }

        // last line is the boundary label itself
        let body = lines[..lines.len() - 1].join("\n");
        ExtractedContent::Text(body.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TextExtractor {
        TextExtractor::new(&ExtractConfig::default()).unwrap()
    }

    const POST: &str = "Tasca do Zé\n\
                        3 h\n\
                        ·\n\
                        Seguir\n\
                        Prato do dia: Bacalhau à Brás\n\
                        Sobremesa: bolo gostoso\n\
                        Gostoso e barato!\n\
                        Gosto\n\
                        Comentar\n\
                        Partilhar";

    #[test]
    fn test_extracts_body_between_header_and_reactions() {
        assert_eq!(
            extractor().extract(POST),
            ExtractedContent::Text(
                "Prato do dia: Bacalhau à Brás\nSobremesa: bolo gostoso\nGostoso e barato!"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_single_body_line() {
        let raw = "Resto A\n3 horas\n·\nSeguir\nSopa de legumes e frango assado\nGosto";
        assert_eq!(
            extractor().extract(raw),
            ExtractedContent::Text("Sopa de legumes e frango assado".to_string())
        );
    }

    #[test]
    fn test_stops_at_first_boundary_token() {
        let raw = "a\nb\nc\nd\nMenu\nTodas as reações:\n12\nGosto";
        assert_eq!(extractor().extract(raw), ExtractedContent::Text("Menu".to_string()));
    }

    #[test]
    fn test_no_boundary_is_no_match() {
        let raw = "a\nb\nc\nd\nMenu without reactions bar";
        assert_eq!(
            extractor().extract(raw),
            ExtractedContent::Failed(Placeholder::NoMatch)
        );
    }

    #[test]
    fn test_empty_body_is_not_yet_posted() {
        let raw = "a\nb\nc\nd\nGosto\nComentar";
        assert_eq!(
            extractor().extract(raw),
            ExtractedContent::Failed(Placeholder::NotYetPosted)
        );
    }

    #[test]
    fn test_reapplying_to_clean_body_is_no_match() {
        let ExtractedContent::Text(body) = extractor().extract(POST) else {
            panic!("expected a body");
        };
        assert_eq!(
            extractor().extract(&body),
            ExtractedContent::Failed(Placeholder::NoMatch)
        );
    }

    #[test]
    fn test_retargeted_tokens() {
        let config = ExtractConfig {
            header_lines: 1,
            boundary_tokens: vec!["Like".to_string()],
            ..ExtractConfig::default()
        };
        let extractor = TextExtractor::new(&config).unwrap();

        assert_eq!(
            extractor.extract("Author\nSoup (1.5)\nLike\nComment"),
            ExtractedContent::Text("Soup (1.5)".to_string())
        );
    }

    #[test]
    fn test_empty_token_list_is_rejected() {
        let config = ExtractConfig {
            boundary_tokens: vec![],
            ..ExtractConfig::default()
        };
        assert!(TextExtractor::new(&config).is_err());
    }
}
