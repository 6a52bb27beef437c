use crate::config::settings::PlaceholderConfig;
use crate::domain::model::{ExtractedContent, Menu, Placeholder, Restaurant, ScrapingMode};

/// Builds the display record for one restaurant. `None` means the restaurant
/// has an unsupported scraping mode and is left out of the report.
pub fn normalize(
    restaurant: &Restaurant,
    content: ExtractedContent,
    placeholders: &PlaceholderConfig,
) -> Option<Menu> {
    if let ScrapingMode::Unsupported(mode) = &restaurant.scraping_mode {
        tracing::warn!(
            "Skipping '{}': unsupported scraping mode '{}' (use 'text' or 'image')",
            restaurant.account_id,
            mode
        );
        return None;
    }

    let mut menu = Menu {
        display_name: restaurant.display_name(),
        body: None,
        image_reference: None,
    };

    match content {
        ExtractedContent::Text(body) => menu.body = Some(body),
        ExtractedContent::Image(reference) => menu.image_reference = Some(reference),
        ExtractedContent::Failed(placeholder) => {
            menu.body = Some(placeholder_text(&placeholder, placeholders))
        }
    }

    Some(menu)
}

pub fn placeholder_text(placeholder: &Placeholder, texts: &PlaceholderConfig) -> String {
    match placeholder {
        Placeholder::Closed => texts.closed.clone(),
        Placeholder::NotYetPosted => texts.not_yet_posted.clone(),
        Placeholder::NoMatch => texts.no_match.clone(),
        Placeholder::NoImage => texts.no_image.clone(),
        Placeholder::MissingTimestamp => texts.missing_timestamp.clone(),
        Placeholder::Unreachable(reason) => texts.unreachable.replace("{reason}", reason),
    }
}
