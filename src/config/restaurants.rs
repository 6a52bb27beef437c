use crate::domain::model::Restaurant;
use crate::utils::error::{BuchaError, Result};
use std::io::Read;
use std::path::Path;

/// Reads `account_id, alias, scraping_mode, emoji, daily_price` rows, header
/// skipped, columns matched by position.
pub fn load_restaurants<P: AsRef<Path>>(path: P) -> Result<Vec<Restaurant>> {
    let path = path.as_ref();
    tracing::info!("Loading restaurants from {}...", path.display());

    let file = std::fs::File::open(path).map_err(|e| {
        BuchaError::config(format!("Cannot open restaurants file {}: {}", path.display(), e))
    })?;
    let restaurants = parse_restaurants(file)?;

    tracing::info!("Loaded {} restaurants", restaurants.len());
    Ok(restaurants)
}

pub fn parse_restaurants<R: Read>(reader: R) -> Result<Vec<Restaurant>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut restaurants = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let restaurant: Restaurant = record.deserialize(None).map_err(|e| {
            BuchaError::config(format!("Invalid restaurant on row {}: {}", index + 2, e))
        })?;

        if restaurant.account_id.is_empty() {
            return Err(BuchaError::InvalidConfigValueError {
                field: "account_id".to_string(),
                value: String::new(),
                reason: format!("Row {} has an empty account id", index + 2),
            });
        }
        let price_ok = restaurant
            .daily_price
            .parse::<f64>()
            .is_ok_and(|price| price.is_finite() && price >= 0.0);
        if !price_ok {
            return Err(BuchaError::InvalidConfigValueError {
                field: "daily_price".to_string(),
                value: restaurant.daily_price.clone(),
                reason: format!("Row {} has an invalid price", index + 2),
            });
        }

        restaurants.push(restaurant);
    }

    if restaurants.is_empty() {
        return Err(BuchaError::config("The restaurant list is empty"));
    }

    Ok(restaurants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ScrapingMode;

    #[test]
    fn test_parse_restaurants_by_position() {
        let csv = "id,name,mode,icon,price\n\
                   resta1, Resto A ,text,🍕,8.5\n\
                   restb,Resto B,image,🍣,10\n";

        let restaurants = parse_restaurants(csv.as_bytes()).unwrap();

        assert_eq!(restaurants.len(), 2);
        assert_eq!(restaurants[0].account_id, "resta1");
        assert_eq!(restaurants[0].alias, "Resto A");
        assert_eq!(restaurants[0].scraping_mode, ScrapingMode::Text);
        assert_eq!(restaurants[0].emoji, "🍕");
        assert_eq!(restaurants[0].daily_price, "8.5");
        assert_eq!(restaurants[1].scraping_mode, ScrapingMode::Image);
    }

    #[test]
    fn test_price_is_displayed_as_written() {
        let csv = "account_id,alias,scraping_mode,emoji,daily_price\n\
                   resta1,Resto A,text,🍕, 8.50\n\
                   restb,Resto B,image,🍣,9.00\n";

        let restaurants = parse_restaurants(csv.as_bytes()).unwrap();

        assert_eq!(restaurants[0].display_name(), "🍕 - Resto A [8.50 Eur]");
        assert_eq!(restaurants[1].display_name(), "🍣 - Resto B [9.00 Eur]");
    }

    #[test]
    fn test_unknown_mode_is_kept_for_reporting() {
        let csv = "account_id,alias,scraping_mode,emoji,daily_price\n\
                   restc,Resto C,pdf,🥗,7\n";

        let restaurants = parse_restaurants(csv.as_bytes()).unwrap();

        assert_eq!(
            restaurants[0].scraping_mode,
            ScrapingMode::Unsupported("pdf".to_string())
        );
    }

    #[test]
    fn test_malformed_rows_are_config_errors() {
        let bad_price = "account_id,alias,scraping_mode,emoji,daily_price\n\
                         resta1,Resto A,text,🍕,cheap\n";
        assert!(parse_restaurants(bad_price.as_bytes()).unwrap_err().is_fatal());

        let missing_column = "account_id,alias,scraping_mode,emoji,daily_price\n\
                              resta1,Resto A,text\n";
        assert!(parse_restaurants(missing_column.as_bytes()).unwrap_err().is_fatal());

        let negative = "account_id,alias,scraping_mode,emoji,daily_price\n\
                        resta1,Resto A,text,🍕,-1\n";
        assert!(parse_restaurants(negative.as_bytes()).is_err());

        let not_a_number = "account_id,alias,scraping_mode,emoji,daily_price\n\
                            resta1,Resto A,text,🍕,NaN\n";
        assert!(matches!(
            parse_restaurants(not_a_number.as_bytes()),
            Err(BuchaError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let header_only = "account_id,alias,scraping_mode,emoji,daily_price\n";
        assert!(matches!(
            parse_restaurants(header_only.as_bytes()),
            Err(BuchaError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_restaurants("/nonexistent/restaurants.csv").unwrap_err();
        assert!(err.is_fatal());
    }
}
