// Adapters layer: concrete implementations of the domain ports.

pub mod shortener;
pub mod slack;
pub mod webdriver;

pub use shortener::TinyUrlShortener;
pub use slack::SlackWebhook;
pub use webdriver::WebDriverBrowser;
