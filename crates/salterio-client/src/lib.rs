pub mod cleaner;
pub mod fetcher;
pub mod parser;

pub use cleaner::HtmlCleaner;
pub use fetcher::ReqwestFetcher;
pub use parser::HtmlPageParser;
