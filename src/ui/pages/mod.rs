pub mod markets;
pub mod scanner;

pub use markets::MarketsPage;
pub use scanner::ScannerPage;
