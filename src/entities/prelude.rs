pub use super::price_records::Entity as PriceRecords;
pub use super::products::Entity as Products;
pub use super::subscribers::Entity as Subscribers;
pub use super::watches::Entity as Watches;
