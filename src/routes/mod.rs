pub mod content;
pub mod forms;
pub mod geocode;
pub mod payments;
pub mod receipts;
pub mod site;
